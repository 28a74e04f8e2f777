mod config;
mod document;
mod quiz;

use std::sync::Arc;

use chatgpt::{client::ChatGPT, config::ChatGPTEngine};
use config::Config;
use dotenv::dotenv;
use log::{info, warn};
use quiz::{
    ai_helper::QuizHelper,
    difficulty::Difficulty,
    session::{QuizSession, Verdict},
    Choice, QuestionRecord,
};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    net::Download,
    prelude::*,
    types::{ChatAction, Document, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode},
    utils::html,
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveDocument,
    Quiz {
        session: QuizSession,
    },
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine, the variables may come from the environment.
    dotenv().ok();

    pretty_env_logger::init();
    info!("Starting PDF quiz bot...");

    let config = Config::from_env()?;
    let bot = Bot::from_env();

    // Sessions live only as long as the process.
    let storage: SessionStorage = InMemStorage::<State>::new().erase();

    let gpt = {
        let mut gpt = ChatGPT::new(config.chatgpt_api_key.clone())?;

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.timeout = config.model_timeout;

        gpt
    };

    let quiz_helper = Arc::new(QuizHelper::new(
        gpt,
        config.question_count,
        config.max_prompt_chars,
    ));
    let config = Arc::new(config);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::filter(is_reset).endpoint(reset))
            .branch(dptree::filter(|msg: Message| msg.document().is_some()).endpoint(receive_document))
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveDocument].endpoint(ask_for_document))
            .branch(dptree::case![State::Quiz { session }].endpoint(receive_answer)),
    )
    .dependencies(dptree::deps![storage, quiz_helper, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const GREETING_TEXT: &str = "Hi! Send me a PDF and I will quiz you on it. Answer each question with A, B, C or D.";
const SEND_PDF_TEXT: &str = "Please send me a PDF file to generate a quiz.";
const NOT_A_PDF_TEXT: &str = "That doesn't look like a PDF. Please upload a PDF file.";
const EXTRACTION_FAILED_TEXT: &str = "Could not extract text from PDF.";
const GENERATION_FAILED_TEXT: &str =
    "Error generating questions. Please check the PDF content or try again.";
const CHOOSE_AN_OPTION_TEXT: &str = "Please answer with A, B, C or D.";
const RESET_TEXT: &str = "Quiz cleared. Send me a new PDF whenever you are ready.";
const RESET_COMMAND: &str = "/reset";

fn is_reset(msg: Message) -> bool {
    msg.text().map(str::trim) == Some(RESET_COMMAND)
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(KeyboardRemove::new())
        .await?;

    dialogue.update(State::ReceiveDocument).await?;
    Ok(())
}

async fn ask_for_document(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, SEND_PDF_TEXT).await?;
    Ok(())
}

async fn reset(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, RESET_TEXT)
        .reply_markup(KeyboardRemove::new())
        .await?;

    dialogue.update(State::ReceiveDocument).await?;
    Ok(())
}

fn is_pdf(document: &Document) -> bool {
    looks_like_pdf(
        document.mime_type.as_ref().map(|mime| mime.essence_str()),
        document.file_name.as_deref(),
    )
}

fn looks_like_pdf(mime_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_mime = mime_type == Some("application/pdf");
    let by_name = file_name.is_some_and(|name| name.to_lowercase().ends_with(".pdf"));
    by_mime || by_name
}

async fn download(bot: &Bot, file_id: String) -> HandlerResult<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;
    Ok(bytes)
}

/// A new upload always replaces the current quiz, whether or not it works out.
async fn receive_document(
    bot: Bot,
    dialogue: QuizDialogue,
    quiz_helper: Arc<QuizHelper>,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    let Some(upload) = msg.document() else {
        return Ok(());
    };
    if !is_pdf(upload) {
        bot.send_message(msg.chat.id, NOT_A_PDF_TEXT).await?;
        return Ok(());
    }
    dialogue.update(State::ReceiveDocument).await?;

    info!(
        "Chat {} uploaded {:?} ({} bytes)",
        msg.chat.id,
        upload.file_name,
        upload.file.size
    );
    // Purely cosmetic, so a failure here is ignored.
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    let bytes = match download(&bot, upload.file.id.clone()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Chat {}: download failed: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, EXTRACTION_FAILED_TEXT).await?;
            return Ok(());
        }
    };

    let text = match document::extract_text(&bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("Chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, EXTRACTION_FAILED_TEXT).await?;
            return Ok(());
        }
    };

    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
    let questions = match quiz_helper.generate_questions(&text).await {
        Ok(questions) => questions,
        Err(e) => {
            warn!("Chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, GENERATION_FAILED_TEXT).await?;
            return Ok(());
        }
    };

    let session = QuizSession::new(questions);
    bot.send_message(
        msg.chat.id,
        format!("Your quiz is ready: {} questions. Let's go!", session.len()),
    )
    .await?;

    if let Some((index, question)) = session.current() {
        send_question(&bot, &msg, &quiz_helper, &config, index, question).await?;
    }

    dialogue.update(State::Quiz { session }).await?;
    Ok(())
}

async fn receive_answer(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    quiz_helper: Arc<QuizHelper>,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    let choice = msg
        .text()
        .and_then(|text| text.trim().to_uppercase().parse::<Choice>().ok());
    let Some(choice) = choice else {
        bot.send_message(msg.chat.id, CHOOSE_AN_OPTION_TEXT)
            .reply_markup(answer_keyboard())
            .await?;
        return Ok(());
    };

    let current = session.current().map(|(index, _)| index);
    if let Some(index) = current {
        match session.submit(index, choice) {
            Ok(Verdict::Correct) => {
                bot.send_message(msg.chat.id, "Correct!").await?;
            }
            Ok(Verdict::Incorrect { correct }) => {
                bot.send_message(
                    msg.chat.id,
                    format!("Incorrect. The correct answer is {}", correct),
                )
                .await?;
            }
            Err(e) => warn!("Chat {}: {}", msg.chat.id, e),
        }
    }

    if session.is_finished() {
        let quiz_score = format!(
            "Quiz finished! Your score: {} out of {}\nSend another PDF to play again.",
            session.score(),
            session.len()
        );
        bot.send_message(msg.chat.id, quiz_score)
            .reply_markup(KeyboardRemove::new())
            .await?;
        info!(
            "Chat {} finished a quiz with {}/{}",
            msg.chat.id,
            session.score(),
            session.len()
        );

        dialogue.update(State::ReceiveDocument).await?;
        return Ok(());
    }

    let next = session
        .current()
        .map(|(index, question)| (index, question.clone()));
    if let Some((index, question)) = next {
        send_question(&bot, &msg, &quiz_helper, &config, index, &question).await?;
    }

    dialogue.update(State::Quiz { session }).await?;
    Ok(())
}

fn answer_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![Choice::ALL
        .iter()
        .map(|choice| KeyboardButton::new(choice.to_string()))
        .collect::<Vec<_>>()])
}

async fn send_question(
    bot: &Bot,
    msg: &Message,
    quiz_helper: &QuizHelper,
    config: &Config,
    index: usize,
    question: &QuestionRecord,
) -> HandlerResult {
    let mut text = format!(
        "<b>Question {}:</b> {}\n",
        index + 1,
        html::escape(question.text())
    );
    for (choice, option) in question.options() {
        text.push_str(&format!("\n{}. {}", choice, html::escape(option)));
    }

    if config.grade_difficulty {
        let difficulty = quiz_helper
            .grade_difficulty(question)
            .await
            // A rating is nice to have, the quiz goes on without one.
            .unwrap_or_else(|e| {
                warn!("Difficulty grading failed: {}", e);
                Difficulty::Unclear
            });
        text.push_str(&format!("\n\n<i>{}</i>", difficulty));
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(answer_keyboard())
        .await?;
    Ok(())
}
