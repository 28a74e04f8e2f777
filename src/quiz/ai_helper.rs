use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::types::CompletionResponse;
use log::{debug, error, info};
use thiserror::Error;

use crate::quiz::difficulty::{parse_difficulty, Difficulty};
use crate::quiz::parser::parse_quiz;
use crate::quiz::prompt::{difficulty_prompt, quiz_prompt};
use crate::quiz::QuestionRecord;

#[derive(Error, Debug)]
#[error("model request failed: {0}")]
pub struct ModelError(#[from] chatgpt::err::Error);

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("the model's reply contained no usable questions")]
    NoQuestions,
}

/// A text-in, text-out completion service.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

#[async_trait]
impl ModelClient for ChatGPT {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let response: CompletionResponse = self.send_message(prompt).await?;
        Ok(response.message().clone().content)
    }
}

pub struct QuizHelper {
    model: Box<dyn ModelClient>,
    question_count: usize,
    max_prompt_chars: usize,
}

impl QuizHelper {
    pub fn new(
        model: impl ModelClient + 'static,
        question_count: usize,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            model: Box::new(model),
            question_count,
            max_prompt_chars,
        }
    }

    /// Asks the model for a quiz about `document_text`. A reply that parses
    /// into zero questions is a failure, never an empty quiz.
    pub async fn generate_questions(
        &self,
        document_text: &str,
    ) -> Result<Vec<QuestionRecord>, GenerationError> {
        let prompt = quiz_prompt(document_text, self.question_count, self.max_prompt_chars);
        info!("Requesting {} questions from the model", self.question_count);

        let completion = self.model.complete(&prompt).await.map_err(|e| {
            error!("Quiz generation failed: {}", e);
            e
        })?;
        debug!("Completion: {:?}", completion);

        let questions = parse_quiz(&completion);
        info!("Model reply yielded {} questions", questions.len());
        if questions.is_empty() {
            return Err(GenerationError::NoQuestions);
        }
        Ok(questions)
    }

    pub async fn grade_difficulty(
        &self,
        question: &QuestionRecord,
    ) -> Result<Difficulty, ModelError> {
        let prompt = difficulty_prompt(&describe(question));
        let reply = self.model.complete(&prompt).await?;
        debug!("Difficulty reply: {:?}", reply);

        Ok(parse_difficulty(&reply))
    }
}

/// The question as the model generated it, text followed by its options.
fn describe(question: &QuestionRecord) -> String {
    let mut text = question.text().to_string();
    for (choice, option) in question.options() {
        text.push_str(&format!("\n{}. {}", choice, option));
    }
    text
}
