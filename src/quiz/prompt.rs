use log::info;

/// Builds the request for a quiz of `question_count` questions about
/// `document_text`. Text past `max_chars` characters is cut off.
pub fn quiz_prompt(document_text: &str, question_count: usize, max_chars: usize) -> String {
    let content = truncate_chars(document_text, max_chars);
    if content.len() < document_text.len() {
        info!(
            "Document text truncated to {} characters for the prompt",
            max_chars
        );
    }

    format!(
        "You are an expert in the field related to the content of this PDF. Based on this PDF content, generate {question_count} multiple-choice questions, each with 4 options (A, B, C, D), and clearly indicate the correct answer. The questions should assess understanding of the key concepts and information presented in the PDF.

Format your response EXACTLY as follows:

Question 1:
A. Option 1
B. Option 2
C. Option 3
D. Option 4
Answer: A

Question 2:
A. Option 1
B. Option 2
C. Option 3
D. Option 4
Answer: B

... and so on for the remaining questions.

PDF content: {content}
"
    )
}

pub fn difficulty_prompt(question_text: &str) -> String {
    format!(
        "On a scale of 1 to 5 (1=very easy, 5=very hard), rate the difficulty of this question, considering the context of the provided document. Reply with the number only: \n{}",
        question_text
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
