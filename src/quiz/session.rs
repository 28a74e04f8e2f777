use std::collections::BTreeSet;

use thiserror::Error;

use crate::quiz::{Choice, QuestionRecord};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("there is no question {0}")]
    NoSuchQuestion(usize),

    #[error("question {0} was already answered")]
    AlreadyAnswered(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { correct: Choice },
}

/// One chat's quiz: the generated questions, which of them were answered and
/// the score so far. A new upload replaces the whole thing.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    answered: BTreeSet<usize>,
    score: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions,
            answered: BTreeSet::new(),
            score: 0,
        }
    }

    /// The first question in order that hasn't been answered yet.
    pub fn current(&self) -> Option<(usize, &QuestionRecord)> {
        self.questions
            .iter()
            .enumerate()
            .find(|(i, _)| !self.answered.contains(i))
    }

    pub fn submit(&mut self, index: usize, choice: Choice) -> Result<Verdict, SessionError> {
        let question = self
            .questions
            .get(index)
            .ok_or(SessionError::NoSuchQuestion(index))?;
        if !self.answered.insert(index) {
            return Err(SessionError::AlreadyAnswered(index));
        }

        if question.is_correct(choice) {
            self.score += 1;
            Ok(Verdict::Correct)
        } else {
            Ok(Verdict::Incorrect {
                correct: question.answer(),
            })
        }
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.answered.len() >= self.questions.len()
    }
}
