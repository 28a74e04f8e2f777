pub mod ai_helper;
pub mod difficulty;
pub mod parser;
pub mod prompt;
pub mod session;

use std::fmt;
use std::str::FromStr;

/// One of the four answer letters of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn letter(&self) -> char {
        match self {
            Choice::A => 'A',
            Choice::B => 'B',
            Choice::C => 'C',
            Choice::D => 'D',
        }
    }

    fn index(&self) -> usize {
        match self {
            Choice::A => 0,
            Choice::B => 1,
            Choice::C => 2,
            Choice::D => 3,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Only the bare uppercase letter is accepted, "C." or "c" are not choices.
impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Choice::A),
            "B" => Ok(Choice::B),
            "C" => Ok(Choice::C),
            "D" => Ok(Choice::D),
            other => Err(other.to_string()),
        }
    }
}

/// A validated question: text, the four options and the correct letter.
///
/// Every `Choice` has an option, so the answer always names one of them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionRecord {
    text: String,
    options: [String; 4],
    answer: Choice,
}

impl QuestionRecord {
    pub fn new(text: String, options: [String; 4], answer: Choice) -> Self {
        Self {
            text,
            options,
            answer,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn option(&self, choice: Choice) -> &str {
        &self.options[choice.index()]
    }

    pub fn options(&self) -> impl Iterator<Item = (Choice, &str)> {
        Choice::ALL.into_iter().map(move |c| (c, self.option(c)))
    }

    pub fn answer(&self) -> Choice {
        self.answer
    }

    pub fn is_correct(&self, choice: Choice) -> bool {
        self.answer == choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_only_bare_letters() {
        assert_eq!("C".parse::<Choice>(), Ok(Choice::C));
        assert_eq!(" B ".parse::<Choice>(), Ok(Choice::B));
        assert!("c".parse::<Choice>().is_err());
        assert!("C.".parse::<Choice>().is_err());
        assert!("E".parse::<Choice>().is_err());
        assert!("".parse::<Choice>().is_err());
    }

    #[test]
    fn record_options_come_back_in_letter_order() {
        let record = QuestionRecord::new(
            "Question 1:".to_string(),
            [
                "one".to_string(),
                "two".to_string(),
                "three".to_string(),
                "four".to_string(),
            ],
            Choice::B,
        );

        let options = record.options().collect::<Vec<_>>();
        assert_eq!(
            options,
            vec![
                (Choice::A, "one"),
                (Choice::B, "two"),
                (Choice::C, "three"),
                (Choice::D, "four"),
            ]
        );
        assert!(record.is_correct(Choice::B));
        assert!(!record.is_correct(Choice::A));
    }
}
