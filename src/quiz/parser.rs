//! Turns the model's free-text reply into quiz questions.
//!
//! The reply is expected to look like
//!
//! ```text
//! Question 1:
//! A. Option 1
//! B. Option 2
//! C. Option 3
//! D. Option 4
//! Answer: A
//! ```
//!
//! with a blank line between questions. Models drift from the format, so every
//! block is parsed on its own and a block that doesn't fit is logged and
//! skipped. The caller gets whatever survived, possibly nothing.

use log::{debug, warn};
use thiserror::Error;

use crate::quiz::{Choice, QuestionRecord};

const ANSWER_MARKER: &str = "Answer:";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockParseError {
    #[error("block is empty")]
    Empty,

    #[error("option {0} not found")]
    MissingOption(Choice),

    #[error("option {0} continues on the following line")]
    AmbiguousOption(Choice),

    #[error("option {0} appears more than once")]
    DuplicateOption(Choice),

    #[error("no \"Answer:\" line")]
    MissingAnswer,

    #[error("answer {0:?} is not one of A, B, C, D")]
    UnknownAnswer(String),
}

pub fn parse_quiz(raw: &str) -> Vec<QuestionRecord> {
    let blocks = split_blocks(raw);
    let mut questions = Vec::with_capacity(blocks.len());

    for (number, block) in blocks.iter().enumerate() {
        match parse_block(block) {
            Ok(question) => questions.push(question),
            Err(e) => {
                warn!("Skipping question block {}: {}", number + 1, e);
                debug!("Skipped block {}:\n{}", number + 1, block.join("\n"));
            }
        }
    }

    debug!(
        "Parsed {} of {} question blocks",
        questions.len(),
        blocks.len()
    );
    questions
}

/// Groups lines into blocks separated by one or more blank lines.
fn split_blocks(raw: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str]) -> Result<QuestionRecord, BlockParseError> {
    let (first, rest) = lines.split_first().ok_or(BlockParseError::Empty)?;
    let text = first.trim().to_string();

    let options = parse_options(rest)?;

    let answer_line = lines
        .iter()
        .find(|line| line.contains(ANSWER_MARKER))
        .ok_or(BlockParseError::MissingAnswer)?;
    let candidate = answer_line
        .split(ANSWER_MARKER)
        .nth(1)
        .unwrap_or_default()
        .trim();
    let answer = candidate
        .parse::<Choice>()
        .map_err(BlockParseError::UnknownAnswer)?;

    Ok(QuestionRecord::new(text, options, answer))
}

fn parse_options(lines: &[&str]) -> Result<[String; 4], BlockParseError> {
    let mut found: [Option<String>; 4] = Default::default();
    let mut last_option: Option<Choice> = None;
    let mut seen_answer = false;

    for line in lines {
        if line.contains(ANSWER_MARKER) {
            seen_answer = true;
            continue;
        }

        let markers = option_markers(line);
        if markers.is_empty() {
            // Lines between the question and the first option are ignored, but
            // a loose line right after an option can't be told apart from a
            // wrapped option.
            if let (Some(choice), false) = (last_option, seen_answer) {
                return Err(BlockParseError::AmbiguousOption(choice));
            }
            continue;
        }

        for (i, &(start, choice)) in markers.iter().enumerate() {
            let end = markers.get(i + 1).map_or(line.len(), |&(next, _)| next);
            let slot = &mut found[choice.index()];
            if slot.is_some() {
                return Err(BlockParseError::DuplicateOption(choice));
            }
            *slot = Some(line[start + 2..end].trim().to_string());
            last_option = Some(choice);
        }
    }

    let mut options: [String; 4] = Default::default();
    for (slot, choice) in options.iter_mut().zip(Choice::ALL) {
        match found[choice.index()].take() {
            Some(option) if !option.is_empty() => *slot = option,
            _ => return Err(BlockParseError::MissingOption(choice)),
        }
    }
    Ok(options)
}

/// Byte offsets of the option labels ("A.", "B.", ...) on a line.
///
/// A label has to stand alone as a word, and labels on the same line have to
/// go up in letter order, so "C. Vitamin A. deficiency" is one option.
fn option_markers(line: &str) -> Vec<(usize, Choice)> {
    let bytes = line.as_bytes();
    let mut markers: Vec<(usize, Choice)> = Vec::new();

    for (i, pair) in bytes.windows(2).enumerate() {
        if pair[1] != b'.' {
            continue;
        }
        let choice = match pair[0] {
            b'A' => Choice::A,
            b'B' => Choice::B,
            b'C' => Choice::C,
            b'D' => Choice::D,
            _ => continue,
        };
        let starts_word = i == 0 || bytes[i - 1].is_ascii_whitespace();
        let ends_word = i + 2 == bytes.len() || bytes[i + 2].is_ascii_whitespace();
        let in_order = markers.last().map_or(true, |&(_, prev)| prev < choice);

        if starts_word && ends_word && in_order {
            markers.push((i, choice));
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(number: usize, answer: &str) -> String {
        format!(
            "Question {number}:\nA. Alpha {number}\nB. Beta {number}\nC. Gamma {number}\nD. Delta {number}\nAnswer: {answer}"
        )
    }

    #[test]
    fn parses_a_well_formed_block() {
        let questions = parse_quiz(&block(1, "C"));

        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.text(), "Question 1:");
        assert_eq!(question.answer(), Choice::C);
        assert_eq!(question.option(Choice::A), "Alpha 1");
        assert_eq!(question.option(Choice::B), "Beta 1");
        assert_eq!(question.option(Choice::C), "Gamma 1");
        assert_eq!(question.option(Choice::D), "Delta 1");
    }

    #[test]
    fn skips_a_block_without_an_answer_line() {
        let raw = format!(
            "{}\n\nQuestion 2:\nA. a\nB. b\nC. c\nD. d",
            block(1, "A")
        );

        let questions = parse_quiz(&raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text(), "Question 1:");
    }

    #[test]
    fn empty_input_gives_no_questions() {
        assert!(parse_quiz("").is_empty());
        assert!(parse_quiz("\n\n   \n").is_empty());
    }

    #[test]
    fn keeps_order_when_one_block_is_broken() {
        let raw = [
            block(1, "A"),
            block(2, "B"),
            "Question 3:\nA. only one option\nAnswer: A".to_string(),
            block(4, "D"),
            block(5, "C"),
        ]
        .join("\n\n");

        let texts = parse_quiz(&raw)
            .iter()
            .map(|q| q.text().to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            texts,
            vec!["Question 1:", "Question 2:", "Question 4:", "Question 5:"]
        );
    }

    #[test]
    fn drops_answers_outside_the_four_letters() {
        for answer in ["E", "c", "C.", "", "Paris"] {
            assert!(
                parse_quiz(&block(1, answer)).is_empty(),
                "answer {:?} should be rejected",
                answer
            );
        }
    }

    #[test]
    fn accepts_all_options_on_one_line() {
        let raw = "What colour is the sky?\nA. Red B. Blue C. Green D. Yellow\nAnswer: B";

        let questions = parse_quiz(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].option(Choice::A), "Red");
        assert_eq!(questions[0].option(Choice::B), "Blue");
        assert_eq!(questions[0].option(Choice::C), "Green");
        assert_eq!(questions[0].option(Choice::D), "Yellow");
    }

    #[test]
    fn skips_a_block_missing_an_option() {
        let raw = "Question 1:\nA. a\nB. b\nC. c\nAnswer: A";
        assert!(parse_quiz(raw).is_empty());
        assert_eq!(
            parse_block(&raw.lines().collect::<Vec<_>>()),
            Err(BlockParseError::MissingOption(Choice::D))
        );
    }

    #[test]
    fn empty_option_text_counts_as_missing() {
        let raw = "Question 1:\nA. a\nB.\nC. c\nD. d\nAnswer: A";
        assert_eq!(
            parse_block(&raw.lines().collect::<Vec<_>>()),
            Err(BlockParseError::MissingOption(Choice::B))
        );
    }

    #[test]
    fn flags_options_that_wrap_onto_another_line() {
        let raw = "Question 1:\nA. the first option\nwhich keeps going\nB. b\nC. c\nD. d\nAnswer: A";
        assert_eq!(
            parse_block(&raw.lines().collect::<Vec<_>>()),
            Err(BlockParseError::AmbiguousOption(Choice::A))
        );
    }

    #[test]
    fn ignores_lines_before_the_options_and_after_the_answer() {
        let raw = "Question 1:\nWhat is 2 + 2?\nA. 3\nB. 4\nC. 5\nD. 22\nAnswer: B\nExplanation: basic arithmetic.";

        let questions = parse_quiz(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text(), "Question 1:");
        assert_eq!(questions[0].answer(), Choice::B);
    }

    #[test]
    fn skips_preamble_blocks() {
        let raw = format!("Here are your questions:\n\n{}", block(1, "D"));

        let questions = parse_quiz(&raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer(), Choice::D);
    }

    #[test]
    fn labels_inside_option_text_do_not_split_it() {
        let raw = "Question 1:\nA. Iron\nB. Calcium\nC. Vitamin A. deficiency\nD. Zinc\nAnswer: C";

        let questions = parse_quiz(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].option(Choice::C), "Vitamin A. deficiency");
    }

    #[test]
    fn a_label_repeated_inside_another_option_is_flagged() {
        let raw = "Which vitamin prevents scurvy?\nA. Vitamin C. deficiency cure\nB. Iron\nC. Ascorbic acid\nD. Zinc\nAnswer: C";

        assert!(parse_quiz(raw).is_empty());
        assert_eq!(
            parse_block(&raw.lines().collect::<Vec<_>>()),
            Err(BlockParseError::DuplicateOption(Choice::C))
        );
    }

    #[test]
    fn handles_windows_line_endings() {
        let raw = [block(1, "A"), block(2, "B")]
            .join("\n\n")
            .replace('\n', "\r\n");

        assert_eq!(parse_quiz(&raw).len(), 2);
    }

    #[test]
    fn parsing_is_repeatable() {
        let raw = [block(1, "A"), "garbage".to_string(), block(2, "D")].join("\n\n");
        assert_eq!(parse_quiz(&raw), parse_quiz(&raw));
    }
}
