use std::fmt;

/// The model's rating of how hard a question is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Rated(i64),
    Unclear,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Rated(level) => write!(f, "Difficulty: {}/5", level),
            Difficulty::Unclear => write!(f, "Difficulty assessment unclear."),
        }
    }
}

/// Reads a rating reply. Anything that isn't a bare integer is `Unclear`;
/// the number itself is taken as given, even outside 1..=5.
pub fn parse_difficulty(reply: &str) -> Difficulty {
    match reply.trim().parse::<i64>() {
        Ok(level) => Difficulty::Rated(level),
        Err(_) => Difficulty::Unclear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_replies_are_ratings() {
        assert_eq!(parse_difficulty("3"), Difficulty::Rated(3));
        assert_eq!(parse_difficulty(" 5\n"), Difficulty::Rated(5));
    }

    #[test]
    fn anything_else_is_unclear() {
        assert_eq!(parse_difficulty("pretty hard"), Difficulty::Unclear);
        assert_eq!(parse_difficulty("3/5"), Difficulty::Unclear);
        assert_eq!(parse_difficulty(""), Difficulty::Unclear);
    }

    #[test]
    fn unclear_has_a_readable_label() {
        assert_eq!(
            Difficulty::Unclear.to_string(),
            "Difficulty assessment unclear."
        );
        assert_eq!(Difficulty::Rated(2).to_string(), "Difficulty: 2/5");
    }
}
