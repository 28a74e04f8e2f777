use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings read once at startup. The bot token is picked up by teloxide
/// itself from `TELOXIDE_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub chatgpt_api_key: String,
    pub question_count: usize,
    pub model_timeout: Duration,
    pub max_prompt_chars: usize,
    pub grade_difficulty: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chatgpt_api_key = lookup("CHATGPT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("CHATGPT_API_KEY"))?;

        let question_count: usize = parse_or(&lookup, "QUIZ_QUESTION_COUNT", 5)?;
        if !(1..=20).contains(&question_count) {
            return Err(ConfigError::Invalid {
                key: "QUIZ_QUESTION_COUNT",
                value: question_count.to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(&lookup, "QUIZ_MODEL_TIMEOUT_SECS", 15)?;
        let max_prompt_chars = parse_or(&lookup, "QUIZ_MAX_PROMPT_CHARS", 12_000)?;
        let grade_difficulty = match lookup("QUIZ_GRADE_DIFFICULTY") {
            None => true,
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                key: "QUIZ_GRADE_DIFFICULTY",
                value,
            })?,
        };

        Ok(Self {
            chatgpt_api_key,
            question_count,
            model_timeout: Duration::from_secs(timeout_secs),
            max_prompt_chars,
            grade_difficulty,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
