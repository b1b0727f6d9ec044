use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chatbot_text::DEFAULT_MAX_MESSAGE_CHARS;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000"];

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub bind: String,
    pub log_file: Option<PathBuf>,
    pub max_message_chars: usize,
    pub max_body_bytes: usize,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<String>,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            log_file: None,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 600,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        }
    }
}

impl ChatbotConfig {
    /// Reads `CHATBOT_*` variables; anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind: lookup("CHATBOT_BIND")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.bind),
            log_file: lookup("CHATBOT_LOG_FILE")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            max_message_chars: lookup("CHATBOT_MAX_MESSAGE_CHARS")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_message_chars),
            max_body_bytes: lookup("CHATBOT_MAX_BODY_BYTES")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_body_bytes),
            rate_limit_window: lookup("CHATBOT_RATE_LIMIT_WINDOW_SECONDS")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: lookup("CHATBOT_RATE_LIMIT_MAX")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(defaults.rate_limit_max),
            allowed_origins: lookup("CHATBOT_ALLOWED_ORIGINS")
                .map(|value| parse_origins(&value))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
