use chatbot_core::{ChatError, Token, TokenClassifier};
use unicode_segmentation::UnicodeSegmentation;

use crate::stop_words::is_stop_word;

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 1_000_000;

const CONTRACTION_SUFFIXES: &[&str] = &["n't", "'s", "'m", "'re", "'ve", "'d", "'ll"];

/// Splits text on Unicode word boundaries and tags each word.
#[derive(Debug, Clone)]
pub struct UnicodeTokenClassifier {
    max_chars: usize,
}

impl UnicodeTokenClassifier {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl Default for UnicodeTokenClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_CHARS)
    }
}

impl TokenClassifier for UnicodeTokenClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Token>, ChatError> {
        let chars = text.chars().count();
        if chars > self.max_chars {
            return Err(ChatError::MessageTooLong {
                chars,
                max: self.max_chars,
            });
        }

        Ok(text
            .split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .flat_map(split_contraction)
            .map(|piece| Token {
                text: piece.to_string(),
                is_alpha: is_alpha(piece),
                is_stop: is_stop_word(piece),
            })
            .collect())
    }
}

fn is_alpha(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

// "don't" -> ["do", "n't"], "I’m" -> ["I", "’m"]
fn split_contraction(segment: &str) -> Vec<&str> {
    let normalized = segment.replace('’', "'").to_lowercase();

    for suffix in CONTRACTION_SUFFIXES {
        if normalized.len() > suffix.len() && normalized.ends_with(suffix) {
            let suffix_chars = suffix.chars().count();
            let split_at = segment
                .char_indices()
                .rev()
                .nth(suffix_chars - 1)
                .map(|(index, _)| index)
                .unwrap_or(0);
            if split_at > 0 {
                return vec![&segment[..split_at], &segment[split_at..]];
            }
        }
    }

    vec![segment]
}
