use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message of {chars} characters exceeds the tokenizer limit of {max}")]
    MessageTooLong { chars: usize, max: usize },

    #[error("tokenizer failed: {0}")]
    Tokenizer(String),

    #[error("message processing panicked: {0}")]
    Panicked(String),
}
