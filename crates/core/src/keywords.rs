use crate::error::ChatError;

/// One segment of a message as seen by a [`TokenClassifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub is_alpha: bool,
    pub is_stop: bool,
}

pub trait TokenClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Vec<Token>, ChatError>;
}

/// Alphabetic, non-stop-word tokens in message order, original casing kept.
pub fn extract_keywords(
    classifier: &dyn TokenClassifier,
    message: &str,
) -> Result<Vec<String>, ChatError> {
    Ok(classifier
        .classify(message)?
        .into_iter()
        .filter(|token| token.is_alpha && !token.is_stop)
        .map(|token| token.text)
        .collect())
}
