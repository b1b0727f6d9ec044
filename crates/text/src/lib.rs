mod stop_words;
mod tokenize;

pub use stop_words::{is_stop_word, ENGLISH_STOP_WORDS};
pub use tokenize::{UnicodeTokenClassifier, DEFAULT_MAX_MESSAGE_CHARS};
