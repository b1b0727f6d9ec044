pub mod error;
pub mod intent;
pub mod keywords;
pub mod models;
pub mod responses;
pub mod sentiment;

pub use error::ChatError;
pub use intent::{resolve_intent, FAREWELLS, GREETINGS};
pub use keywords::{extract_keywords, Token, TokenClassifier};
pub use models::*;
pub use responses::{generate_response, BATCH_ITEM_ERROR_REPLY};
pub use sentiment::tag_sentiment;
