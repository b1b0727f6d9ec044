use crate::models::Sentiment;

/// Case-sensitive: "Good" at the start of a sentence does not count.
pub fn tag_sentiment(message: &str) -> Sentiment {
    if message.contains("good") {
        Sentiment::Positive
    } else if message.contains("bad") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
