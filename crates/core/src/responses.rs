use crate::models::{Intent, Sentiment};

pub const BATCH_ITEM_ERROR_REPLY: &str = "There was an error processing your message.";

/// Picks the canned reply for an analyzed message.
///
/// `_sentiment` is accepted so callers pass the full analysis, but no reply
/// currently depends on it.
pub fn generate_response(intent: Intent, _sentiment: Sentiment, keywords: &[String]) -> &'static str {
    match intent {
        Intent::Greeting => "Hey! How's your day going?",
        Intent::Farewell => "Goodbye! It was great chatting with you!",
        Intent::StatusCheck => "I'm doing well! How about you?",
        Intent::WeatherRequest => {
            "I wish I could tell you the weather, but I'm not connected to a weather API."
        }
        Intent::JokeRequest => "Why don't skeletons fight each other? They don't have the guts.",
        Intent::Unknown if keywords.iter().any(|keyword| keyword == "help") => {
            "It seems like you need help. How can I assist?"
        }
        Intent::Unknown => "I'm not sure what you're asking. Can you give me more details?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn sentiment_never_changes_reply() {
        for intent in [
            Intent::Greeting,
            Intent::Farewell,
            Intent::StatusCheck,
            Intent::WeatherRequest,
            Intent::JokeRequest,
            Intent::Unknown,
        ] {
            let keywords = words(&["help"]);
            let baseline = generate_response(intent, Sentiment::Neutral, &keywords);
            assert_eq!(generate_response(intent, Sentiment::Positive, &keywords), baseline);
            assert_eq!(generate_response(intent, Sentiment::Negative, &keywords), baseline);
        }
    }

    #[test]
    fn help_keyword_only_matters_for_unknown() {
        assert_eq!(
            generate_response(Intent::Unknown, Sentiment::Neutral, &words(&["need", "help"])),
            "It seems like you need help. How can I assist?"
        );
        assert_eq!(
            generate_response(Intent::Unknown, Sentiment::Neutral, &words(&["Help"])),
            "I'm not sure what you're asking. Can you give me more details?"
        );
        assert_eq!(
            generate_response(Intent::Greeting, Sentiment::Neutral, &words(&["help"])),
            "Hey! How's your day going?"
        );
    }
}
