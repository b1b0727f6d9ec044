use crate::models::Intent;

pub const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "greetings",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

pub const FAREWELLS: &[&str] = &["bye", "goodbye", "see you", "later", "take care"];

/// Maps a message to the first intent whose word list it contains.
///
/// Matching is raw substring containment on the lowercased message, so list
/// entries also hit inside longer words ("this" contains "hi").
pub fn resolve_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();

    if contains_any(&lower, GREETINGS) {
        return Intent::Greeting;
    }

    if contains_any(&lower, FAREWELLS) {
        return Intent::Farewell;
    }

    if lower.contains("how are you") {
        return Intent::StatusCheck;
    }

    if lower.contains("weather") {
        return Intent::WeatherRequest;
    }

    if lower.contains("joke") {
        return Intent::JokeRequest;
    }

    Intent::Unknown
}

pub(crate) fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
