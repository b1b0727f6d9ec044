use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chatbot_agents::{JournalEvent, JournalLevel, MemoryJournal};
use chatbot_api::{build_app, build_router, ApiState, ChatbotConfig};
use chatbot_core::{Intent, Sentiment, BATCH_ITEM_ERROR_REPLY};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_app(&ChatbotConfig::default()).expect("app should build")
}

fn app_with_journal(config: ChatbotConfig) -> (Router, Arc<MemoryJournal>) {
    let journal = Arc::new(MemoryJournal::new());
    let state = ApiState::new(&config, journal.clone());
    (build_router(state), journal)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn root_returns_welcome() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let parsed = body_json(response).await;
    assert_eq!(
        parsed["message"],
        "Welcome to the Chatbot. Use /chat to interact."
    );
}

#[tokio::test]
async fn health_reports_metrics() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json("/chat/", json!({ "message": "hello there" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["metrics"]["messages_total"], 1);
}

#[tokio::test]
async fn chat_greets_and_journals() {
    let (app, journal) = app_with_journal(ChatbotConfig::default());

    let response = app
        .oneshot(post_json("/chat/", json!({ "message": "hello there" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let parsed = body_json(response).await;
    assert_eq!(parsed, json!({ "response": "Hey! How's your day going?" }));

    assert_eq!(
        journal.events()[0],
        JournalEvent::MessageAnalyzed {
            message: "hello there".to_string(),
            intent: Intent::Greeting,
            sentiment: Sentiment::Neutral,
            keywords: vec!["hello".to_string()],
        }
    );
}

#[tokio::test]
async fn chat_without_trailing_slash_is_routed() {
    let response = app()
        .oneshot(post_json(
            "/chat",
            json!({ "message": "the weather is bad today" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(
        parsed["response"],
        "I wish I could tell you the weather, but I'm not connected to a weather API."
    );
}

#[tokio::test]
async fn chat_failure_hides_cause() {
    let config = ChatbotConfig {
        max_message_chars: 4,
        ..ChatbotConfig::default()
    };
    let (app, journal) = app_with_journal(config);

    let response = app
        .oneshot(post_json("/chat/", json!({ "message": "hello there" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let parsed = body_json(response).await;
    assert_eq!(
        parsed,
        json!({ "error": "chat_failed", "message": "Internal Server Error" })
    );

    let entries = journal.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, JournalLevel::Error);
    assert!(matches!(
        &entries[0].event,
        JournalEvent::ChatFailed { error } if error.contains("exceeds")
    ));
}

#[tokio::test]
async fn malformed_payload_is_client_error() {
    let response = app()
        .oneshot(post_json("/chat/", json!({ "text": "hello" })))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn batch_keeps_order() {
    let response = app()
        .oneshot(post_json(
            "/chat/batch/",
            json!({ "messages": ["hi", "bye", "tell me a joke"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(
        parsed,
        json!({
            "responses": [
                "Hey! How's your day going?",
                "Goodbye! It was great chatting with you!",
                "Why don't skeletons fight each other? They don't have the guts."
            ]
        })
    );
}

#[tokio::test]
async fn batch_of_nothing_is_empty() {
    let response = app()
        .oneshot(post_json("/chat/batch/", json!({ "messages": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "responses": [] }));
}

#[tokio::test]
async fn batch_isolates_oversized_message() {
    let config = ChatbotConfig {
        max_message_chars: 10,
        ..ChatbotConfig::default()
    };
    let (app, journal) = app_with_journal(config);

    let response = app
        .oneshot(post_json(
            "/chat/batch/",
            json!({ "messages": ["hi", "this message is far too long", "bye"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(
        parsed["responses"],
        json!([
            "Hey! How's your day going?",
            BATCH_ITEM_ERROR_REPLY,
            "Goodbye! It was great chatting with you!"
        ])
    );

    let failed: Vec<_> = journal
        .events()
        .into_iter()
        .filter(|event| matches!(event, JournalEvent::BatchItemFailed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
}

#[tokio::test]
async fn extract_keywords_filters_stop_words() {
    let response = app()
        .oneshot(post_json(
            "/extract_keywords/",
            json!({ "message": "Can you help me find the train station?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(
        parsed,
        json!({ "keywords": ["help", "find", "train", "station"] })
    );
}

#[tokio::test]
async fn extract_keywords_rejects_empty_result() {
    let response = app()
        .oneshot(post_json(
            "/extract_keywords/",
            json!({ "message": "the, and... is it?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], "no_valid_keywords");
    assert_eq!(parsed["message"], "No valid keywords found");
}

#[tokio::test]
async fn rate_limit_applies_per_forwarded_ip() {
    let config = ChatbotConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 1,
        ..ChatbotConfig::default()
    };
    let (app, _) = app_with_journal(config);

    let request = |ip: &str| {
        let mut request = post_json("/chat/", json!({ "message": "hi" }));
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        request
    };

    let first = app.clone().oneshot(request("10.0.0.1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(request("10.0.0.1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["error"], "rate_limited");

    let other = app.clone().oneshot(request("10.0.0.2")).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
