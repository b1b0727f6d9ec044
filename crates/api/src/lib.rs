mod config;
mod rate_limit;

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chatbot_agents::{ConversationJournal, ConversationOrchestrator, FileJournal, TracingJournal};
use chatbot_observability::{AppMetrics, MetricsSnapshot};
use chatbot_text::UnicodeTokenClassifier;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use crate::config::{ChatbotConfig, DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES};
pub use crate::rate_limit::IpRateLimiter;

pub const WELCOME_MESSAGE: &str = "Welcome to the Chatbot. Use /chat to interact.";

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
    pub max_body_bytes: usize,
}

impl ApiState {
    pub fn new(config: &ChatbotConfig, journal: Arc<dyn ConversationJournal>) -> Self {
        let metrics = AppMetrics::shared();
        let classifier = Arc::new(UnicodeTokenClassifier::new(config.max_message_chars));
        let orchestrator = Arc::new(ConversationOrchestrator::new(
            classifier,
            journal,
            metrics.clone(),
        ));

        Self {
            orchestrator,
            metrics,
            limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
            allowed_origins: Arc::new(config.allowed_origins.clone()),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    messages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    responses: Vec<String>,
}

#[derive(Debug, Serialize)]
struct KeywordsResponse {
    keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
}

/// Builds the router with the journal selected by `config.log_file`.
pub fn build_app(config: &ChatbotConfig) -> Result<Router> {
    let journal: Arc<dyn ConversationJournal> = match config.log_file.as_ref() {
        Some(path) => {
            let journal = FileJournal::open(path)?;
            info!(path = %path.display(), "conversation log opened");
            Arc::new(journal)
        }
        None => Arc::new(TracingJournal),
    };

    Ok(build_router(ApiState::new(config, journal)))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/chat/", post(chat))
        .route("/chat/batch", post(chat_batch))
        .route("/chat/batch/", post(chat_batch))
        .route("/extract_keywords", post(extract_keywords))
        .route("/extract_keywords/", post(extract_keywords))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(state.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": WELCOME_MESSAGE }))
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    match state.orchestrator.respond(&request.message) {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        // cause is already journaled by the orchestrator
        Err(_) => internal_error("chat_failed"),
    }
}

async fn chat_batch(
    State(state): State<ApiState>,
    Json(request): Json<BatchRequest>,
) -> impl IntoResponse {
    let responses = state.orchestrator.respond_batch(&request.messages);
    (StatusCode::OK, Json(BatchResponse { responses }))
}

async fn extract_keywords(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.orchestrator.extract_keywords(&request.message) {
        Ok(keywords) if keywords.is_empty() => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "no_valid_keywords",
                "message": "No valid keywords found"
            })),
        )
            .into_response(),
        Ok(keywords) => (StatusCode::OK, Json(KeywordsResponse { keywords })).into_response(),
        Err(_) => internal_error("keyword_extraction_failed"),
    }
}

fn internal_error(code: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": code,
            "message": "Internal Server Error"
        })),
    )
        .into_response()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/" | "/health")
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
