use anyhow::{Context, Result};
use chatbot_api::{build_app, ChatbotConfig};
use chatbot_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("chatbot_api");

    let config = ChatbotConfig::from_env();
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "chatbot api started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("chatbot api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
