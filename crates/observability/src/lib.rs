use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    messages_total: AtomicU64,
    failures_total: AtomicU64,
    unknown_intent_total: AtomicU64,
    keyword_requests_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub messages_total: u64,
    pub failures_total: u64,
    pub unknown_intent_total: u64,
    pub keyword_requests_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chatbot_requests_total").increment(1);
    }

    pub fn inc_message(&self) {
        self.messages_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chatbot_messages_total").increment(1);
    }

    pub fn inc_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chatbot_failures_total").increment(1);
    }

    pub fn inc_unknown_intent(&self) {
        self.unknown_intent_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chatbot_unknown_intent_total").increment(1);
    }

    pub fn inc_keyword_request(&self) {
        self.keyword_requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chatbot_keyword_requests_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            messages_total: self.messages_total.load(Ordering::Relaxed),
            failures_total: self.failures_total.load(Ordering::Relaxed),
            unknown_intent_total: self.unknown_intent_total.load(Ordering::Relaxed),
            keyword_requests_total: self.keyword_requests_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,chatbot_api=info,chatbot_agents=info",
                service_name
            ))
        });

        // stdout belongs to command output
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
