pub mod journal;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chatbot_core::{
    extract_keywords, generate_response, resolve_intent, tag_sentiment, ChatError, Intent,
    MessageAnalysis, TokenClassifier, BATCH_ITEM_ERROR_REPLY,
};
use chatbot_observability::AppMetrics;
use tracing::instrument;

pub use journal::{
    ConversationJournal, FileJournal, JournalEntry, JournalEvent, JournalLevel, MemoryJournal,
    TracingJournal,
};

/// Runs the analyze, log, reply sequence for single and batch messages.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    classifier: Arc<dyn TokenClassifier>,
    journal: Arc<dyn ConversationJournal>,
    metrics: Arc<AppMetrics>,
}

impl ConversationOrchestrator {
    pub fn new(
        classifier: Arc<dyn TokenClassifier>,
        journal: Arc<dyn ConversationJournal>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            classifier,
            journal,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn analyze(&self, message: &str) -> Result<MessageAnalysis, ChatError> {
        let sentiment = tag_sentiment(message);
        let keywords = extract_keywords(self.classifier.as_ref(), message)?;
        let intent = resolve_intent(message);

        Ok(MessageAnalysis {
            message: message.to_string(),
            intent,
            sentiment,
            keywords,
        })
    }

    #[instrument(skip(self, message))]
    pub fn respond(&self, message: &str) -> Result<String, ChatError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let result = self.guarded_reply(message);
        if let Err(err) = &result {
            self.metrics.inc_failure();
            self.record(JournalEvent::ChatFailed {
                error: err.to_string(),
            });
        }

        self.metrics.observe_latency(started.elapsed());
        result
    }

    /// One reply per input, in input order. A message that errors or panics
    /// gets [`BATCH_ITEM_ERROR_REPLY`] and the rest of the batch carries on.
    #[instrument(skip(self, messages), fields(batch_size = messages.len()))]
    pub fn respond_batch(&self, messages: &[String]) -> Vec<String> {
        let started = Instant::now();
        self.metrics.inc_request();

        let responses = messages
            .iter()
            .map(|message| match self.guarded_reply(message) {
                Ok(response) => {
                    self.record(JournalEvent::BatchItemProcessed {
                        message: message.clone(),
                    });
                    response
                }
                Err(err) => {
                    self.metrics.inc_failure();
                    self.record(JournalEvent::BatchItemFailed {
                        message: message.clone(),
                        error: err.to_string(),
                    });
                    BATCH_ITEM_ERROR_REPLY.to_string()
                }
            })
            .collect();

        self.metrics.observe_latency(started.elapsed());
        responses
    }

    pub fn extract_keywords(&self, message: &str) -> Result<Vec<String>, ChatError> {
        self.metrics.inc_request();
        self.metrics.inc_keyword_request();

        extract_keywords(self.classifier.as_ref(), message).inspect_err(|err| {
            self.metrics.inc_failure();
            self.record(JournalEvent::KeywordsFailed {
                error: err.to_string(),
            });
        })
    }

    // A panicking classifier fails only the message it was given.
    fn guarded_reply(&self, message: &str) -> Result<String, ChatError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.reply_to(message)))
            .unwrap_or_else(|payload| Err(ChatError::Panicked(panic_detail(payload.as_ref()))))
    }

    fn reply_to(&self, message: &str) -> Result<String, ChatError> {
        let analysis = self.analyze(message)?;
        self.metrics.inc_message();
        if analysis.intent == Intent::Unknown {
            self.metrics.inc_unknown_intent();
        }

        let response =
            generate_response(analysis.intent, analysis.sentiment, &analysis.keywords).to_string();

        self.record(JournalEvent::MessageAnalyzed {
            message: analysis.message,
            intent: analysis.intent,
            sentiment: analysis.sentiment,
            keywords: analysis.keywords,
        });
        self.record(JournalEvent::ResponseSent {
            response: response.clone(),
        });

        Ok(response)
    }

    fn record(&self, event: JournalEvent) {
        self.journal.record(JournalEntry::now(event));
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
