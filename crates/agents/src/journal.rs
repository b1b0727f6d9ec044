use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chatbot_core::{Intent, Sentiment};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    MessageAnalyzed {
        message: String,
        intent: Intent,
        sentiment: Sentiment,
        keywords: Vec<String>,
    },
    ResponseSent {
        response: String,
    },
    BatchItemProcessed {
        message: String,
    },
    BatchItemFailed {
        message: String,
        error: String,
    },
    ChatFailed {
        error: String,
    },
    KeywordsFailed {
        error: String,
    },
}

impl JournalEvent {
    pub fn level(&self) -> JournalLevel {
        match self {
            Self::BatchItemFailed { .. } | Self::ChatFailed { .. } | Self::KeywordsFailed { .. } => {
                JournalLevel::Error
            }
            _ => JournalLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub level: JournalLevel,
    #[serde(flatten)]
    pub event: JournalEvent,
}

impl JournalEntry {
    pub fn now(event: JournalEvent) -> Self {
        Self {
            at: Utc::now(),
            level: event.level(),
            event,
        }
    }
}

/// Append-only sink for per-message conversation records.
pub trait ConversationJournal: Send + Sync {
    fn record(&self, entry: JournalEntry);
}

/// Forwards every entry to `tracing` at the entry's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingJournal;

impl ConversationJournal for TracingJournal {
    fn record(&self, entry: JournalEntry) {
        emit_tracing(&entry.event);
    }
}

fn emit_tracing(event: &JournalEvent) {
    match event {
        JournalEvent::MessageAnalyzed {
            message,
            intent,
            sentiment,
            keywords,
        } => info!(
            user_message = %message,
            intent = intent.as_label(),
            sentiment = sentiment.as_label(),
            keywords = ?keywords,
            "message analyzed"
        ),
        JournalEvent::ResponseSent { response } => info!(response = %response, "response sent"),
        JournalEvent::BatchItemProcessed { message } => {
            info!(user_message = %message, "processed message")
        }
        JournalEvent::BatchItemFailed { message, error } => {
            error!(user_message = %message, error = %error, "error processing message")
        }
        JournalEvent::ChatFailed { error } => {
            error!(error = %error, "failed to generate response")
        }
        JournalEvent::KeywordsFailed { error } => {
            error!(error = %error, "failed to extract keywords")
        }
    }
}

/// Appends one JSON object per line to a file, and mirrors to tracing.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open conversation log {}", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationJournal for FileJournal {
    fn record(&self, entry: JournalEntry) {
        emit_tracing(&entry.event);

        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to serialize journal entry");
                return;
            }
        };

        let mut file = self.file.lock();
        if let Err(err) = writeln!(file, "{line}") {
            warn!(path = %self.path.display(), error = %err, "failed to append journal entry");
        }
    }
}

/// Keeps entries in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    pub fn events(&self) -> Vec<JournalEvent> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.event.clone())
            .collect()
    }
}

impl ConversationJournal for MemoryJournal {
    fn record(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }
}
