//! Migration outcomes.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A message or conversation the migration could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationItemError {
    /// Message id, or conversation id when the whole conversation failed
    pub id: String,
    /// Error description
    pub error: String,
}

impl MigrationItemError {
    pub(crate) fn new(id: impl Into<String>, error: &Error) -> Self {
        Self {
            id: id.into(),
            error: error.to_string(),
        }
    }
}

/// Counters for one migration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Messages examined
    pub total: usize,
    /// Messages encrypted by this run
    pub encrypted: usize,
    /// Messages already encrypted, left untouched
    pub skipped: usize,
    /// Messages or conversations that failed
    pub errors: usize,
    /// One record per failure
    pub failures: Vec<MigrationItemError>,
    /// Whether the run stopped early on request
    pub cancelled: bool,
    /// Unix timestamp (ms) the run started at
    pub started_at: i64,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl MigrationReport {
    pub(crate) fn record_failure(&mut self, id: impl Into<String>, error: &Error) {
        self.errors += 1;
        self.failures.push(MigrationItemError::new(id, error));
    }

    /// Fold another report's counters into this one
    pub(crate) fn absorb(&mut self, other: MigrationReport) {
        self.total += other.total;
        self.encrypted += other.encrypted;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.failures.extend(other.failures);
        self.cancelled |= other.cancelled;
    }

    /// True when every examined message ended up encrypted
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.errors == 0
    }
}

/// Read-only snapshot of how much of the corpus is still plaintext
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Conversations in the store
    pub total_conversations: usize,
    /// Messages across all readable conversations
    pub total_messages: usize,
    /// Messages already encrypted
    pub encrypted_count: usize,
    /// Messages still holding plaintext
    pub plaintext_count: usize,
    /// Conversations with at least one plaintext message
    pub conversations_needing_migration: Vec<String>,
    /// Conversations whose messages could not be read
    pub errors: Vec<MigrationItemError>,
}

impl MigrationStatus {
    /// Whether nothing is left to migrate
    pub fn is_fully_encrypted(&self) -> bool {
        self.plaintext_count == 0 && self.errors.is_empty()
    }
}
