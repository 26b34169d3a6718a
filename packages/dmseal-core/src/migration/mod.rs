//! # Migration Module
//!
//! One-time pass that encrypts messages stored before at-rest encryption
//! was switched on.
//!
//! ## Migration Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         MIGRATION FLOW                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  list_conversations() ──── failure ──► Err (nothing to report on)      │
//! │        │                                                                │
//! │        ▼  for each conversation                                        │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ derive key once ── list_messages ── classify                     │  │
//! │  │                                        │                         │  │
//! │  │                  Encrypted ──► skipped │ Plaintext               │  │
//! │  │                                        ▼                         │  │
//! │  │   gate ──► chunk 1 ──► join_all(encrypt + update_message)      │  │
//! │  │   gate ──► chunk 2 ──► ...                                       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │        gate: sleep(batch_delay) unless first chunk of the run,       │
//! │              then check cancellation                                 │
//! │        │  failure of one conversation or message ──► recorded, go on  │
//! │        ▼                                                                │
//! │  MigrationReport { total, encrypted, skipped, errors, failures, ... }  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pass is idempotent: messages that are already encrypted are counted
//! as skipped, so an interrupted or partly failed run can simply be repeated.

mod config;
mod report;

use std::time::Instant;

use futures::future::join_all;
use tokio::sync::watch;

use crate::crypto::ConversationKey;
use crate::envelope::is_encrypted;
use crate::error::{Error, Result};
use crate::messaging::{has_plaintext_fields, MessageCipher, MessageRecord, MessageUpdate};
use crate::storage::{ConversationRecord, MessageStore};

pub use config::{MigrationConfig, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
pub use report::{MigrationItemError, MigrationReport, MigrationStatus};

/// Encryption state of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Holds at least one plaintext value
    Plaintext,
    /// Nothing left to encrypt
    Encrypted,
}

/// Classify a stored message
///
/// A message counts as encrypted when its content is an envelope, or when it
/// has no content and none of its metadata fields hold a plaintext string.
pub fn classify(message: &MessageRecord) -> MessageState {
    match message.content.as_deref() {
        Some(content) if is_encrypted(content) => MessageState::Encrypted,
        Some(content) if !content.is_empty() => MessageState::Plaintext,
        _ => {
            if message.media_metadata.as_ref().is_some_and(has_plaintext_fields) {
                MessageState::Plaintext
            } else {
                MessageState::Encrypted
            }
        }
    }
}

/// Encrypts the plaintext messages of a [`MessageStore`]
pub struct MigrationRunner<S> {
    store: S,
    cipher: MessageCipher,
    config: MigrationConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S: MessageStore> MigrationRunner<S> {
    /// Create a runner
    ///
    /// ## Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(store: S, cipher: MessageCipher, config: MigrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            cipher,
            config,
            cancel: None,
        })
    }

    /// Stop between chunks once the receiver reads `true`
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    // ========================================================================
    // STATUS
    // ========================================================================

    /// Count encrypted and plaintext messages without changing anything
    ///
    /// A conversation whose messages cannot be read is listed in
    /// `errors`; only a failure to list conversations is returned as `Err`.
    pub async fn check_status(&self) -> Result<MigrationStatus> {
        let conversations = self.store.list_conversations().await?;
        let mut status = MigrationStatus {
            total_conversations: conversations.len(),
            ..Default::default()
        };

        for conversation in &conversations {
            let messages = match self.store.list_messages(&conversation.id).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(conversation_id = %conversation.id, error = %e, "Failed to read messages");
                    status
                        .errors
                        .push(MigrationItemError::new(&conversation.id, &e));
                    continue;
                }
            };

            let plaintext = messages
                .iter()
                .filter(|m| classify(m) == MessageState::Plaintext)
                .count();

            status.total_messages += messages.len();
            status.plaintext_count += plaintext;
            status.encrypted_count += messages.len() - plaintext;
            if plaintext > 0 {
                status
                    .conversations_needing_migration
                    .push(conversation.id.clone());
            }
        }

        tracing::debug!(
            conversations = status.total_conversations,
            messages = status.total_messages,
            plaintext = status.plaintext_count,
            "Migration status"
        );
        Ok(status)
    }

    // ========================================================================
    // MIGRATE
    // ========================================================================

    /// Encrypt the plaintext messages of one conversation
    ///
    /// ## Errors
    ///
    /// - `ConversationNotFound` if the conversation does not exist
    /// - `InvalidParticipants` if it is not a two-party conversation
    /// - Store errors from listing its messages
    ///
    /// Failures of individual messages are recorded in the report.
    pub async fn migrate_conversation(&self, conversation_id: &str) -> Result<MigrationReport> {
        let started = Instant::now();
        let mut report = MigrationReport {
            started_at: crate::time::now_timestamp_millis(),
            ..Default::default()
        };

        let conversation = self.store.get_conversation(conversation_id).await?;
        let mut chunks_run = 0;
        report.absorb(self.migrate_record(&conversation, &mut chunks_run).await?);

        report.elapsed_ms = elapsed_ms(started);
        Ok(report)
    }

    /// Encrypt every plaintext message in the store
    ///
    /// A conversation that cannot be processed is recorded under its id and
    /// the run moves on. Only a failure to list conversations is returned as
    /// `Err`.
    pub async fn migrate_all(&self) -> Result<MigrationReport> {
        let started = Instant::now();
        let mut report = MigrationReport {
            started_at: crate::time::now_timestamp_millis(),
            ..Default::default()
        };

        let conversations = self.store.list_conversations().await?;
        tracing::info!(
            conversations = conversations.len(),
            batch_size = self.config.batch_size,
            "Starting message encryption migration"
        );

        let mut chunks_run = 0;
        for conversation in &conversations {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }

            match self.migrate_record(conversation, &mut chunks_run).await {
                Ok(part) => report.absorb(part),
                Err(e) => {
                    tracing::warn!(
                        conversation_id = %conversation.id,
                        error = %e,
                        recoverable = e.is_recoverable(),
                        "Conversation migration failed"
                    );
                    let failure =
                        Error::MigrationFailed(format!("conversation {}: {}", conversation.id, e));
                    report.record_failure(&conversation.id, &failure);
                }
            }

            if report.cancelled {
                break;
            }
        }

        report.elapsed_ms = elapsed_ms(started);
        if report.cancelled {
            tracing::warn!(
                encrypted = report.encrypted,
                errors = report.errors,
                "Migration cancelled"
            );
        } else {
            tracing::info!(
                total = report.total,
                encrypted = report.encrypted,
                skipped = report.skipped,
                errors = report.errors,
                elapsed_ms = report.elapsed_ms,
                "Migration finished"
            );
        }
        Ok(report)
    }

    /// Wait out the pause before a chunk and report whether to stop
    ///
    /// Every chunk of a run passes through here. Only the first chunk of the
    /// run starts without a pause, whichever conversation it belongs to.
    async fn before_chunk(&self, chunks_run: &mut usize) -> bool {
        if *chunks_run > 0 && !self.config.batch_delay.is_zero() {
            tokio::time::sleep(self.config.batch_delay).await;
        }
        *chunks_run += 1;
        self.is_cancelled()
    }

    async fn migrate_record(
        &self,
        conversation: &ConversationRecord,
        chunks_run: &mut usize,
    ) -> Result<MigrationReport> {
        let key = self.cipher.conversation_key(&conversation.participant_ids)?;
        let messages = self.store.list_messages(&conversation.id).await?;

        let pending: Vec<&MessageRecord> = messages
            .iter()
            .filter(|m| classify(m) == MessageState::Plaintext)
            .collect();

        let mut report = MigrationReport {
            total: messages.len(),
            skipped: messages.len() - pending.len(),
            ..Default::default()
        };

        tracing::info!(
            conversation_id = %conversation.id,
            total = report.total,
            pending = pending.len(),
            "Migrating conversation"
        );

        for (index, chunk) in pending.chunks(self.config.batch_size).enumerate() {
            if self.before_chunk(chunks_run).await {
                report.cancelled = true;
                break;
            }

            let results = join_all(chunk.iter().map(|m| self.migrate_message(&key, m))).await;

            for (message, result) in chunk.iter().zip(results) {
                match result {
                    Ok(()) => report.encrypted += 1,
                    Err(e) => {
                        tracing::warn!(message_id = %message.id, error = %e, "Message migration failed");
                        report.record_failure(&message.id, &e);
                    }
                }
            }

            tracing::info!(
                conversation_id = %conversation.id,
                chunk = index + 1,
                size = chunk.len(),
                "Chunk processed"
            );
        }

        Ok(report)
    }

    async fn migrate_message(&self, key: &ConversationKey, message: &MessageRecord) -> Result<()> {
        let update = self.seal_record(key, message)?;
        self.store.update_message(&message.id, update).await
    }

    fn seal_record(&self, key: &ConversationKey, message: &MessageRecord) -> Result<MessageUpdate> {
        let content = match message.content.as_deref() {
            Some(text) if !text.is_empty() && !is_encrypted(text) => {
                Some(self.cipher.encrypt_with_key(key, text)?)
            }
            other => other.map(str::to_string),
        };

        let media_metadata = message
            .media_metadata
            .as_ref()
            .map(|m| self.cipher.encrypt_pending_fields_with_key(key, m))
            .transpose()?;

        Ok(MessageUpdate {
            content,
            media_metadata,
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::messaging::Metadata;
    use crate::storage::{Database, MemoryStore};
    use crate::test_support::fast_cipher;

    const PAIR: [&str; 2] = ["alice", "bob"];

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn quick_config() -> MigrationConfig {
        MigrationConfig::default().with_batch_delay(Duration::ZERO)
    }

    /// Memory store that can refuse selected writes or listings
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing_writes: Mutex<HashSet<String>>,
        failing_reads: Mutex<HashSet<String>>,
        fail_listing: bool,
        cancel_on_write: Option<watch::Sender<bool>>,
    }

    impl FlakyStore {
        fn fail_write(&self, id: &str) {
            self.failing_writes.lock().insert(id.to_string());
        }

        fn heal(&self) {
            self.failing_writes.lock().clear();
        }
    }

    #[async_trait]
    impl MessageStore for FlakyStore {
        async fn list_conversations(&self) -> Result<Vec<ConversationRecord>> {
            if self.fail_listing {
                return Err(Error::StorageReadError("conversations unavailable".into()));
            }
            self.inner.list_conversations().await
        }

        async fn get_conversation(&self, id: &str) -> Result<ConversationRecord> {
            self.inner.get_conversation(id).await
        }

        async fn list_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
            if self.failing_reads.lock().contains(conversation_id) {
                return Err(Error::Timeout(format!("reading {}", conversation_id)));
            }
            self.inner.list_messages(conversation_id).await
        }

        async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()> {
            if let Some(tx) = &self.cancel_on_write {
                let _ = tx.send(true);
            }
            if self.failing_writes.lock().contains(id) {
                return Err(Error::StorageWriteError(format!("write rejected for {}", id)));
            }
            self.inner.update_message(id, update).await
        }
    }

    /// One conversation with five plaintext messages, one envelope, one
    /// content-less message and one media-only message with a filename.
    fn seeded(store: &MemoryStore) {
        let cipher = fast_cipher();
        store.insert_conversation(ConversationRecord::new("c1", "alice", "bob"));
        for i in 1..=5 {
            store.insert_message("c1", MessageRecord::text(format!("m{}", i), format!("Message {}", i)));
        }
        let sealed = cipher.encrypt("already sealed", &PAIR).unwrap();
        store.insert_message("c1", MessageRecord::text("m6", sealed));
        store.insert_message(
            "c1",
            MessageRecord {
                id: "m7".into(),
                content: None,
                media_metadata: None,
            },
        );
        store.insert_message(
            "c1",
            MessageRecord {
                id: "m8".into(),
                content: Some(String::new()),
                media_metadata: Some(metadata(json!({ "filename": "a.pdf", "size": 1024 }))),
            },
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&MessageRecord::text("1", "hello")), MessageState::Plaintext);
        assert_eq!(classify(&MessageRecord::text("2", "ENC:v1:a:b")), MessageState::Encrypted);

        let empty = MessageRecord {
            id: "3".into(),
            content: None,
            media_metadata: None,
        };
        assert_eq!(classify(&empty), MessageState::Encrypted);

        let media = empty
            .clone()
            .with_metadata(metadata(json!({ "filename": "cat.png", "width": 10 })));
        assert_eq!(classify(&media), MessageState::Plaintext);

        let sealed_media = empty.with_metadata(metadata(json!({ "filename": "ENC:v1:x:y", "name": "" })));
        assert_eq!(classify(&sealed_media), MessageState::Encrypted);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let result = MigrationRunner::new(
            MemoryStore::new(),
            fast_cipher(),
            MigrationConfig::default().with_batch_size(0),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_migrate_all_encrypts_and_is_idempotent() {
        let store = MemoryStore::new();
        seeded(&store);
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        let first = runner.migrate_all().await.unwrap();
        assert_eq!(first.total, 8);
        assert_eq!(first.encrypted, 6);
        assert_eq!(first.skipped, 2);
        assert_eq!(first.errors, 0);
        assert!(first.is_complete());

        let second = runner.migrate_all().await.unwrap();
        assert_eq!(second.total, 8);
        assert_eq!(second.encrypted, 0);
        assert_eq!(second.skipped, 8);

        let cipher = fast_cipher();
        let messages = runner.store().list_messages("c1").await.unwrap();
        let decrypted = cipher.decrypt_all(&messages, &PAIR);
        for i in 1..=5 {
            assert_eq!(decrypted[i - 1].content.as_deref(), Some(format!("Message {}", i).as_str()));
        }
        assert_eq!(decrypted[5].content.as_deref(), Some("already sealed"));
        assert_eq!(decrypted[6].content, None);
        assert_eq!(decrypted[7].content.as_deref(), Some(""));

        let media = messages[7].media_metadata.as_ref().unwrap();
        assert!(is_encrypted(media["filename"].as_str().unwrap()));
        assert_eq!(media["size"], json!(1024));
        assert_eq!(
            decrypted[7].media_metadata.as_ref().unwrap()["filename"],
            json!("a.pdf")
        );
    }

    #[tokio::test]
    async fn test_partial_failure_is_recorded() {
        let store = FlakyStore::default();
        seeded(&store.inner);
        store.fail_write("m3");
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        let report = runner.migrate_all().await.unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(report.encrypted, report.total - 1 - report.skipped);
        assert_eq!(report.failures[0].id, "m3");
        assert!(!report.is_complete());

        let m3 = runner.store().inner.message("m3").unwrap();
        assert_eq!(m3.content.as_deref(), Some("Message 3"));

        runner.store().heal();
        let retry = runner.migrate_all().await.unwrap();
        assert_eq!(retry.encrypted, 1);
        assert_eq!(retry.errors, 0);
    }

    #[tokio::test]
    async fn test_small_chunks_cover_every_message() {
        let store = MemoryStore::new();
        store.insert_conversation(ConversationRecord::new("c1", "alice", "bob"));
        for i in 0..7 {
            store.insert_message("c1", MessageRecord::text(format!("m{}", i), "hello"));
        }
        let config = MigrationConfig::default()
            .with_batch_size(3)
            .with_batch_delay(Duration::from_millis(1));
        let runner = MigrationRunner::new(store, fast_cipher(), config).unwrap();

        let report = runner.migrate_all().await.unwrap();
        assert_eq!(report.encrypted, 7);

        let status = runner.check_status().await.unwrap();
        assert_eq!(status.plaintext_count, 0);
        assert_eq!(status.encrypted_count, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_writes_nothing() {
        let store = MemoryStore::new();
        seeded(&store);
        let (_tx, rx) = watch::channel(true);
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config())
            .unwrap()
            .with_cancellation(rx);

        let report = runner.migrate_all().await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.encrypted, 0);
        assert_eq!(
            runner.store().message("m1").unwrap().content.as_deref(),
            Some("Message 1")
        );

        let single = runner.migrate_conversation("c1").await.unwrap();
        assert!(single.cancelled);
        assert_eq!(single.encrypted, 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_chunks() {
        let (tx, rx) = watch::channel(false);
        let store = FlakyStore {
            cancel_on_write: Some(tx),
            ..Default::default()
        };
        store
            .inner
            .insert_conversation(ConversationRecord::new("c1", "alice", "bob"));
        for i in 0..5 {
            store
                .inner
                .insert_message("c1", MessageRecord::text(format!("m{}", i), "hello"));
        }
        let config = quick_config().with_batch_size(2);
        let runner = MigrationRunner::new(store, fast_cipher(), config)
            .unwrap()
            .with_cancellation(rx);

        let report = runner.migrate_all().await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.encrypted, 2);
        assert_eq!(report.total, 5);

        let status = runner.check_status().await.unwrap();
        assert_eq!(status.plaintext_count, 3);
    }

    #[tokio::test]
    async fn test_bad_conversation_does_not_stop_run() {
        let store = MemoryStore::new();
        store.insert_conversation(ConversationRecord::new("broken", "solo", "solo"));
        store.insert_message("broken", MessageRecord::text("b1", "stuck"));
        store.insert_conversation(ConversationRecord::new("good", "alice", "bob"));
        store.insert_message("good", MessageRecord::text("g1", "fine"));
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        let report = runner.migrate_all().await.unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(report.failures[0].id, "broken");
        assert!(report.failures[0].error.starts_with("Migration failed: conversation broken"));
        assert!(report.failures[0].error.contains("Invalid participants"));
        assert_eq!(report.encrypted, 1);

        assert!(matches!(
            runner.migrate_conversation("broken").await,
            Err(Error::InvalidParticipants(_))
        ));
        assert!(matches!(
            runner.migrate_conversation("missing").await,
            Err(Error::ConversationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let store = FlakyStore {
            fail_listing: true,
            ..Default::default()
        };
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        assert!(runner.migrate_all().await.is_err());
        assert!(runner.check_status().await.is_err());
    }

    #[tokio::test]
    async fn test_check_status() {
        let store = FlakyStore::default();
        seeded(&store.inner);
        store
            .inner
            .insert_conversation(ConversationRecord::new("c2", "carol", "dave"));
        store
            .inner
            .insert_conversation(ConversationRecord::new("c3", "erin", "frank"));
        store.failing_reads.lock().insert("c3".into());
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        let status = runner.check_status().await.unwrap();
        assert_eq!(status.total_conversations, 3);
        assert_eq!(status.total_messages, 8);
        assert_eq!(status.plaintext_count, 6);
        assert_eq!(status.encrypted_count, 2);
        assert_eq!(status.conversations_needing_migration, vec!["c1"]);
        assert_eq!(status.errors.len(), 1);
        assert_eq!(status.errors[0].id, "c3");
        assert!(!status.is_fully_encrypted());
    }

    #[tokio::test]
    async fn test_migrate_conversation_scope() {
        let store = MemoryStore::new();
        seeded(&store);
        store.insert_conversation(ConversationRecord::new("c2", "carol", "dave"));
        store.insert_message("c2", MessageRecord::text("other", "untouched"));
        let runner = MigrationRunner::new(store, fast_cipher(), quick_config()).unwrap();

        let report = runner.migrate_conversation("c1").await.unwrap();
        assert_eq!(report.total, 8);
        assert_eq!(report.encrypted, 6);
        assert!(report.started_at > 0);
        assert_eq!(
            runner.store().message("other").unwrap().content.as_deref(),
            Some("untouched")
        );

        let again = runner.migrate_conversation("c1").await.unwrap();
        assert_eq!(again.total, 8);
        assert_eq!(again.encrypted, 0);
        assert_eq!(again.skipped, 8);
    }

    #[tokio::test]
    async fn test_delay_applies_across_conversations() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let id = format!("c{}", i);
            store.insert_conversation(ConversationRecord::new(&id, "alice", "bob"));
            store.insert_message(&id, MessageRecord::text(format!("m{}", i), "hello"));
        }
        // Nothing pending here, so it must not add a pause
        store.insert_conversation(ConversationRecord::new("done", "alice", "bob"));

        let config = MigrationConfig::default()
            .with_batch_size(50)
            .with_batch_delay(Duration::from_millis(40));
        let runner = MigrationRunner::new(store, fast_cipher(), config).unwrap();

        let started = Instant::now();
        let report = runner.migrate_all().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.encrypted, 5);
        assert!(elapsed >= Duration::from_millis(160), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_first_chunk_starts_without_delay() {
        let store = MemoryStore::new();
        seeded(&store);
        let config = MigrationConfig::default().with_batch_delay(Duration::from_secs(30));
        let runner = MigrationRunner::new(store, fast_cipher(), config).unwrap();

        let report = tokio::time::timeout(Duration::from_secs(5), runner.migrate_all())
            .await
            .expect("single chunk run must not sleep")
            .unwrap();
        assert_eq!(report.encrypted, 6);
    }

    #[tokio::test]
    async fn test_migrates_sqlite_store() {
        let db = Database::open(None).await.unwrap();
        db.create_conversation("dm", "bob", "alice").unwrap();
        db.store_message("m1", "dm", Some("first"), None, 1).unwrap();
        db.store_message(
            "m2",
            "dm",
            None,
            Some(&metadata(json!({ "filename": "song.mp3", "duration": 180 }))),
            2,
        )
        .unwrap();

        let runner = MigrationRunner::new(Arc::new(db), fast_cipher(), quick_config()).unwrap();
        let report = runner.migrate_all().await.unwrap();
        assert_eq!(report.encrypted, 2);

        let cipher = fast_cipher();
        let m1 = runner.store().get_message("m1").unwrap().unwrap();
        assert_eq!(cipher.decrypt(m1.content.as_deref().unwrap(), &PAIR), "first");

        let m2 = runner.store().get_message("m2").unwrap().unwrap();
        let fields = cipher.decrypt_fields(m2.media_metadata.as_ref(), &PAIR).unwrap();
        assert_eq!(fields["filename"], json!("song.mp3"));
        assert_eq!(fields["duration"], json!(180));
    }
}
