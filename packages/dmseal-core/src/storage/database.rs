//! # Database
//!
//! SQLite implementation of the message store.
//!
//! ## Database Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │ Migration / App │                                                   │
//! │  └────────┬────────┘                                                   │
//! │           │  MessageStore                                               │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │    Database     │  - Conversation listing                           │
//! │  │   (this file)   │  - Message listing / field updates                │
//! │  └────────┬────────┘  - Seeding helpers                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │    rusqlite     │  File for production, in-memory for tests         │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use super::{schema, ConversationRecord, MessageStore};
use crate::error::{Error, Result};
use crate::messaging::{Metadata, MessageRecord, MessageUpdate};

/// The main database handle
///
/// Wraps a SQLite connection and exposes it as a [`MessageStore`].
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub async fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| Error::DatabaseError(format!("Failed to enable foreign keys: {}", e)))?;

        let has_schema: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to inspect schema: {}", e)))?;

        let version: Option<i32> = if has_schema {
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
                .map_err(|e| {
                    Error::DatabaseError(format!("Failed to read schema version: {}", e))
                })?
        } else {
            None
        };

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| {
                    Error::DatabaseError(format!("Failed to set schema version: {}", e))
                })?;

                tracing::info!("Database schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) if v > schema::SCHEMA_VERSION => {
                return Err(Error::DatabaseError(format!(
                    "Database schema version {} is newer than supported {}",
                    v,
                    schema::SCHEMA_VERSION
                )));
            }
            Some(v) => {
                tracing::debug!("Database schema version: {}", v);
            }
        }

        Ok(())
    }

    // ========================================================================
    // SEEDING
    // ========================================================================

    /// Create a DM conversation between two participants
    pub fn create_conversation(&self, id: &str, participant_a: &str, participant_b: &str) -> Result<()> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        conn.execute(
            "INSERT OR IGNORE INTO conversations (id, participant_a, participant_b, created_at)
             VALUES (?, ?, ?, ?)",
            params![id, participant_a, participant_b, now],
        )
        .map_err(|e| Error::DatabaseError(format!("Failed to create conversation: {}", e)))?;

        Ok(())
    }

    /// Store a message as-is (plaintext or envelope)
    pub fn store_message(
        &self,
        id: &str,
        conversation_id: &str,
        content: Option<&str>,
        media_metadata: Option<&Metadata>,
        timestamp: i64,
    ) -> Result<()> {
        let metadata_json = media_metadata.map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO messages (id, conversation_id, content, media_metadata, timestamp)
             VALUES (?, ?, ?, ?, ?)",
            params![id, conversation_id, content, metadata_json, timestamp],
        )
        .map_err(|e| Error::DatabaseError(format!("Failed to store message: {}", e)))?;

        Ok(())
    }

    /// Get a single message by ID
    pub fn get_message(&self, id: &str) -> Result<Option<MessageRecord>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT id, content, media_metadata FROM messages WHERE id = ?",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        );

        match result {
            Ok((id, content, metadata)) => to_message(id, content, metadata).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(format!("Failed to get message: {}", e))),
        }
    }
}

fn to_message(id: String, content: Option<String>, metadata: Option<String>) -> Result<MessageRecord> {
    let media_metadata = metadata
        .map(|json| serde_json::from_str::<Metadata>(&json))
        .transpose()?;

    Ok(MessageRecord {
        id,
        content,
        media_metadata,
    })
}

#[async_trait]
impl MessageStore for Database {
    async fn list_conversations(&self) -> Result<Vec<ConversationRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, participant_a, participant_b FROM conversations
                 ORDER BY created_at, id",
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ConversationRecord::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| Error::DatabaseError(format!("Failed to query conversations: {}", e)))?;

        let mut conversations = Vec::new();
        for row in rows {
            conversations.push(row.map_err(|e| {
                Error::DatabaseError(format!("Failed to read conversation: {}", e))
            })?);
        }

        Ok(conversations)
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT id, participant_a, participant_b FROM conversations WHERE id = ?",
            params![id],
            |row| {
                Ok(ConversationRecord::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match result {
            Ok(record) => Ok(record),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(Error::ConversationNotFound(id.to_string()))
            }
            Err(e) => Err(Error::DatabaseError(format!("Failed to get conversation: {}", e))),
        }
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, content, media_metadata FROM messages
                 WHERE conversation_id = ? ORDER BY timestamp, id",
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![conversation_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(|e| Error::DatabaseError(format!("Failed to query messages: {}", e)))?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, content, metadata) =
                row.map_err(|e| Error::DatabaseError(format!("Failed to read message: {}", e)))?;
            messages.push(to_message(id, content, metadata)?);
        }

        Ok(messages)
    }

    async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()> {
        let metadata_json = update
            .media_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let conn = self.conn.lock();

        let rows = conn
            .execute(
                "UPDATE messages SET content = ?, media_metadata = ? WHERE id = ?",
                params![update.content, metadata_json, id],
            )
            .map_err(|e| Error::StorageWriteError(format!("Failed to update message: {}", e)))?;

        if rows == 0 {
            return Err(Error::MessageNotFound(id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
