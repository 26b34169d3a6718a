//! # Storage Module
//!
//! The persistence collaborator the cipher and the migration runner talk to.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  MessageStore (trait)                                           │   │
//! │  │  ────────────────────                                           │   │
//! │  │  list_conversations()          → [{id, participant_ids}]        │   │
//! │  │  get_conversation(id)          → {id, participant_ids}          │   │
//! │  │  list_messages(conversation)   → [{id, content, metadata}]      │   │
//! │  │  update_message(id, update)    → ()                             │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │                 ▼                               ▼                       │
//! │  ┌─────────────────────────┐     ┌─────────────────────────────────┐   │
//! │  │  MemoryStore            │     │  Database (SQLite)              │   │
//! │  │  tests, dry runs        │     │  file or in-memory              │   │
//! │  └─────────────────────────┘     └─────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `content` and `media_metadata` are ever written back; conversations
//! and messages are created and owned by the application.

mod database;
mod memory;
mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::messaging::{MessageRecord, MessageUpdate};

pub use database::Database;
pub use memory::MemoryStore;

/// A direct-message conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Conversation identifier
    pub id: String,
    /// Participant identifiers (exactly two for a valid DM)
    pub participant_ids: Vec<String>,
}

impl ConversationRecord {
    /// Create a conversation between two participants
    pub fn new(id: impl Into<String>, a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            participant_ids: vec![a.into(), b.into()],
        }
    }
}

/// Access to stored conversations and messages
///
/// Every method may suspend; timeouts are the implementation's concern.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All conversations
    async fn list_conversations(&self) -> Result<Vec<ConversationRecord>>;

    /// One conversation, or `ConversationNotFound`
    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord>;

    /// All messages of a conversation in chronological order
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>>;

    /// Replace the encryptable fields of a message
    async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()>;
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn list_conversations(&self) -> Result<Vec<ConversationRecord>> {
        (**self).list_conversations().await
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord> {
        (**self).get_conversation(id).await
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        (**self).list_messages(conversation_id).await
    }

    async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()> {
        (**self).update_message(id, update).await
    }
}
