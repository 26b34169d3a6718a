//! In-memory message store.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ConversationRecord, MessageStore};
use crate::error::{Error, Result};
use crate::messaging::{MessageRecord, MessageUpdate};

#[derive(Debug, Default)]
struct Inner {
    conversations: Vec<ConversationRecord>,
    // (conversation_id, message) in insertion order
    messages: Vec<(String, MessageRecord)>,
}

/// A [`MessageStore`] kept entirely in memory
///
/// Conversations and messages are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a conversation
    pub fn insert_conversation(&self, conversation: ConversationRecord) {
        let mut inner = self.inner.write();
        match inner
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            Some(existing) => *existing = conversation,
            None => inner.conversations.push(conversation),
        }
    }

    /// Append a message to a conversation
    pub fn insert_message(&self, conversation_id: &str, message: MessageRecord) {
        self.inner
            .write()
            .messages
            .push((conversation_id.to_string(), message));
    }

    /// Look up a message by id
    pub fn message(&self, id: &str) -> Option<MessageRecord> {
        self.inner
            .read()
            .messages
            .iter()
            .find(|(_, m)| m.id == id)
            .map(|(_, m)| m.clone())
    }

    /// Number of stored messages across all conversations
    pub fn message_count(&self) -> usize {
        self.inner.read().messages.len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_conversations(&self) -> Result<Vec<ConversationRecord>> {
        Ok(self.inner.read().conversations.clone())
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord> {
        self.inner
            .read()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::ConversationNotFound(id.to_string()))
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        Ok(self
            .inner
            .read()
            .messages
            .iter()
            .filter(|(conv, _)| conv == conversation_id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()> {
        let mut inner = self.inner.write();
        let (_, message) = inner
            .messages
            .iter_mut()
            .find(|(_, m)| m.id == id)
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))?;

        message.content = update.content;
        message.media_metadata = update.media_metadata;
        Ok(())
    }
}
