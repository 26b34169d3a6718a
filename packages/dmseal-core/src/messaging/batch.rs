//! Decryption of a whole message list for rendering.

use super::{MessageCipher, MessageRecord};
use crate::crypto::ConversationKey;
use crate::envelope::is_encrypted;

impl MessageCipher {
    /// Decrypt a list of messages from one conversation
    ///
    /// The output has the same length and order as the input and keeps every
    /// identifier. Messages without content pass through, and values that
    /// cannot be decrypted become the sentinel without aborting the batch.
    /// The conversation key is derived at most once per call.
    pub fn decrypt_all<S: AsRef<str>>(
        &self,
        messages: &[MessageRecord],
        participant_ids: &[S],
    ) -> Vec<MessageRecord> {
        if !messages.iter().any(has_envelope) {
            return messages.to_vec();
        }

        match self.key_or_warn(participant_ids) {
            Some(key) => messages
                .iter()
                .map(|message| self.decrypt_message_with_key(&key, message))
                .collect(),
            None => messages
                .iter()
                .map(|message| self.decrypt_record(None, message))
                .collect(),
        }
    }

    /// Decrypt one message with an already derived key
    pub fn decrypt_message_with_key(
        &self,
        key: &ConversationKey,
        message: &MessageRecord,
    ) -> MessageRecord {
        self.decrypt_record(Some(key), message)
    }

    fn decrypt_record(&self, key: Option<&ConversationKey>, message: &MessageRecord) -> MessageRecord {
        MessageRecord {
            id: message.id.clone(),
            content: message
                .content
                .as_deref()
                .map(|content| self.decrypt_value(key, content)),
            media_metadata: message
                .media_metadata
                .as_ref()
                .map(|metadata| self.decrypt_fields_with_key(key, metadata)),
        }
    }
}

fn has_envelope(message: &MessageRecord) -> bool {
    let content = message.content.as_deref().is_some_and(is_encrypted);
    let metadata = message.media_metadata.as_ref().is_some_and(|m| {
        m.values()
            .any(|v| v.as_str().is_some_and(is_encrypted))
    });
    content || metadata
}

// ============================================================================
// TESTS
// ============================================================================
