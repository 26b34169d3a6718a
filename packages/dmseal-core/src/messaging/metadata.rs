//! Field-level encryption of media metadata.
//!
//! Only non-empty string values are sealed (original filenames, captions).
//! Numbers, booleans, nulls, arrays, nested objects and empty strings are
//! stored as-is; the media binary itself lives elsewhere under access control.

use serde_json::Value;

use super::{Metadata, MessageCipher};
use crate::crypto::ConversationKey;
use crate::envelope::is_encrypted;
use crate::error::Result;

/// Whether any field still holds a non-empty plaintext string
pub fn has_plaintext_fields(metadata: &Metadata) -> bool {
    metadata.values().any(|value| match value {
        Value::String(s) => !s.is_empty() && !is_encrypted(s),
        _ => false,
    })
}

fn has_encrypted_fields(metadata: &Metadata) -> bool {
    metadata
        .values()
        .any(|value| matches!(value, Value::String(s) if is_encrypted(s)))
}

impl MessageCipher {
    /// Encrypt every non-empty string field
    ///
    /// `None` stays `None` and an empty map stays empty.
    pub fn encrypt_fields<S: AsRef<str>>(
        &self,
        metadata: Option<&Metadata>,
        participant_ids: &[S],
    ) -> Result<Option<Metadata>> {
        let Some(metadata) = metadata else {
            return Ok(None);
        };
        if metadata.is_empty() {
            return Ok(Some(Metadata::new()));
        }

        let key = self.conversation_key(participant_ids)?;
        self.encrypt_fields_with_key(&key, metadata).map(Some)
    }

    /// Encrypt every non-empty string field with an already derived key
    pub fn encrypt_fields_with_key(
        &self,
        key: &ConversationKey,
        metadata: &Metadata,
    ) -> Result<Metadata> {
        self.map_strings(metadata, |value| self.encrypt_with_key(key, value))
    }

    /// Encrypt only the string fields that are not envelopes yet
    ///
    /// Used by the migration so a partly encrypted map is never sealed twice.
    pub fn encrypt_pending_fields_with_key(
        &self,
        key: &ConversationKey,
        metadata: &Metadata,
    ) -> Result<Metadata> {
        self.map_strings(metadata, |value| {
            if is_encrypted(value) {
                Ok(value.to_string())
            } else {
                self.encrypt_with_key(key, value)
            }
        })
    }

    /// Decrypt every envelope field, never failing
    ///
    /// Fields that cannot be decrypted become the sentinel; plaintext fields
    /// and non-string values pass through.
    pub fn decrypt_fields<S: AsRef<str>>(
        &self,
        metadata: Option<&Metadata>,
        participant_ids: &[S],
    ) -> Option<Metadata> {
        let metadata = metadata?;
        if !has_encrypted_fields(metadata) {
            return Some(metadata.clone());
        }

        let key = self.key_or_warn(participant_ids);
        Some(self.decrypt_fields_with_key(key.as_ref(), metadata))
    }

    pub(super) fn decrypt_fields_with_key(
        &self,
        key: Option<&ConversationKey>,
        metadata: &Metadata,
    ) -> Metadata {
        metadata
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) if !s.is_empty() => {
                        Value::String(self.decrypt_value(key, s))
                    }
                    other => other.clone(),
                };
                (name.clone(), value)
            })
            .collect()
    }

    pub(super) fn key_or_warn<S: AsRef<str>>(
        &self,
        participant_ids: &[S],
    ) -> Option<ConversationKey> {
        match self.conversation_key(participant_ids) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot derive conversation key; encrypted values will be replaced");
                None
            }
        }
    }

    fn map_strings<F>(&self, metadata: &Metadata, mut f: F) -> Result<Metadata>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let mut out = Metadata::new();
        for (name, value) in metadata {
            let value = match value {
                Value::String(s) if !s.is_empty() => Value::String(f(s)?),
                other => other.clone(),
            };
            out.insert(name.clone(), value);
        }
        Ok(out)
    }
}

// ============================================================================
// TESTS
// ============================================================================
