//! # Messaging Module
//!
//! Encryption of direct-message values at rest.
//!
//! ## Read / Write Paths
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      MESSAGE VALUE ENCRYPTION                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Write (send / migration)                                              │
//! │  ─────────────────────────────────────────────────────────────         │
//! │  "Hello Bob!" ──► derive key(alice, bob) ──► seal ──► "ENC:v1:..:.."   │
//! │                                                                         │
//! │  Read (render)                                                         │
//! │  ─────────────────────────────────────────────────────────────         │
//! │  "ENC:v1:..:.." ──► parse ──► open ──► "Hello Bob!"                    │
//! │        │                        │                                       │
//! │        │                        └── failure ──► SENTINEL (never Err)   │
//! │        │                                                                │
//! │  "legacy text" ──► not an envelope ──► "legacy text" (passthrough)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reading never fails: one corrupted or foreign-key value must not take down
//! a whole conversation view, so every decryption failure is replaced with
//! [`DECRYPTION_FAILED_SENTINEL`]. Writing returns errors, since those point at
//! a bug in the caller.

mod batch;
mod metadata;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::crypto::{
    derive_conversation_key, open, seal, CipherProvider, ConversationKey, RustCryptoProvider,
};
use crate::envelope::{is_encrypted, Envelope};
use crate::error::{Error, Result};

pub use metadata::has_plaintext_fields;

/// Placeholder returned in place of a value that could not be decrypted
pub const DECRYPTION_FAILED_SENTINEL: &str = "[Message could not be decrypted]";

/// Media metadata attached to a message: a flat JSON object
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A message as seen by the cipher: identifier plus the encryptable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message identifier
    pub id: String,
    /// Plaintext or envelope; `None` for content-less messages
    pub content: Option<String>,
    /// Media metadata, if any
    pub media_metadata: Option<Metadata>,
}

impl MessageRecord {
    /// A message with text content and no metadata
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            media_metadata: None,
        }
    }

    /// Attach media metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.media_metadata = Some(metadata);
        self
    }
}

/// New values for a message's encryptable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    /// New content value
    pub content: Option<String>,
    /// New media metadata value
    pub media_metadata: Option<Metadata>,
}

/// Encrypts and decrypts message values for a conversation.
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct MessageCipher {
    provider: Arc<dyn CipherProvider>,
}

impl Default for MessageCipher {
    fn default() -> Self {
        Self::new(Arc::new(RustCryptoProvider::new()))
    }
}

impl std::fmt::Debug for MessageCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCipher").finish_non_exhaustive()
    }
}

impl MessageCipher {
    /// Create a cipher over the given provider
    pub fn new(provider: Arc<dyn CipherProvider>) -> Self {
        Self { provider }
    }

    /// The underlying provider
    pub fn provider(&self) -> &dyn CipherProvider {
        self.provider.as_ref()
    }

    /// Derive the key for a participant list
    pub fn conversation_key<S: AsRef<str>>(&self, participant_ids: &[S]) -> Result<ConversationKey> {
        derive_conversation_key(self.provider(), participant_ids)
    }

    // ========================================================================
    // ENCRYPT
    // ========================================================================

    /// Encrypt a plaintext value into an envelope string
    ///
    /// ## Errors
    ///
    /// - `InvalidPlaintext` if `plaintext` is empty
    /// - `InvalidParticipants` unless exactly two distinct ids are given
    pub fn encrypt<S: AsRef<str>>(&self, plaintext: &str, participant_ids: &[S]) -> Result<String> {
        ensure_plaintext(plaintext)?;
        let key = self.conversation_key(participant_ids)?;
        self.encrypt_with_key(&key, plaintext)
    }

    /// Encrypt with an already derived key
    pub fn encrypt_with_key(&self, key: &ConversationKey, plaintext: &str) -> Result<String> {
        ensure_plaintext(plaintext)?;
        let (nonce, ciphertext) = seal(self.provider(), key, plaintext.as_bytes())?;
        Ok(Envelope::new(nonce, ciphertext).to_string())
    }

    /// Encrypt the fields of an outgoing message
    ///
    /// Empty or absent content is left as-is; metadata strings are encrypted
    /// field by field.
    pub fn encrypt_message<S: AsRef<str>>(
        &self,
        content: Option<&str>,
        media_metadata: Option<&Metadata>,
        participant_ids: &[S],
    ) -> Result<MessageUpdate> {
        let key = self.conversation_key(participant_ids)?;

        let content = match content {
            Some(text) if !text.is_empty() => Some(self.encrypt_with_key(&key, text)?),
            other => other.map(str::to_string),
        };
        let media_metadata = media_metadata
            .map(|m| self.encrypt_fields_with_key(&key, m))
            .transpose()?;

        Ok(MessageUpdate {
            content,
            media_metadata,
        })
    }

    // ========================================================================
    // DECRYPT
    // ========================================================================

    /// Decrypt a value, never failing
    ///
    /// - Non-envelope input is returned unchanged.
    /// - Any failure on envelope input yields [`DECRYPTION_FAILED_SENTINEL`].
    pub fn decrypt<S: AsRef<str>>(&self, input: &str, participant_ids: &[S]) -> String {
        if !is_encrypted(input) {
            return input.to_string();
        }

        match self.try_decrypt(input, participant_ids) {
            Ok(plaintext) => plaintext,
            Err(e) => sentinel(&e),
        }
    }

    /// Decrypt with an already derived key, never failing
    pub fn decrypt_with_key(&self, key: &ConversationKey, input: &str) -> String {
        match self.try_decrypt_with_key(key, input) {
            Ok(plaintext) => plaintext,
            Err(e) => sentinel(&e),
        }
    }

    /// Decrypt a value, reporting failures
    ///
    /// Non-envelope input is returned unchanged. Intended for tooling; message
    /// rendering should use [`MessageCipher::decrypt`].
    pub fn try_decrypt<S: AsRef<str>>(&self, input: &str, participant_ids: &[S]) -> Result<String> {
        if !is_encrypted(input) {
            return Ok(input.to_string());
        }

        let key = self.conversation_key(participant_ids)?;
        self.try_decrypt_with_key(&key, input)
    }

    /// Decrypt with an already derived key, reporting failures
    pub fn try_decrypt_with_key(&self, key: &ConversationKey, input: &str) -> Result<String> {
        if !is_encrypted(input) {
            return Ok(input.to_string());
        }

        let envelope = Envelope::parse(input)?;
        let plaintext = open(self.provider(), key, &envelope.nonce, &envelope.ciphertext)?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::DecryptionFailed("plaintext is not valid UTF-8".into()))
    }

    /// Decrypt with an optional key; a missing key turns envelopes into the sentinel
    fn decrypt_value(&self, key: Option<&ConversationKey>, value: &str) -> String {
        if !is_encrypted(value) {
            return value.to_string();
        }

        match key {
            Some(key) => self.decrypt_with_key(key, value),
            None => DECRYPTION_FAILED_SENTINEL.to_string(),
        }
    }
}

fn ensure_plaintext(plaintext: &str) -> Result<()> {
    if plaintext.is_empty() {
        return Err(Error::InvalidPlaintext("plaintext must not be empty".into()));
    }
    Ok(())
}

fn sentinel(err: &Error) -> String {
    tracing::warn!(code = err.code(), error = %err, "Value could not be decrypted");
    DECRYPTION_FAILED_SENTINEL.to_string()
}

// ============================================================================
// TESTS
// ============================================================================
