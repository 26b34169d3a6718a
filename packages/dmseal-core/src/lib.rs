//! # dmseal Core
//!
//! At-rest encryption for direct messages, plus a one-time migration pass
//! that encrypts messages stored before encryption was enabled.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DMSEAL CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │         Migration            │   │   Application send / read    │   │
//! │  │ - check_status               │   │   paths                      │   │
//! │  │ - migrate_conversation       │   │                              │   │
//! │  │ - migrate_all                │   │                              │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 │                                   │                   │
//! │                 ▼                                   ▼                   │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         Messaging                                │  │
//! │  │  MessageCipher (values) · metadata fields · batch decryption     │  │
//! │  └───────┬──────────────────────────┬────────────────────┬──────────┘  │
//! │          ▼                          ▼                    ▼             │
//! │  ┌───────────────┐        ┌───────────────────┐  ┌───────────────┐    │
//! │  │   Envelope    │        │      Crypto       │  │    Storage    │    │
//! │  │ ENC:v1:iv:ct  │        │ PBKDF2 · AES-GCM  │  │ MessageStore  │    │
//! │  └───────────────┘        └───────────────────┘  └───────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Key derivation and authenticated encryption
//! - [`envelope`] - The `ENC:v1` wire format
//! - [`messaging`] - Encryption of message content and media metadata
//! - [`storage`] - The message store interface and its adapters
//! - [`migration`] - Bulk encryption of legacy plaintext messages
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY PROPERTIES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Provided                                                              │
//! │  ─────────                                                              │
//! │  A stolen database does not reveal message text or selected media      │
//! │  metadata strings, and tampering with a stored value is detected.      │
//! │                                                                         │
//! │  Not provided                                                          │
//! │  ─────────────                                                          │
//! │  The key is derived from the two participant identifiers alone. Anyone │
//! │  who knows (or can guess) both identifiers can derive it, so these     │
//! │  identifiers must not be predictable. There is no forward secrecy,     │
//! │  no key rotation and no sender authentication.                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use dmseal_core::{MessageCipher, MigrationConfig, MigrationRunner};
//! use dmseal_core::storage::Database;
//!
//! let cipher = MessageCipher::default();
//! let sealed = cipher.encrypt("Hello Bob!", &["alice", "bob"])?;
//! assert_eq!(cipher.decrypt(&sealed, &["bob", "alice"]), "Hello Bob!");
//!
//! let db = Database::open(Some("messages.db")).await?;
//! let runner = MigrationRunner::new(db, cipher, MigrationConfig::default())?;
//! let report = runner.migrate_all().await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod messaging;
pub mod migration;
pub mod storage;
/// Time utilities.
pub mod time;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{CipherProvider, ConversationKey, RustCryptoProvider};
pub use envelope::{is_encrypted, Envelope};
pub use error::{Error, Result};
pub use messaging::{
    MessageCipher, MessageRecord, MessageUpdate, Metadata, DECRYPTION_FAILED_SENTINEL,
};
pub use migration::{MigrationConfig, MigrationReport, MigrationRunner, MigrationStatus};
pub use storage::{ConversationRecord, MessageStore};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of dmseal Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
