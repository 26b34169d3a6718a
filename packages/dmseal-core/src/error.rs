//! # Error Handling
//!
//! Error types for dmseal.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Crypto Errors (caller misuse is returned, never swallowed)        │
//! │  │   ├── InvalidPlaintext      - Empty plaintext passed to encrypt     │
//! │  │   ├── InvalidParticipants   - Not exactly two distinct identifiers  │
//! │  │   ├── MalformedEnvelope     - Envelope string could not be parsed   │
//! │  │   ├── KeyDerivationFailed   - PBKDF2 failed                         │
//! │  │   ├── EncryptionFailed      - AEAD encryption failed                │
//! │  │   └── DecryptionFailed      - Wrong key / tampered ciphertext       │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageReadError      - Failed to read from the store         │
//! │  │   ├── StorageWriteError     - Failed to write to the store          │
//! │  │   └── DatabaseError         - SQLite error                          │
//! │  │                                                                      │
//! │  ├── Message Errors                                                    │
//! │  │   ├── ConversationNotFound  - Conversation doesn't exist            │
//! │  │   └── MessageNotFound       - Message doesn't exist                 │
//! │  │                                                                      │
//! │  └── Migration Errors                                                  │
//! │      ├── InvalidConfig         - Bad migration configuration           │
//! │      └── MigrationFailed       - Conversation could not be migrated    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decryption errors never reach message-reading callers: the message cipher
//! converts them into a fixed sentinel string. They only surface through the
//! strict `try_decrypt` path used by tooling.

use thiserror::Error;

/// Result type alias for dmseal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dmseal
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Plaintext was empty
    #[error("Invalid plaintext: {0}")]
    InvalidPlaintext(String),

    /// Participant set is not exactly two distinct, non-empty identifiers
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    /// Envelope string could not be parsed
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Key derivation failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Random number generation failed
    #[error("Random number generation failed")]
    RngFailed,

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Failed to read from storage
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to storage
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Operation timed out in the storage backend
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ========================================================================
    // Message Errors (700-799)
    // ========================================================================

    /// Conversation not found
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Message not found
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    // ========================================================================
    // Migration Errors (800-899)
    // ========================================================================

    /// Migration configuration rejected
    #[error("Invalid migration config: {0}")]
    InvalidConfig(String),

    /// A conversation could not be migrated
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 300-399: Crypto
    /// - 400-499: Storage
    /// - 700-799: Messages
    /// - 800-899: Migration
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Crypto (300-399)
            Error::InvalidPlaintext(_) => 300,
            Error::InvalidParticipants(_) => 301,
            Error::MalformedEnvelope(_) => 302,
            Error::KeyDerivationFailed(_) => 303,
            Error::EncryptionFailed(_) => 304,
            Error::DecryptionFailed(_) => 305,
            Error::RngFailed => 306,

            // Storage (400-499)
            Error::StorageReadError(_) => 400,
            Error::StorageWriteError(_) => 401,
            Error::DatabaseError(_) => 402,
            Error::Timeout(_) => 403,

            // Messages (700-799)
            Error::ConversationNotFound(_) => 700,
            Error::MessageNotFound(_) => 701,

            // Migration (800-899)
            Error::InvalidConfig(_) => 800,
            Error::MigrationFailed(_) => 801,

            // Internal (900-999)
            Error::SerializationError(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors may succeed when the operation is retried,
    /// e.g. by re-running the migration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::StorageReadError(_) | Error::StorageWriteError(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
