//! # Cryptography Module
//!
//! Primitives used to seal direct-message values at rest.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Participant Pair ("alice", "bob")                                     │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Conversation Key (256 bits)                        │   │
//! │  │         PBKDF2-HMAC-SHA256, 100,000 iterations                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  AES-256-GCM                                                    │   │
//! │  │  • 96-bit nonce (random per value)                              │   │
//! │  │  • 128-bit authentication tag                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose |
//! |-----------|---------|
//! | PBKDF2-HMAC-SHA256 | Conversation key derivation |
//! | AES-256-GCM | Value encryption (AEAD) |
//!
//! All primitives are reached through the [`CipherProvider`] trait so the
//! backing implementation can be replaced.

mod encryption;
mod kdf;
mod provider;

pub use encryption::{open, seal, ConversationKey, Nonce};
pub use kdf::{derive_conversation_key, derive_pair_key, ParticipantPair};
pub use provider::{CipherProvider, RustCryptoProvider};

/// Size of encryption keys in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// PBKDF2 iteration count for conversation keys
pub const KDF_ITERATIONS: u32 = 100_000;

/// Namespace prefix of the PBKDF2 salt
pub const KDF_SALT_NAMESPACE: &str = "dmseal-conversation";
