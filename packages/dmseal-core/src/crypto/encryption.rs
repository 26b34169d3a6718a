//! # Encryption Module
//!
//! AES-256-GCM sealing of message values under a conversation key.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      VALUE ENCRYPTION FLOW                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Derive Conversation Key (see kdf.rs)                          │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  PBKDF2-SHA256(sorted participant ids) → 32-byte key        │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Fresh Nonce                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  12 random bytes from the provider, never reused            │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Seal                                                          │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES-256-GCM(key, nonce, plaintext)                          │       │
//! │  │           ↓                                                  │       │
//! │  │  ciphertext || 16-byte tag                                   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Only holders of the participant pair can read the value |
//! | Integrity | Any modification is detected by the GCM tag |
//! | Forward Secrecy | Not provided |

use std::fmt;

use zeroize::ZeroizeOnDrop;

use super::{CipherProvider, KEY_SIZE, NONCE_SIZE};
use crate::error::{Error, Result};

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Every conversation key is shared by all messages of that conversation, so
/// a fresh random nonce is drawn for every value. Random 96-bit nonces are
/// safe for up to 2^32 values per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Draw a fresh nonce from the provider's secure random source
    pub fn random(provider: &dyn CipherProvider) -> Result<Self> {
        let bytes = provider.random_bytes(NONCE_SIZE)?;
        let bytes: [u8; NONCE_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::RngFailed)?;
        Ok(Self(bytes))
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM key for one conversation
///
/// Derived on demand from the participant pair, never persisted, and
/// zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct ConversationKey([u8; KEY_SIZE]);

impl ConversationKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConversationKey([REDACTED])")
    }
}

/// Encrypt a value with AES-256-GCM under a fresh nonce
///
/// ## Returns
///
/// Tuple of (nonce, ciphertext_with_tag)
pub fn seal(
    provider: &dyn CipherProvider,
    key: &ConversationKey,
    plaintext: &[u8],
) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random(provider)?;
    let ciphertext = provider.aead_encrypt(key.as_bytes(), nonce.as_bytes(), plaintext)?;
    Ok((nonce, ciphertext))
}

/// Decrypt a value sealed with [`seal`]
///
/// ## Errors
///
/// Returns `DecryptionFailed` if:
/// - The ciphertext was tampered with or truncated
/// - The key is wrong
/// - The nonce is wrong
pub fn open(
    provider: &dyn CipherProvider,
    key: &ConversationKey,
    nonce: &Nonce,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    provider.aead_decrypt(key.as_bytes(), nonce.as_bytes(), ciphertext)
}

// ============================================================================
// TESTS
// ============================================================================
