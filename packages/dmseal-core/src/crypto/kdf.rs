//! # Key Derivation
//!
//! Derives the AES-256-GCM key for a direct-message conversation from its two
//! participant identifiers.
//!
//! ## Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 PARTICIPANT PAIR → CONVERSATION KEY                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ["user-b", "user-a"]                                                  │
//! │         │                                                               │
//! │         ▼  sort (byte order)                                            │
//! │  low = "user-a", high = "user-b"                                       │
//! │         │                                                               │
//! │         ├──► salt     = "dmseal-conversation-user-a-user-b"            │
//! │         └──► password = "user-a:user-b"                                │
//! │                                                                         │
//! │  PBKDF2-HMAC-SHA256(password, salt, 100_000 iterations)                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  32-byte AES-256-GCM key                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice |
//! |--------|---------------|
//! | Ordering | Sorted pair, so both sides derive the same key |
//! | Persistence | None: keys are recomputed per call and zeroized on drop |
//! | Secret material | The identifiers themselves |
//!
//! The participant identifiers are the only input. If identifiers are
//! predictable or enumerable, anyone who knows the derivation can rebuild the
//! key; there is no independent server-side secret. Only two participants are
//! supported; group conversations need a different scheme.

use zeroize::Zeroizing;

use super::{CipherProvider, ConversationKey, KDF_ITERATIONS, KDF_SALT_NAMESPACE};
use crate::error::{Error, Result};

/// The two participants of a direct-message conversation, in sorted order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: String,
    high: String,
}

impl ParticipantPair {
    /// Build a pair from two identifiers in any order
    ///
    /// Both identifiers must be non-empty and distinct.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Result<Self> {
        let (a, b) = (a.into(), b.into());

        if a.is_empty() || b.is_empty() {
            return Err(Error::InvalidParticipants(
                "participant identifiers must be non-empty".into(),
            ));
        }
        if a == b {
            return Err(Error::InvalidParticipants(
                "participant identifiers must be distinct".into(),
            ));
        }

        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    /// Build a pair from a participant list, which must hold exactly two ids
    pub fn from_slice<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        match ids {
            [a, b] => Self::new(a.as_ref(), b.as_ref()),
            _ => Err(Error::InvalidParticipants(format!(
                "expected exactly 2 participants, got {}",
                ids.len()
            ))),
        }
    }

    /// The lexicographically smaller identifier
    pub fn low(&self) -> &str {
        &self.low
    }

    /// The lexicographically larger identifier
    pub fn high(&self) -> &str {
        &self.high
    }

    fn salt(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{}-{}-{}", KDF_SALT_NAMESPACE, self.low, self.high))
    }

    fn password(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{}:{}", self.low, self.high))
    }
}

/// Derive the conversation key for a participant pair
pub fn derive_pair_key(
    provider: &dyn CipherProvider,
    pair: &ParticipantPair,
) -> Result<ConversationKey> {
    let key = provider.pbkdf2_derive(
        pair.password().as_bytes(),
        pair.salt().as_bytes(),
        KDF_ITERATIONS,
    )?;
    Ok(ConversationKey::from_bytes(*key))
}

/// Derive the conversation key from a list of participant identifiers
///
/// Fails with `InvalidParticipants` unless `participant_ids` holds exactly
/// two distinct, non-empty identifiers. The result does not depend on the
/// order of the identifiers.
pub fn derive_conversation_key<S: AsRef<str>>(
    provider: &dyn CipherProvider,
    participant_ids: &[S],
) -> Result<ConversationKey> {
    let pair = ParticipantPair::from_slice(participant_ids)?;
    derive_pair_key(provider, &pair)
}

// ============================================================================
// TESTS
// ============================================================================
