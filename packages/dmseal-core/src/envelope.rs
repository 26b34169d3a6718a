//! # Envelope Codec
//!
//! The wire format of an encrypted message value.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ENVELOPE FORMAT (v1)                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ENC:v1:<base64 nonce>:<base64 ciphertext>                             │
//! │  ───┬── ──────┬─────── ─────────┬────────                               │
//! │     │         │                 │                                       │
//! │     │         │                 └── AES-GCM output incl. 16-byte tag    │
//! │     │         └── exactly 12 bytes                                     │
//! │     └── versioned prefix                                               │
//! │                                                                         │
//! │  Base64: standard alphabet, padded.                                    │
//! │  Anything without the exact prefix is legacy plaintext.                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::crypto::{Nonce, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

/// Current envelope version
pub const ENVELOPE_VERSION: u8 = 1;

/// Prefix every v1 envelope starts with
pub const ENVELOPE_PREFIX: &str = "ENC:v1:";

/// Check whether a value is an envelope rather than legacy plaintext
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

/// A parsed encrypted value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope version
    pub version: u8,
    /// Nonce used for this value
    pub nonce: Nonce,
    /// Ciphertext with the authentication tag appended
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Build a v1 envelope from sealed output
    pub fn new(nonce: Nonce, ciphertext: Vec<u8>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            nonce,
            ciphertext,
        }
    }

    /// Parse an envelope string
    ///
    /// ## Errors
    ///
    /// `MalformedEnvelope` if the prefix is missing, the remainder does not
    /// split into exactly two non-empty base64 parts, the nonce is not 12
    /// bytes, or the ciphertext is shorter than a GCM tag.
    pub fn parse(value: &str) -> Result<Self> {
        let body = value
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| Error::MalformedEnvelope("missing envelope prefix".into()))?;

        let parts: Vec<&str> = body.split(':').collect();
        let (nonce_b64, ciphertext_b64) = match parts.as_slice() {
            [nonce, ciphertext] if !nonce.is_empty() && !ciphertext.is_empty() => {
                (*nonce, *ciphertext)
            }
            _ => {
                return Err(Error::MalformedEnvelope(format!(
                    "expected 2 non-empty components, got {}",
                    parts.len()
                )))
            }
        };

        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|e| Error::MalformedEnvelope(format!("invalid nonce encoding: {}", e)))?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes.try_into().map_err(|bytes: Vec<u8>| {
            Error::MalformedEnvelope(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                bytes.len()
            ))
        })?;

        let ciphertext = BASE64.decode(ciphertext_b64).map_err(|e| {
            Error::MalformedEnvelope(format!("invalid ciphertext encoding: {}", e))
        })?;
        if ciphertext.len() < TAG_SIZE {
            return Err(Error::MalformedEnvelope(format!(
                "ciphertext shorter than the {}-byte tag",
                TAG_SIZE
            )));
        }

        Ok(Self::new(Nonce::from_bytes(nonce), ciphertext))
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ENC:v{}:{}:{}",
            self.version,
            BASE64.encode(self.nonce.as_bytes()),
            BASE64.encode(&self.ciphertext)
        )
    }
}

impl FromStr for Envelope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(Nonce::from_bytes([1u8; NONCE_SIZE]), vec![2u8; 20])
    }

    #[test]
    fn test_is_encrypted_prefix() {
        assert!(is_encrypted("ENC:v1:abc:def"));
        assert!(!is_encrypted("plain text"));
        assert!(!is_encrypted("ENC:v2:abc:def"));
        assert!(!is_encrypted("enc:v1:abc:def"));
        assert!(!is_encrypted(" ENC:v1:abc:def"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn test_display_layout() {
        let rendered = sample().to_string();
        let parts: Vec<&str> = rendered.split(':').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "ENC");
        assert_eq!(parts[1], "v1");
        assert_eq!(BASE64.decode(parts[2]).unwrap(), vec![1u8; NONCE_SIZE]);
        assert_eq!(BASE64.decode(parts[3]).unwrap(), vec![2u8; 20]);
    }

    #[test]
    fn test_parse_display_output() {
        let envelope = sample();
        let parsed: Envelope = envelope.to_string().parse().unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_rejects_extra_components() {
        assert!(matches!(
            Envelope::parse("ENC:v1:invalid:format:extra"),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_rejects_missing_or_empty_components() {
        assert!(Envelope::parse("ENC:v1:").is_err());
        assert!(Envelope::parse("ENC:v1:onlyone").is_err());
        assert!(Envelope::parse("ENC:v1::AAAA").is_err());
        assert!(Envelope::parse("ENC:v1:AAAA:").is_err());
    }

    #[test]
    fn test_rejects_bad_base64_and_sizes() {
        let ct = BASE64.encode([0u8; 32]);
        assert!(Envelope::parse(&format!("ENC:v1:!!!:{}", ct)).is_err());

        let short_nonce = BASE64.encode([0u8; 8]);
        assert!(Envelope::parse(&format!("ENC:v1:{}:{}", short_nonce, ct)).is_err());

        let nonce = BASE64.encode([0u8; NONCE_SIZE]);
        let short_ct = BASE64.encode([0u8; 4]);
        assert!(Envelope::parse(&format!("ENC:v1:{}:{}", nonce, short_ct)).is_err());
    }

    #[test]
    fn test_rejects_plaintext() {
        assert!(Envelope::parse("hello world").is_err());
    }
}
