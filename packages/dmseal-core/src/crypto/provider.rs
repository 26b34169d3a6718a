//! # Cipher Provider
//!
//! The cryptographic capability the rest of the crate is written against.
//!
//! Business logic never calls a crypto library directly; it goes through a
//! [`CipherProvider`]. The default [`RustCryptoProvider`] is backed by the
//! pure-Rust `aes-gcm` and `pbkdf2` crates, and tests can swap in a
//! deterministic provider to pin down nonces.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CIPHER PROVIDER                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  random_bytes(n)                 → OsRng                               │
//! │  pbkdf2_derive(pw, salt, iters)  → PBKDF2-HMAC-SHA256, 32-byte output  │
//! │  aead_encrypt(key, nonce, pt)    → AES-256-GCM, ciphertext || tag      │
//! │  aead_decrypt(key, nonce, ct)    → AES-256-GCM, tag verified           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_SIZE, NONCE_SIZE};
use crate::error::{Error, Result};

/// Cryptographic primitives used by key derivation and the message cipher.
///
/// Implementations must be thread-safe: the migration runner shares one
/// provider across concurrently running message tasks.
pub trait CipherProvider: Send + Sync {
    /// Fill a new buffer of `len` bytes from a cryptographically secure source
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>>;

    /// Derive a 256-bit key with PBKDF2-HMAC-SHA256
    ///
    /// The output buffer is wiped when dropped.
    fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<Zeroizing<[u8; KEY_SIZE]>>;

    /// Encrypt with AES-256-GCM. The returned ciphertext carries the 16-byte tag.
    fn aead_encrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>>;

    /// Decrypt with AES-256-GCM, verifying the authentication tag
    fn aead_decrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Default provider built on the RustCrypto crates and the OS RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    /// Create a new provider
    pub fn new() -> Self {
        Self
    }
}

impl CipherProvider for RustCryptoProvider {
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| Error::RngFailed)?;
        Ok(bytes)
    }

    fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
        if iterations == 0 {
            return Err(Error::KeyDerivationFailed(
                "PBKDF2 iteration count must be non-zero".into(),
            ));
        }

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        pbkdf2_hmac::<Sha256>(password, salt, iterations, key.as_mut_slice());
        Ok(key)
    }

    fn aead_encrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

        cipher
            .encrypt(AesNonce::from_slice(nonce), plaintext)
            .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))
    }

    fn aead_decrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {}", e)))?;

        cipher
            .decrypt(AesNonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                Error::DecryptionFailed("Decryption failed: authentication tag mismatch".into())
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
