//! Providers and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::crypto::{CipherProvider, RustCryptoProvider, KEY_SIZE, NONCE_SIZE};
use crate::error::Result;
use crate::messaging::MessageCipher;
use zeroize::Zeroizing;

/// Real AES-GCM, single-iteration PBKDF2, counter nonces.
///
/// Keeps key derivation cheap in debug builds and makes nonces predictable.
#[derive(Debug, Default)]
pub(crate) struct DeterministicProvider {
    counter: AtomicU64,
}

impl CipherProvider for DeterministicProvider {
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut bytes = vec![0u8; len];
        for (dst, src) in bytes.iter_mut().rev().zip(n.to_le_bytes()) {
            *dst = src;
        }
        Ok(bytes)
    }

    fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        _iterations: u32,
    ) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
        RustCryptoProvider.pbkdf2_derive(password, salt, 1)
    }

    fn aead_encrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        RustCryptoProvider.aead_encrypt(key, nonce, plaintext)
    }

    fn aead_decrypt(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        RustCryptoProvider.aead_decrypt(key, nonce, ciphertext)
    }
}

/// A message cipher over [`DeterministicProvider`]
pub(crate) fn fast_cipher() -> MessageCipher {
    MessageCipher::new(Arc::new(DeterministicProvider::default()))
}
