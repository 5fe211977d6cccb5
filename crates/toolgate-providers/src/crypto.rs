//! AES-256-GCM implementation of the [`CryptoProvider`] port (C12).

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::providers::{CryptoProvider, EncryptedData};

const NONCE_LEN: usize = 12;

/// Symmetric encryption backed by a single process-lifetime AES-256-GCM key.
///
/// The key is generated once at construction and never persisted: an
/// envelope encrypted by one process cannot be decrypted by another, which
/// is exactly the credential vault's requirement (§4.4.1) — stashed
/// credentials only ever need to survive within one worker pool's lifetime.
pub struct AesGcmCryptoProvider {
    cipher: Aes256Gcm,
}

impl AesGcmCryptoProvider {
    #[must_use]
    pub fn new() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        Self { cipher: Aes256Gcm::new(&key) }
    }
}

impl Default for AesGcmCryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for AesGcmCryptoProvider {
    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData> {
        let nonce = Aes256Gcm::generate_nonce(OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| Error::internal(format!("aes-gcm encryption failed: {e}")))?;
        Ok(EncryptedData::new(ciphertext, nonce.to_vec()))
    }

    fn decrypt(&self, encrypted_data: &EncryptedData) -> Result<Vec<u8>> {
        if encrypted_data.nonce.len() != NONCE_LEN {
            return Err(Error::internal("malformed nonce length"));
        }
        let nonce = Nonce::from_slice(&encrypted_data.nonce);
        self.cipher
            .decrypt(nonce, encrypted_data.ciphertext.as_slice())
            .map_err(|e| Error::internal(format!("aes-gcm decryption failed: {e}")))
    }

    fn provider_name(&self) -> &str {
        "aes-gcm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plaintext() {
        let provider = AesGcmCryptoProvider::new();
        let encrypted = provider.encrypt(b"sk-super-secret-key").unwrap();
        let decrypted = provider.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, b"sk-super-secret-key");
    }

    #[test]
    fn distinct_calls_use_distinct_nonces() {
        let provider = AesGcmCryptoProvider::new();
        let a = provider.encrypt(b"same-plaintext").unwrap();
        let b = provider.encrypt(b"same-plaintext").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let provider = AesGcmCryptoProvider::new();
        let mut encrypted = provider.encrypt(b"payload").unwrap();
        encrypted.ciphertext[0] ^= 0xFF;
        assert!(provider.decrypt(&encrypted).is_err());
    }
}
