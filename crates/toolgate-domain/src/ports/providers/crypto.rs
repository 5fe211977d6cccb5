//! Cryptographic provider port.
//!
//! Backs the C12 credential envelope vault: implementations provide the
//! actual AES-GCM primitive, the domain only depends on the abstraction.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Cryptographic provider port for symmetric encryption of short-lived secrets.
pub trait CryptoProvider: Send + Sync {
    /// Encrypt plaintext data.
    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData>;

    /// Decrypt a previously produced [`EncryptedData`].
    fn decrypt(&self, encrypted_data: &EncryptedData) -> Result<Vec<u8>>;

    /// Name/identifier of this implementation (e.g. `aes-gcm`).
    fn provider_name(&self) -> &str;
}

/// Encrypted payload: ciphertext plus the nonce used to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display(
    "EncryptedData {{ ciphertext: {} bytes, nonce: {} bytes }}",
    ciphertext.len(),
    nonce.len()
)]
pub struct EncryptedData {
    /// The encrypted ciphertext.
    pub ciphertext: Vec<u8>,
    /// The nonce used during encryption.
    pub nonce: Vec<u8>,
}

impl EncryptedData {
    /// Construct from raw parts.
    #[must_use]
    pub fn new(ciphertext: Vec<u8>, nonce: Vec<u8>) -> Self {
        Self { ciphertext, nonce }
    }
}
