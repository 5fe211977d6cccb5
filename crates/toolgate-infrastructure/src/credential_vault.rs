//! Moka-backed implementation of the [`CredentialVault`] port (C12).
//!
//! Grounded on the teacher's `mcb-providers::cache::MokaCacheProvider`
//! (`moka::future::Cache` wrapping an opaque byte payload), extended with a
//! per-entry TTL via [`moka::Expiry`] since each stash call carries its own
//! `ttl_secs` rather than one cache-wide duration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::CredentialRef;
use toolgate_domain::ports::infrastructure::CredentialVault;
use toolgate_domain::ports::providers::{CryptoProvider, EncryptedData};

struct StashedCredential {
    envelope: EncryptedData,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, Arc<StashedCredential>> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Arc<StashedCredential>, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// AES-GCM-encrypted, short-TTL credential stash keyed by an opaque reference.
pub struct MokaCredentialVault {
    cache: Cache<String, Arc<StashedCredential>>,
    crypto: Arc<dyn CryptoProvider>,
}

impl MokaCredentialVault {
    #[must_use]
    pub fn new(crypto: Arc<dyn CryptoProvider>, max_entries: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_entries).expire_after(PerEntryExpiry).build();
        Self { cache, crypto }
    }
}

#[async_trait]
impl CredentialVault for MokaCredentialVault {
    async fn stash(&self, api_key: &str, ttl_secs: u64) -> Result<CredentialRef> {
        let envelope = self.crypto.encrypt(api_key.as_bytes())?;
        let reference = CredentialRef(uuid::Uuid::new_v4().to_string());
        self.cache
            .insert(reference.0.clone(), Arc::new(StashedCredential { envelope, ttl: Duration::from_secs(ttl_secs.max(1)) }))
            .await;
        Ok(reference)
    }

    async fn resolve_and_evict(&self, reference: &CredentialRef) -> Result<String> {
        let stashed = self.cache.get(&reference.0).await.ok_or_else(|| Error::not_found(format!("credential reference {} expired or unknown", reference.0)))?;
        self.cache.invalidate(&reference.0).await;
        let plaintext = self.crypto.decrypt(&stashed.envelope)?;
        String::from_utf8(plaintext).map_err(|e| Error::internal_with_source("stashed credential was not valid utf-8", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_providers::crypto::AesGcmCryptoProvider;

    #[tokio::test]
    async fn stash_then_resolve_round_trips_and_evicts() {
        let vault = MokaCredentialVault::new(Arc::new(AesGcmCryptoProvider::new()), 100);
        let reference = vault.stash("sk-caller-key", 60).await.unwrap();
        let resolved = vault.resolve_and_evict(&reference).await.unwrap();
        assert_eq!(resolved, "sk-caller-key");
        assert!(vault.resolve_and_evict(&reference).await.is_err());
    }
}
