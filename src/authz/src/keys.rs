//! Signing key discovery
//!
//! Tokens name their signing key with a `kid` header. A [`KeyProvider`]
//! resolves a tenant + key id to the public key material. The HTTP provider
//! fetches the tenant's discovery document and caches the key set per tenant
//! with a TTL, in a `DashMap` so concurrent lookups never wait on each other.

use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DEFAULT_KEY_CACHE_TTL;
use crate::error::{AuthzError, Result, SignatureError};

/// Default discovery authority
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Minimum age of a cached key set before an unknown kid may refetch it
pub const DEFAULT_MIN_REFRESH: Duration = Duration::from_secs(300);

/// One key of a discovery document (JWK)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    pub kid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// Certificate chain, base64 DER, leaf first
    #[serde(default)]
    pub x5c: Vec<String>,
}

impl SigningKey {
    /// RSA public key from modulus and exponent
    pub fn rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: Some("RSA".to_string()),
            key_use: Some("sig".to_string()),
            n: Some(n.into()),
            e: Some(e.into()),
            x5c: Vec::new(),
        }
    }

    /// Leaf certificate wrapped as PEM
    pub fn certificate_chain(&self) -> Option<String> {
        self.x5c.first().map(|cert| {
            format!(
                "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----",
                cert
            )
        })
    }

    /// Verification key for RS256
    pub fn decoding_key(&self) -> std::result::Result<DecodingKey, SignatureError> {
        let (Some(n), Some(e)) = (&self.n, &self.e) else {
            return Err(SignatureError::Malformed(format!(
                "key '{}' has no RSA components",
                self.kid
            )));
        };

        DecodingKey::from_rsa_components(n, e)
            .map_err(|err| SignatureError::Malformed(err.to_string()))
    }
}

/// Discovery document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<SigningKey>,
}

impl KeySet {
    fn into_map(self) -> HashMap<String, SigningKey> {
        self.keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect()
    }
}

/// Resolves signing keys by tenant and key id
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Key `key_id` of `tenant_id`, or [`AuthzError::KeyLookup`]
    async fn signing_key(&self, tenant_id: &str, key_id: &str) -> Result<SigningKey>;
}

/// Fixed in-memory key set, shared by every tenant
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    keys: HashMap<String, SigningKey>,
}

impl StaticKeyProvider {
    pub fn new(keys: impl IntoIterator<Item = SigningKey>) -> Self {
        Self {
            keys: KeySet {
                keys: keys.into_iter().collect(),
            }
            .into_map(),
        }
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn signing_key(&self, tenant_id: &str, key_id: &str) -> Result<SigningKey> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| key_lookup_error(tenant_id, key_id))
    }
}

/// Key set cached with its fetch time
#[derive(Debug, Clone)]
struct CachedKeySet {
    keys: Arc<HashMap<String, SigningKey>>,
    fetched_at: Instant,
}

impl CachedKeySet {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }

    fn may_refresh(&self, min_refresh: Duration) -> bool {
        self.fetched_at.elapsed() >= min_refresh
    }
}

fn key_lookup_error(tenant_id: &str, key_id: &str) -> AuthzError {
    AuthzError::KeyLookup {
        tenant: tenant_id.to_string(),
        kid: key_id.to_string(),
    }
}

/// Fetches `{authority}/{tenant}/discovery/keys` over HTTPS
///
/// A cached key set is refetched when it outlives the TTL, or when a token
/// names an unknown kid and the set is at least `min_refresh` old. Fetches
/// are serialized so a cold cache is filled once.
pub struct DiscoveryKeyProvider {
    client: reqwest::Client,
    authority: String,
    ttl: Duration,
    min_refresh: Duration,
    cache: DashMap<String, CachedKeySet>,
    refresh: Mutex<()>,
}

impl Default for DiscoveryKeyProvider {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY, DEFAULT_KEY_CACHE_TTL)
    }
}

impl DiscoveryKeyProvider {
    pub fn new(authority: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority: authority.into().trim_end_matches('/').to_string(),
            ttl,
            min_refresh: DEFAULT_MIN_REFRESH,
            cache: DashMap::new(),
            refresh: Mutex::new(()),
        }
    }

    /// Set how old a key set must be before an unknown kid refetches it
    pub fn with_min_refresh(mut self, min_refresh: Duration) -> Self {
        self.min_refresh = min_refresh;
        self
    }

    /// Discovery URL for a tenant
    pub fn keys_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/discovery/keys", self.authority, tenant_id)
    }

    /// Number of tenants with a cached key set
    pub fn cached_tenants(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, tenant_id: &str) -> Option<CachedKeySet> {
        let entry = self.cache.get(tenant_id)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        Some(entry.clone())
    }

    /// Answer from the cache, `None` when a fetch is needed
    fn lookup_cached(&self, tenant_id: &str, key_id: &str) -> Option<Result<SigningKey>> {
        let cached = self.cached(tenant_id)?;
        match cached.keys.get(key_id) {
            Some(key) => Some(Ok(key.clone())),
            None if cached.may_refresh(self.min_refresh) => None,
            None => {
                debug!(tenant = tenant_id, kid = key_id, "unknown kid, key set refreshed recently");
                Some(Err(key_lookup_error(tenant_id, key_id)))
            }
        }
    }

    async fn fetch(&self, tenant_id: &str) -> Result<Arc<HashMap<String, SigningKey>>> {
        let url = self.keys_url(tenant_id);
        debug!(%url, "fetching signing keys");

        let key_set: KeySet = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthzError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthzError::KeyFetch(e.to_string()))?;

        let keys = Arc::new(key_set.into_map());
        info!(tenant = tenant_id, keys = keys.len(), "signing keys refreshed");

        self.cache.insert(
            tenant_id.to_string(),
            CachedKeySet {
                keys: Arc::clone(&keys),
                fetched_at: Instant::now(),
            },
        );

        Ok(keys)
    }
}

#[async_trait]
impl KeyProvider for DiscoveryKeyProvider {
    async fn signing_key(&self, tenant_id: &str, key_id: &str) -> Result<SigningKey> {
        if let Some(found) = self.lookup_cached(tenant_id, key_id) {
            return found;
        }

        let _guard = self.refresh.lock().await;

        // Another request may have refreshed while this one waited
        if let Some(found) = self.lookup_cached(tenant_id, key_id) {
            return found;
        }

        let keys = self.fetch(tenant_id).await?;

        keys.get(key_id)
            .cloned()
            .ok_or_else(|| key_lookup_error(tenant_id, key_id))
    }
}
