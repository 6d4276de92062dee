//! JWKS-backed signing keys.
//!
//! Keys are fetched from the identity provider's
//! `/.well-known/jwks.json` on first use and cached. A token naming an
//! unknown `kid` triggers one refetch (key rotation) before it is refused,
//! at most once per refetch interval.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;

use coffeeshop_auth::{AuthError, KeyProvider};

/// Minimum time between two fetches of the key set.
const DEFAULT_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct KeyCache {
    keys: Option<JwkSet>,
    last_fetch: Option<Instant>,
}

impl KeyCache {
    fn key(&self, kid: &str) -> Option<Result<DecodingKey, AuthError>> {
        let jwk = self.keys.as_ref()?.find(kid)?;
        Some(DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeySource(e.to_string())))
    }

    fn fetched_within(&self, interval: Duration) -> bool {
        self.last_fetch.is_some_and(|at| at.elapsed() < interval)
    }
}

pub struct JwksKeyProvider {
    url: String,
    client: reqwest::Client,
    refetch_interval: Duration,
    cache: RwLock<KeyCache>,
}

impl JwksKeyProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            refetch_interval: DEFAULT_REFETCH_INTERVAL,
            cache: RwLock::new(KeyCache::default()),
        }
    }

    /// Provider for an Auth0-style tenant domain (e.g. `shop.us.auth0.com`).
    pub fn for_domain(domain: &str) -> Self {
        Self::new(format!("https://{domain}/.well-known/jwks.json"))
    }

    /// Start with a known key set; the URL is only used on a cache miss.
    pub fn with_keys(url: impl Into<String>, keys: JwkSet) -> Self {
        let provider = Self::new(url);
        Self {
            cache: RwLock::new(KeyCache {
                keys: Some(keys),
                last_fetch: None,
            }),
            ..provider
        }
    }

    /// Override how often an unknown `kid` may trigger a refetch.
    pub fn with_refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::info!(url = %self.url, "fetching signing keys");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySource(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySource(e.to_string()))
    }

    /// Refetch the key set unless one was attempted within the refetch
    /// interval. The write lock is held across the fetch so concurrent
    /// misses share one request.
    async fn refresh(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let mut cache = self.cache.write().await;

        if let Some(key) = cache.key(kid) {
            return key;
        }

        if cache.fetched_within(self.refetch_interval) {
            tracing::debug!(kid, "key set fetched recently; not refetching");
            return match cache.keys {
                Some(_) => Err(AuthError::KeyNotFound),
                None => Err(AuthError::KeySource("signing keys unavailable".to_string())),
            };
        }

        cache.last_fetch = Some(Instant::now());
        cache.keys = Some(self.fetch().await?);

        cache.key(kid).unwrap_or_else(|| {
            tracing::debug!(kid, "no signing key for kid");
            Err(AuthError::KeyNotFound)
        })
    }
}

impl core::fmt::Debug for JwksKeyProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwksKeyProvider")
            .field("url", &self.url)
            .field("refetch_interval", &self.refetch_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyProvider for JwksKeyProvider {
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        let kid = kid.ok_or(AuthError::Malformed)?;

        if let Some(key) = self.cache.read().await.key(kid) {
            return key;
        }

        self.refresh(kid).await
    }
}
