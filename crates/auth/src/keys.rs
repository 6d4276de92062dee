//! Signing-key sources.

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;

use crate::AuthError;

/// Source of verification keys for incoming tokens.
///
/// Implementations may be fixed (tests, shared-secret deployments) or backed
/// by the identity provider's JWKS endpoint.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Resolve the key for a token whose header names `kid` (if any).
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError>;
}

/// A single key configured out of band.
#[derive(Clone)]
pub struct StaticKeyProvider {
    key: DecodingKey,
    kid: Option<String>,
}

impl StaticKeyProvider {
    pub fn new(key: DecodingKey) -> Self {
        Self { key, kid: None }
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret))
    }

    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|e| AuthError::KeySource(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// Only serve the key to tokens whose header names this `kid`
    /// (tokens without a `kid` are still accepted).
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }
}

impl core::fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticKeyProvider")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        match (self.kid.as_deref(), kid) {
            (Some(expected), Some(requested)) if expected != requested => Err(AuthError::KeyNotFound),
            _ => Ok(self.key.clone()),
        }
    }
}
