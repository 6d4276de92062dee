//! Token verification: signature, algorithm, expiry, issuer, audience.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};

use crate::{AuthError, Claims, KeyProvider};

/// Verifies bearer tokens against an injected key source.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeyProvider>,
    issuer: String,
    audience: String,
    algorithm: Algorithm,
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<dyn KeyProvider>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm,
        }
    }

    /// Decode and verify `token`, returning its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "unparsable token header");
            AuthError::Malformed
        })?;

        if header.alg != self.algorithm {
            tracing::debug!(alg = ?header.alg, expected = ?self.algorithm, "token algorithm mismatch");
            return Err(AuthError::AlgorithmMismatch);
        }

        let key = self.keys.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = jsonwebtoken::decode::<Claims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            map_jwt_error(e.kind())
        })?;

        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn map_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::AlgorithmMismatch,
        _ => AuthError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticKeyProvider;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret";
    const ISSUER: &str = "https://coffee.example/";
    const AUDIENCE: &str = "drinks";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(
            Arc::new(StaticKeyProvider::from_secret(SECRET)),
            ISSUER,
            AUDIENCE,
            Algorithm::HS256,
        )
    }

    fn mint(alg: Algorithm, secret: &[u8], claims: serde_json::Value) -> String {
        jsonwebtoken::encode(&Header::new(alg), &claims, &EncodingKey::from_secret(secret))
            .expect("failed to encode jwt")
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn valid_claims() -> serde_json::Value {
        json!({
            "sub": "auth0|barista",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": now() + 600,
            "permissions": ["get:drinks-detail"],
        })
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let token = mint(Algorithm::HS256, SECRET, valid_claims());
        let claims = verifier().verify(&token).await.unwrap();
        assert_eq!(claims.sub, "auth0|barista");
        assert_eq!(claims.permissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let err = verifier().verify("not-a-jwt").await.unwrap_err();
        assert_eq!(err, AuthError::Malformed);
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let token = mint(Algorithm::HS256, b"other-secret", valid_claims());
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[tokio::test]
    async fn rejects_unexpected_algorithm() {
        let token = mint(Algorithm::HS384, SECRET, valid_claims());
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::AlgorithmMismatch);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let mut claims = valid_claims();
        claims["exp"] = json!(now() - 3600);
        let token = mint(Algorithm::HS256, SECRET, claims);
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::Expired);
        assert_eq!(err.code(), "token_expired");
    }

    #[tokio::test]
    async fn rejects_wrong_issuer_or_audience() {
        let mut claims = valid_claims();
        claims["iss"] = json!("https://evil.example/");
        let token = mint(Algorithm::HS256, SECRET, claims);
        assert_eq!(verifier().verify(&token).await.unwrap_err(), AuthError::InvalidClaims);

        let mut claims = valid_claims();
        claims["aud"] = json!("someone-else");
        let token = mint(Algorithm::HS256, SECRET, claims);
        assert_eq!(verifier().verify(&token).await.unwrap_err(), AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn rejects_missing_audience() {
        let mut claims = valid_claims();
        if let Some(obj) = claims.as_object_mut() {
            obj.remove("aud");
        }
        let token = mint(Algorithm::HS256, SECRET, claims);
        assert_eq!(verifier().verify(&token).await.unwrap_err(), AuthError::InvalidClaims);
    }
}
