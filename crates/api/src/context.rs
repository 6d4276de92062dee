use chrono::{DateTime, Utc};

use coffeeshop_auth::Claims;

/// Principal context for a request (verified identity and token expiry).
///
/// Inserted into request extensions by the authorization middleware; only
/// present on protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    subject: String,
    expires_at: Option<DateTime<Utc>>,
}

impl PrincipalContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            subject: claims.sub.clone(),
            expires_at: claims.expires_at(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
