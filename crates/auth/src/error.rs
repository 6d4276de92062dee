//! Authorization failures.

use serde::Serialize;
use thiserror::Error;

/// Why a request was refused by the authorization checker.
///
/// The `Display` text doubles as the human-readable `description` returned
/// to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,

    #[error("Authorization header must start with \"Bearer\".")]
    NotBearer,

    #[error("Token not found.")]
    TokenMissing,

    #[error("Authorization header must be bearer token.")]
    MalformedHeader,

    #[error("Unable to parse authentication token.")]
    Malformed,

    #[error("Unexpected signing algorithm.")]
    AlgorithmMismatch,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Token signature is invalid.")]
    InvalidSignature,

    #[error("Token expired.")]
    Expired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    /// The token is valid but lacks the named permission.
    #[error("Permission not found.")]
    Forbidden(String),

    /// The signing-key source could not be reached or returned garbage.
    #[error("Unable to load signing keys.")]
    KeySource(String),
}

/// Wire shape of an authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthErrorBody {
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    /// HTTP status the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PermissionsMissing | Self::Forbidden(_) => 403,
            Self::KeySource(_) => 503,
            _ => 401,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::NotBearer
            | Self::TokenMissing
            | Self::MalformedHeader
            | Self::Malformed
            | Self::AlgorithmMismatch
            | Self::KeyNotFound
            | Self::InvalidSignature => "invalid_header",
            Self::Expired => "token_expired",
            Self::InvalidClaims | Self::PermissionsMissing => "invalid_claims",
            Self::Forbidden(_) => "unauthorized",
            Self::KeySource(_) => "key_source_unavailable",
        }
    }

    pub fn body(&self) -> AuthErrorBody {
        AuthErrorBody {
            code: self.code(),
            description: self.to_string(),
        }
    }
}
