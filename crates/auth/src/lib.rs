//! `coffeeshop-auth`: bearer-token verification and scope checks.
//!
//! This crate is intentionally decoupled from HTTP frameworks and storage:
//! it takes raw header/token strings and reports failures as [`AuthError`],
//! which carries the status code the transport layer should answer with.

pub mod authorize;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod keys;
pub mod permissions;
pub mod verifier;

pub use authorize::authorize;
pub use bearer::extract_bearer;
pub use claims::{Audience, Claims};
pub use error::{AuthError, AuthErrorBody};
pub use keys::{KeyProvider, StaticKeyProvider};
pub use permissions::Permission;
pub use verifier::TokenVerifier;

pub use jsonwebtoken::{Algorithm, DecodingKey};
