//! Per-route authorization middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use coffeeshop_auth::{AuthError, Permission, TokenVerifier, authorize, extract_bearer};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
}

/// Middleware state: the verifier plus the permission one route demands.
#[derive(Clone)]
pub struct ScopeGuard {
    pub auth: AuthState,
    pub permission: Permission,
}

pub async fn require_permission(
    State(guard): State<ScopeGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = extract_token(req.headers())?;
        guard.auth.verifier.verify(token).await?
    };

    authorize(&claims, &guard.permission).inspect_err(|_| {
        tracing::debug!(
            sub = %claims.sub,
            required = %guard.permission,
            "permission missing from token"
        );
    })?;

    let principal = PrincipalContext::from_claims(&claims);
    tracing::debug!(
        sub = %principal.subject(),
        permission = %guard.permission,
        expires_at = ?principal.expires_at(),
        "request authorized"
    );
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;

    extract_bearer(header)
}
