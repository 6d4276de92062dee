use crate::error::AuthError;

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything other than exactly
/// `Bearer <token>` is refused.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::HeaderMissing)?;

    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::NotBearer)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::NotBearer);
    }

    let token = parts.next().ok_or(AuthError::TokenMissing)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
