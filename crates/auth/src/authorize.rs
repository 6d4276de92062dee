use crate::{AuthError, Claims, Permission};

/// Check that verified claims grant `required`.
///
/// - No IO
/// - No panics
/// - Pure policy check
pub fn authorize(claims: &Claims, required: &Permission) -> Result<(), AuthError> {
    let granted = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if granted.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(required.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Audience;

    fn claims(permissions: Option<Vec<&'static str>>) -> Claims {
        Claims {
            sub: "auth0|manager".to_string(),
            iss: "https://coffee.example/".to_string(),
            aud: Some(Audience::One("drinks".to_string())),
            exp: 0,
            iat: None,
            permissions: permissions.map(|p| p.into_iter().map(Permission::new).collect()),
            scope: None,
        }
    }

    #[test]
    fn granted_permission_passes() {
        let c = claims(Some(vec!["get:drinks-detail", "post:drinks"]));
        assert!(authorize(&c, &Permission::new("post:drinks")).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let c = claims(Some(vec!["get:drinks-detail"]));
        let err = authorize(&c, &Permission::new("delete:drinks")).unwrap_err();
        assert_eq!(err, AuthError::Forbidden("delete:drinks".to_string()));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn absent_permissions_claim() {
        let err = authorize(&claims(None), &Permission::new("post:drinks")).unwrap_err();
        assert_eq!(err, AuthError::PermissionsMissing);
    }
}
