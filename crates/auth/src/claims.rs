use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// `aud` may be a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Claims carried by a verified access token.
///
/// Signature, `exp`, `iss` and `aud` have already been checked by the time a
/// value of this type exists (see [`crate::TokenVerifier`]). The registered
/// claims default when absent so the verifier, not serde, reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier (e.g. `auth0|5f1c...`).
    #[serde(default)]
    pub sub: String,

    #[serde(default)]
    pub iss: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration, seconds since the epoch.
    #[serde(default)]
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// RBAC permissions granted to the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,

    /// Space-separated OAuth scopes, used when `permissions` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Claims {
    /// Granted permissions, or `None` when the token carries neither a
    /// `permissions` list nor a `scope` string.
    pub fn permissions(&self) -> Option<Vec<Permission>> {
        if let Some(perms) = &self.permissions {
            return Some(perms.clone());
        }

        self.scope.as_ref().map(|scope| {
            scope
                .split_whitespace()
                .map(|s| Permission::new(s.to_string()))
                .collect()
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(extra: serde_json::Value) -> Claims {
        let mut base = serde_json::json!({
            "sub": "auth0|barista",
            "iss": "https://coffee.example/",
            "aud": "drinks",
            "exp": 1_700_000_000,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn permissions_list_takes_precedence() {
        let c = claims(serde_json::json!({
            "permissions": ["get:drinks-detail"],
            "scope": "openid post:drinks",
        }));
        assert_eq!(c.permissions(), Some(vec![Permission::new("get:drinks-detail")]));
    }

    #[test]
    fn scope_string_is_split() {
        let c = claims(serde_json::json!({ "scope": "openid post:drinks" }));
        assert_eq!(
            c.permissions(),
            Some(vec![Permission::new("openid"), Permission::new("post:drinks")])
        );
    }

    #[test]
    fn no_permissions_at_all() {
        assert_eq!(claims(serde_json::json!({})).permissions(), None);
    }

    #[test]
    fn audience_accepts_list() {
        let c = claims(serde_json::json!({ "aud": ["drinks", "userinfo"] }));
        assert_eq!(c.aud, Some(Audience::Many(vec!["drinks".into(), "userinfo".into()])));
        assert_eq!(c.expires_at().unwrap().timestamp(), 1_700_000_000);
    }
}
