//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use coffeeshop_auth::Algorithm;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL; `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    /// Drop and reseed the drink table on startup.
    pub reset: bool,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `shop.us.auth0.com`.
    pub domain: String,
    pub audience: String,
    pub algorithm: Algorithm,
    /// Shared HMAC secret used instead of the provider's JWKS.
    pub secret: Option<String>,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("domain", &self.domain)
            .field("audience", &self.audience)
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `AUTH0_DOMAIN`: identity provider domain (issuer is `https://{domain}/`)
    /// - `API_AUDIENCE`: expected token audience
    ///
    /// Optional:
    /// - `BIND_ADDR` (default `0.0.0.0:8080`)
    /// - `DATABASE_URL` (unset: in-memory store)
    /// - `DATABASE_MAX_CONNECTIONS` (default `5`)
    /// - `RESET_DATABASE` (default `false`)
    /// - `JWT_ALGORITHM` (default `RS256`)
    /// - `JWT_SECRET` (HMAC secret; requires an `HS*` algorithm)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!(
            bind_addr = %config.bind_addr,
            database = if config.database.url.is_some() { "postgres" } else { "in-memory" },
            issuer = %config.auth.issuer(),
            audience = %config.auth.audience,
            algorithm = ?config.auth.algorithm,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        reason: format!("expected a positive integer, got '{raw}'"),
                    });
                }
            },
            None => 5,
        };

        let reset = match var("RESET_DATABASE") {
            Some(raw) => parse_bool("RESET_DATABASE", &raw)?,
            None => false,
        };

        let domain = var("AUTH0_DOMAIN").ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        let audience = var("API_AUDIENCE").ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let algorithm = match var("JWT_ALGORITHM") {
            Some(raw) => raw.parse::<Algorithm>().map_err(|_| ConfigError::Invalid {
                var: "JWT_ALGORITHM",
                reason: format!("unknown algorithm '{raw}'"),
            })?,
            None => Algorithm::RS256,
        };

        let secret = var("JWT_SECRET");
        let hmac = matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512);
        if secret.is_some() != hmac {
            return Err(ConfigError::Invalid {
                var: "JWT_ALGORITHM",
                reason: format!(
                    "{algorithm:?} {} JWT_SECRET",
                    if hmac { "requires" } else { "cannot be used with" }
                ),
            });
        }

        Ok(Self {
            bind_addr,
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                max_connections,
                reset,
            },
            auth: AuthConfig {
                domain,
                audience,
                algorithm,
                secret,
            },
        })
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{raw}'"),
        }),
    }
}
