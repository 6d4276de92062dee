//! Explicit startup and teardown of everything handlers share.

use std::sync::Arc;

use coffeeshop_auth::{KeyProvider, StaticKeyProvider, TokenVerifier};
use coffeeshop_infra::{DrinkStore, InMemoryDrinkStore, JwksKeyProvider, PostgresDrinkStore, StoreError};

use crate::config::{AuthConfig, Config};

/// Handle passed to every handler (via `Extension<Arc<AppServices>>`).
pub struct AppServices {
    drinks: Arc<dyn DrinkStore>,
    verifier: Arc<TokenVerifier>,
    postgres: Option<PostgresDrinkStore>,
}

impl AppServices {
    /// Assemble services from ready-made parts (tests, embedding).
    pub fn new(drinks: Arc<dyn DrinkStore>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            drinks,
            verifier,
            postgres: None,
        }
    }

    /// Connect the store and build the verifier described by `config`.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let verifier = Arc::new(build_verifier(&config.auth));
        let db = &config.database;

        match &db.url {
            Some(url) => {
                let store = PostgresDrinkStore::connect(url, db.max_connections).await?;
                store.setup().await?;
                if db.reset {
                    tracing::warn!("RESET_DATABASE set; dropping and reseeding drinks");
                    store.reset().await?;
                }
                tracing::info!("connected to postgres drink store");

                Ok(Self {
                    drinks: Arc::new(store.clone()),
                    verifier,
                    postgres: Some(store),
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory drink store");
                let store = InMemoryDrinkStore::new();
                if db.reset {
                    store.reset().await?;
                }
                Ok(Self::new(Arc::new(store), verifier))
            }
        }
    }

    pub fn drinks(&self) -> &dyn DrinkStore {
        self.drinks.as_ref()
    }

    pub fn verifier(&self) -> Arc<TokenVerifier> {
        self.verifier.clone()
    }

    /// Release the connection pool. Call after the server has stopped.
    pub async fn shutdown(&self) {
        if let Some(store) = &self.postgres {
            store.close().await;
        }
        tracing::info!("services shut down");
    }
}

fn build_verifier(auth: &AuthConfig) -> TokenVerifier {
    let keys: Arc<dyn KeyProvider> = match &auth.secret {
        Some(secret) => {
            tracing::warn!("JWT_SECRET set; verifying tokens with a shared secret instead of JWKS");
            Arc::new(StaticKeyProvider::from_secret(secret.as_bytes()))
        }
        None => Arc::new(JwksKeyProvider::for_domain(&auth.domain)),
    };

    TokenVerifier::new(keys, auth.issuer(), auth.audience.clone(), auth.algorithm)
}
