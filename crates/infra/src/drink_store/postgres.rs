//! Postgres-backed drink store.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE drink (
//!     id     BIGSERIAL PRIMARY KEY,
//!     title  VARCHAR(80) NOT NULL UNIQUE,
//!     recipe TEXT NOT NULL
//! );
//! ```
//!
//! `recipe` holds the JSON text of the ingredient list.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! ## Transactions
//!
//! `update` and `delete` lock the row (`SELECT ... FOR UPDATE`) inside a
//! transaction and roll it back on any failure, including "not found".

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use coffeeshop_core::{Drink, DrinkId, DrinkPatch, NewDrink, Recipe};

use super::r#trait::{seed_drinks, DrinkStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

/// Postgres-backed drink store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresDrinkStore {
    pool: PgPool,
}

impl PostgresDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `drink` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn setup(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("setup", e))?;
        Ok(())
    }

    /// Close every pooled connection. Pending acquisitions fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DrinkId,
        patch: &DrinkPatch,
    ) -> Result<Drink, StoreError> {
        let mut drink = lock_row(tx, id).await?;
        patch.apply(&mut drink);

        sqlx::query("UPDATE drink SET title = $2, recipe = $3 WHERE id = $1")
            .bind(id.get())
            .bind(&drink.title)
            .bind(drink.recipe.to_text()?)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        Ok(drink)
    }

    async fn delete_in_tx(tx: &mut Transaction<'_, Postgres>, id: DrinkId) -> Result<(), StoreError> {
        lock_row(tx, id).await?;

        sqlx::query("DELETE FROM drink WHERE id = $1")
            .bind(id.get())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(())
    }

    async fn reset_in_tx(tx: &mut Transaction<'_, Postgres>) -> Result<(), StoreError> {
        sqlx::query("DROP TABLE IF EXISTS drink")
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("drop_table", e))?;
        sqlx::query(CREATE_TABLE)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("create_table", e))?;

        for drink in seed_drinks()? {
            sqlx::query("INSERT INTO drink (title, recipe) VALUES ($1, $2)")
                .bind(drink.title())
                .bind(drink.recipe().to_text()?)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("seed", e))?;
        }

        Ok(())
    }

    async fn begin(&self, operation: &'static str) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the original error is still the one returned.
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    operation: &'static str,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(operation, error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

async fn lock_row(tx: &mut Transaction<'_, Postgres>, id: DrinkId) -> Result<Drink, StoreError> {
    let row = sqlx::query("SELECT id, title, recipe FROM drink WHERE id = $1 FOR UPDATE")
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_row", e))?
        .ok_or(StoreError::NotFound)?;

    DrinkRow::from_row(&row)
        .map_err(|e| map_sqlx_error("lock_row", e))?
        .try_into()
}

#[async_trait]
impl DrinkStore for PostgresDrinkStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query("SELECT id, title, recipe FROM drink ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        let mut drinks = Vec::with_capacity(rows.len());
        for row in rows {
            let row = DrinkRow::from_row(&row).map_err(|e| map_sqlx_error("list", e))?;
            drinks.push(row.try_into()?);
        }

        Ok(drinks)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: DrinkId) -> Result<Option<Drink>, StoreError> {
        let row = sqlx::query("SELECT id, title, recipe FROM drink WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        match row {
            Some(row) => {
                let row = DrinkRow::from_row(&row).map_err(|e| map_sqlx_error("get", e))?;
                Ok(Some(row.try_into()?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, drink), fields(title = %drink.title()), err)]
    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let recipe = drink.recipe().to_text()?;

        let id: i64 = sqlx::query("INSERT INTO drink (title, recipe) VALUES ($1, $2) RETURNING id")
            .bind(drink.title())
            .bind(recipe)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(drink.into_drink(DrinkId::new(id)))
    }

    #[instrument(skip(self, patch), fields(id = %id), err)]
    async fn update(&self, id: DrinkId, patch: &DrinkPatch) -> Result<Drink, StoreError> {
        let mut tx = self.begin("update").await?;
        let result = Self::update_in_tx(&mut tx, id, patch).await;
        finish(tx, "update", result).await
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: DrinkId) -> Result<(), StoreError> {
        let mut tx = self.begin("delete").await?;
        let result = Self::delete_in_tx(&mut tx, id).await;
        finish(tx, "delete", result).await
    }

    #[instrument(skip(self), err)]
    async fn reset(&self) -> Result<(), StoreError> {
        let mut tx = self.begin("reset").await?;
        let result = Self::reset_in_tx(&mut tx).await;
        finish(tx, "reset", result).await
    }
}

struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl<'r> FromRow<'r, PgRow> for DrinkRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(DrinkRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            recipe: row.try_get("recipe")?,
        })
    }
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = Recipe::from_text(&row.recipe)
            .map_err(|e| StoreError::Corrupt(format!("drink {}: {}", row.id, e)))?;
        Ok(Drink {
            id: DrinkId::new(row.id),
            title: row.title,
            recipe,
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict("a drink with this title already exists".to_string()),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
