//! # Config Repository
//!
//! One `BusinessConfig` per merchant, stored as a JSON document so the
//! option list keeps its order and shape.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use fitbell_core::BusinessConfig;

#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// The stored config, `None` if the merchant never saved one.
    pub async fn get(&self, merchant_id: &str) -> DbResult<Option<BusinessConfig>> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT config_json FROM business_configs WHERE merchant_id = ?1")
                .bind(merchant_id)
                .fetch_optional(&self.pool)
                .await?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replaces the whole document for `merchant_id`.
    pub async fn upsert(&self, merchant_id: &str, config: &BusinessConfig) -> DbResult<()> {
        let json = serde_json::to_string(config)?;

        debug!(merchant_id = %merchant_id, bytes = json.len(), "Writing business config");

        sqlx::query(
            r#"
            INSERT INTO business_configs (merchant_id, config_json, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(merchant_id) DO UPDATE SET
                config_json = excluded.config_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(merchant_id)
        .bind(json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
