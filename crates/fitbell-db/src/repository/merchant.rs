//! # Merchant Repository
//!
//! Merchant accounts and the public slug routing table.
//!
//! ## Slug Routing
//! ```text
//! slug_routes
//! ┌──────────────────┬──────────────┐
//! │ my-awesome-store │ merchant A   │  ← bind_slug(slug, A)
//! └──────────────────┴──────────────┘
//!         │
//!         │ bind_slug(slug, B)   (another merchant, same name)
//!         ▼
//! ┌──────────────────┬──────────────┐
//! │ my-awesome-store │ merchant B   │  ← last write wins
//! └──────────────────┴──────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use fitbell_core::Merchant;

#[derive(Debug, Clone)]
pub struct MerchantRepository {
    pool: SqlitePool,
}

impl MerchantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MerchantRepository { pool }
    }

    /// Inserts a new merchant account.
    ///
    /// ## Errors
    /// * `UniqueViolation` - the email is already registered
    pub async fn insert(&self, merchant: &Merchant) -> DbResult<()> {
        debug!(uid = %merchant.uid, slug = %merchant.business_slug, "Inserting merchant");

        sqlx::query(
            r#"
            INSERT INTO merchants (uid, email, business_name, business_slug, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&merchant.uid)
        .bind(&merchant.email)
        .bind(&merchant.business_name)
        .bind(&merchant.business_slug)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &merchant.email),
            other => other,
        })?;

        Ok(())
    }

    pub async fn get_by_id(&self, uid: &str) -> DbResult<Option<Merchant>> {
        let row = sqlx::query(
            r#"
            SELECT uid, email, business_name, business_slug
            FROM merchants
            WHERE uid = ?1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(merchant_from_row).transpose()
    }

    /// Emails are matched case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Merchant>> {
        let row = sqlx::query(
            r#"
            SELECT uid, email, business_name, business_slug
            FROM merchants
            WHERE email = ?1 COLLATE NOCASE
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(merchant_from_row).transpose()
    }

    /// Points `slug` at `merchant_id`, replacing any previous binding.
    pub async fn bind_slug(&self, slug: &str, merchant_id: &str) -> DbResult<()> {
        if let Some(previous) = self.merchant_for_slug(slug).await? {
            if previous != merchant_id {
                warn!(
                    slug = %slug,
                    previous = %previous,
                    merchant_id = %merchant_id,
                    "Slug rebound to a different merchant"
                );
            }
        }

        sqlx::query(
            r#"
            INSERT INTO slug_routes (slug, merchant_id, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(slug) DO UPDATE SET
                merchant_id = excluded.merchant_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slug)
        .bind(merchant_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(slug = %slug, merchant_id = %merchant_id, "Slug bound");
        Ok(())
    }

    /// Deletes a merchant and every row it owns in one transaction.
    pub async fn delete(&self, uid: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        for table in ["slug_routes", "business_configs", "size_entries", "widget_requests"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE merchant_id = ?1"))
                .bind(uid)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM merchants WHERE uid = ?1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(uid = %uid, rows = result.rows_affected(), "Merchant deleted");
        Ok(result.rows_affected() > 0)
    }

    /// Merchant id currently bound to `slug`.
    pub async fn merchant_for_slug(&self, slug: &str) -> DbResult<Option<String>> {
        let merchant_id: Option<String> =
            sqlx::query_scalar("SELECT merchant_id FROM slug_routes WHERE slug = ?1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(merchant_id)
    }
}

fn merchant_from_row(row: &SqliteRow) -> DbResult<Merchant> {
    Ok(Merchant {
        uid: row.try_get("uid")?,
        email: row.try_get("email")?,
        business_name: row.try_get("business_name")?,
        business_slug: row.try_get("business_slug")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::pool::Database;
    use crate::error::DbError;
    use fitbell_core::Merchant;

    fn merchant(uid: &str, email: &str) -> Merchant {
        Merchant {
            uid: uid.to_string(),
            email: email.to_string(),
            business_name: "My Awesome Store".to_string(),
            business_slug: "my-awesome-store".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.merchants();

        repo.insert(&merchant("m1", "owner@store.test")).await.unwrap();

        let found = repo.find_by_email("Owner@Store.test").await.unwrap().unwrap();
        assert_eq!(found.uid, "m1");
        assert_eq!(repo.get_by_id("m1").await.unwrap(), Some(found));
        assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.merchants();

        repo.insert(&merchant("m1", "owner@store.test")).await.unwrap();
        let err = repo
            .insert(&merchant("m2", "owner@store.test"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_slug_binding_last_write_wins() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.merchants();

        assert_eq!(repo.merchant_for_slug("shop").await.unwrap(), None);

        repo.bind_slug("shop", "m1").await.unwrap();
        repo.bind_slug("shop", "m2").await.unwrap();

        assert_eq!(
            repo.merchant_for_slug("shop").await.unwrap().as_deref(),
            Some("m2")
        );
    }

    #[tokio::test]
    async fn test_delete_removes_owned_rows() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.merchants();
        repo.insert(&merchant("m1", "owner@store.test")).await.unwrap();
        repo.bind_slug("shop", "m1").await.unwrap();
        db.configs()
            .upsert("m1", &fitbell_core::BusinessConfig::default())
            .await
            .unwrap();

        assert!(repo.delete("m1").await.unwrap());

        assert_eq!(repo.get_by_id("m1").await.unwrap(), None);
        assert_eq!(repo.merchant_for_slug("shop").await.unwrap(), None);
        assert_eq!(db.configs().get("m1").await.unwrap(), None);
        assert!(!repo.delete("m1").await.unwrap());

        // The email is free again.
        repo.insert(&merchant("m2", "owner@store.test")).await.unwrap();
    }
}
