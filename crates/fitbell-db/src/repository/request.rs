//! # Request Repository
//!
//! Append-only log of requests raised by the public widget. The payload
//! column holds the serialized `WidgetEvent`; `kind` is duplicated out of
//! it for filtering.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use fitbell_core::RecordedRequest;

#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RequestRepository { pool }
    }

    pub async fn insert(&self, request: &RecordedRequest) -> DbResult<()> {
        let payload = serde_json::to_string(&request.event)?;

        sqlx::query(
            r#"
            INSERT INTO widget_requests (id, merchant_id, kind, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&request.id)
        .bind(&request.merchant_id)
        .bind(request.event.kind())
        .bind(payload)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %request.id, kind = request.event.kind(), "Request logged");
        Ok(())
    }

    /// All requests for `merchant_id`, oldest first.
    pub async fn list_for_merchant(&self, merchant_id: &str) -> DbResult<Vec<RecordedRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, merchant_id, payload, created_at
            FROM widget_requests
            WHERE merchant_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(request_from_row).collect()
    }

    pub async fn count_for_merchant(&self, merchant_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM widget_requests WHERE merchant_id = ?1")
                .bind(merchant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

fn request_from_row(row: &SqliteRow) -> DbResult<RecordedRequest> {
    let payload: String = row.try_get("payload")?;

    Ok(RecordedRequest {
        id: row.try_get("id")?,
        merchant_id: row.try_get("merchant_id")?,
        event: serde_json::from_str(&payload)?,
        created_at: row.try_get("created_at")?,
    })
}
