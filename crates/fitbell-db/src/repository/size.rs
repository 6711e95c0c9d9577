//! # Size Repository
//!
//! Size chart rows. All three categories share one table; columns a
//! category doesn't use stay NULL.
//!
//! ```text
//! category  │ region │ size │ chest │ waist │ inseam
//! ──────────┼────────┼──────┼───────┼───────┼───────
//! footwear  │ US     │ 9    │ NULL  │ NULL  │ NULL
//! tops      │ NULL   │ M    │ 38-40 │ 32-34 │ NULL
//! bottoms   │ NULL   │ 32   │ NULL  │ 32    │ 32
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use fitbell_core::size_chart::{BottomSize, FootwearSize, TopSize};
use fitbell_core::{SizeCategory, SizeChart, SizeEntry};

#[derive(Debug, Clone)]
pub struct SizeRepository {
    pool: SqlitePool,
}

impl SizeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SizeRepository { pool }
    }

    /// Appends `entry` to the merchant's chart.
    pub async fn insert(&self, merchant_id: &str, entry: &SizeEntry) -> DbResult<()> {
        let (region, size, chest, waist, inseam) = match entry {
            SizeEntry::Footwear(e) => (Some(&e.region), &e.size, None, None, None),
            SizeEntry::Tops(e) => (None, &e.size, Some(&e.chest), Some(&e.waist), None),
            SizeEntry::Bottoms(e) => (None, &e.size, None, Some(&e.waist), Some(&e.inseam)),
        };

        sqlx::query(
            r#"
            INSERT INTO size_entries
                (id, merchant_id, category, region, size, chest, waist, inseam, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(entry.id())
        .bind(merchant_id)
        .bind(entry.category())
        .bind(region)
        .bind(size)
        .bind(chest)
        .bind(waist)
        .bind(inseam)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(merchant_id = %merchant_id, id = %entry.id(), "Size entry inserted");
        Ok(())
    }

    /// Deletes one entry. Returns whether a row was removed.
    pub async fn delete(
        &self,
        merchant_id: &str,
        category: SizeCategory,
        id: &str,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM size_entries WHERE merchant_id = ?1 AND category = ?2 AND id = ?3",
        )
        .bind(merchant_id)
        .bind(category)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rebuilds the chart in insertion order. Empty if nothing is stored.
    pub async fn chart(&self, merchant_id: &str) -> DbResult<SizeChart> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, region, size, chest, waist, inseam
            FROM size_entries
            WHERE merchant_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut chart = SizeChart::default();
        for row in &rows {
            chart.push(entry_from_row(row)?);
        }
        Ok(chart)
    }
}

fn entry_from_row(row: &SqliteRow) -> DbResult<SizeEntry> {
    let id: String = row.try_get("id")?;
    let category: SizeCategory = row.try_get("category")?;
    let size: String = row.try_get("size")?;
    let text = |column: &str| -> DbResult<String> {
        let value: Option<String> = row.try_get(column)?;
        Ok(value.unwrap_or_default())
    };

    let entry = match category {
        SizeCategory::Footwear => SizeEntry::Footwear(FootwearSize {
            id,
            region: text("region")?,
            size,
        }),
        SizeCategory::Tops => SizeEntry::Tops(TopSize {
            id,
            size,
            chest: text("chest")?,
            waist: text("waist")?,
        }),
        SizeCategory::Bottoms => SizeEntry::Bottoms(BottomSize {
            id,
            size,
            waist: text("waist")?,
            inseam: text("inseam")?,
        }),
    };
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use crate::pool::Database;
    use fitbell_core::{SizeCategory, SizeChart, SizeEntry};

    #[tokio::test]
    async fn test_chart_round_trip_keeps_order() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.sizes();
        let sample = SizeChart::sample();

        for entry in sample.footwear.iter().cloned().map(SizeEntry::Footwear) {
            repo.insert("m1", &entry).await.unwrap();
        }
        for entry in sample.tops.iter().cloned().map(SizeEntry::Tops) {
            repo.insert("m1", &entry).await.unwrap();
        }
        for entry in sample.bottoms.iter().cloned().map(SizeEntry::Bottoms) {
            repo.insert("m1", &entry).await.unwrap();
        }

        assert_eq!(repo.chart("m1").await.unwrap(), sample);
        assert!(repo.chart("m2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_category() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.sizes();
        let sample = SizeChart::sample();
        repo.insert("m1", &SizeEntry::Tops(sample.tops[0].clone()))
            .await
            .unwrap();

        let id = sample.tops[0].id.clone();
        assert!(!repo.delete("m1", SizeCategory::Bottoms, &id).await.unwrap());
        assert!(repo.delete("m1", SizeCategory::Tops, &id).await.unwrap());
        assert!(!repo.delete("m1", SizeCategory::Tops, &id).await.unwrap());
    }
}
