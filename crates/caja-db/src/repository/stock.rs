//! # Stock Movement Repository
//!
//! Read access to the append-only stock ledger. Rows are inserted only by
//! the workflows (sale, cancellation, manual adjustment) and are never
//! updated or deleted afterwards - there are deliberately no write methods
//! here.

use sqlx::SqlitePool;

use crate::error::DbResult;
use caja_core::StockMovement;

/// Repository for stock movement queries.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    /// Creates a new StockMovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Lists movements for a business, newest first, optionally filtered to
    /// a single product.
    pub async fn list(
        &self,
        business_id: &str,
        product_id: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, business_id, product_id, quantity, type, reason, user_id, created_at
            FROM stock_movements
            WHERE business_id = ?1
              AND (?2 IS NULL OR product_id = ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#,
        )
        .bind(business_id)
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
