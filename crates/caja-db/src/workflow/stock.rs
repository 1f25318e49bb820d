//! # Stock Adjustment Workflow
//!
//! The stock-change primitive shared by every workflow that touches
//! inventory, plus the manual adjustment operation built directly on it.
//!
//! ## The Primitive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  apply_stock_delta(product, delta)                                  │
//! │      UPDATE products                                                │
//! │      SET stock = stock + delta                                      │
//! │      WHERE id = ? AND stock + delta >= 0                            │
//! │      → affected rows checked by the caller                          │
//! │                                                                     │
//! │  record_movement(...)                                               │
//! │      one INSERT into stock_movements per stock change               │
//! │                                                                     │
//! │  Callers:                                                           │
//! │    sale creation  → delta = -quantity, movement type OUT            │
//! │    cancellation   → delta = +quantity, movement type IN             │
//! │    adjustment     → delta as requested, type from the delta sign    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard `stock + delta >= 0` makes check-and-decrement atomic: a
//! concurrent transaction that drained the stock first simply makes this
//! update match zero rows, and the caller rolls back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::{CoreError, MovementType};

use crate::pool::Database;
use crate::workflow::WorkflowResult;

// =============================================================================
// Shared Primitive
// =============================================================================

/// A stock ledger entry about to be written.
pub(crate) struct NewMovement<'a> {
    pub business_id: &'a str,
    pub product_id: &'a str,
    /// Signed delta; its sign must match the movement type.
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: &'a str,
    pub user_id: &'a str,
    pub now: DateTime<Utc>,
}

/// Applies a signed delta to a product's stock, refusing to drive it below
/// zero. Returns whether a row was updated.
///
/// Runs on the caller's transaction: the stock write and its ledger row
/// must commit together.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> WorkflowResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock + ?1, updated_at = ?2
        WHERE id = ?3 AND stock + ?1 >= 0
        "#,
    )
    .bind(delta)
    .bind(now)
    .bind(product_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Inserts one append-only stock movement row.
pub(crate) async fn record_movement(
    conn: &mut SqliteConnection,
    movement: NewMovement<'_>,
) -> WorkflowResult<()> {
    debug!(
        product_id = %movement.product_id,
        quantity = movement.quantity,
        "Recording stock movement"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, business_id, product_id, quantity, type, reason, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(movement.business_id)
    .bind(movement.product_id)
    .bind(movement.quantity)
    .bind(movement.movement_type)
    .bind(movement.reason)
    .bind(movement.user_id)
    .bind(movement.now)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Manual Adjustment
// =============================================================================

/// Input for a manual stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustStockInput {
    pub business_id: String,
    pub product_id: String,
    /// Signed delta to apply (positive receives stock, negative removes it).
    pub quantity: i64,
    /// Free-text justification for the ledger; defaults to "Manual adjustment".
    pub reason: Option<String>,
}

/// Result of a manual stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
}

/// Applies a signed stock delta to a product and records the movement.
///
/// ## Behavior
/// - Product is looked up scoped to the business, inactive products
///   included (corrections on retired products are legitimate).
/// - A delta that would leave stock negative is rejected with
///   `InsufficientStock` and nothing changes.
/// - The movement type is derived from the delta sign: IN for positive,
///   OUT for negative, ADJUSTMENT for zero.
pub async fn adjust_stock(
    db: &Database,
    user_id: &str,
    input: AdjustStockInput,
) -> WorkflowResult<StockAdjustment> {
    debug!(
        product_id = %input.product_id,
        quantity = input.quantity,
        "adjust_stock"
    );

    let mut tx = db.pool().begin().await?;

    let current: Option<i64> =
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1 AND business_id = ?2")
            .bind(&input.product_id)
            .bind(&input.business_id)
            .fetch_optional(&mut *tx)
            .await?;

    let current = match current {
        Some(stock) => stock,
        None => return Err(CoreError::ProductNotFound(input.product_id).into()),
    };

    let new_stock = current + input.quantity;
    if new_stock < 0 {
        return Err(CoreError::InsufficientStock {
            product_id: input.product_id,
            available: current,
            requested: input.quantity.abs(),
        }
        .into());
    }

    let now = Utc::now();

    if !apply_stock_delta(&mut tx, &input.product_id, input.quantity, now).await? {
        // The guard re-checks atomically; a concurrent writer got here first.
        return Err(CoreError::InsufficientStock {
            product_id: input.product_id,
            available: current,
            requested: input.quantity.abs(),
        }
        .into());
    }

    let movement_type = MovementType::for_delta(input.quantity);
    let reason = input.reason.as_deref().unwrap_or("Manual adjustment");

    record_movement(
        &mut tx,
        NewMovement {
            business_id: &input.business_id,
            product_id: &input.product_id,
            quantity: input.quantity,
            movement_type,
            reason,
            user_id,
            now,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        product_id = %input.product_id,
        previous_stock = current,
        new_stock,
        "Stock adjusted"
    );

    Ok(StockAdjustment {
        product_id: input.product_id,
        previous_stock: current,
        new_stock,
        quantity: input.quantity,
        movement_type,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
