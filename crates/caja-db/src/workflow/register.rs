//! # Cash Register Workflow
//!
//! Opening and closing cash register sessions.
//!
//! ## Reconciliation at Close
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  expected = opening float                                           │
//! │           + Σ total of COMPLETED sales on this register            │
//! │             where payment_method = CASH                             │
//! │                                                                     │
//! │  difference = counted closing amount - expected                     │
//! │      > 0  drawer over                                               │
//! │      < 0  drawer short                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The expected amount is a snapshot taken at close time. Sales cancelled
//! after the close are not folded back in; a closed register is a
//! historical record.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::{validation, CashRegister, CoreError, PaymentMethod, RegisterStatus, SaleStatus};

use crate::pool::Database;
use crate::workflow::WorkflowResult;

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Input for opening a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRegisterInput {
    pub business_id: String,
    /// The float placed in the drawer at open.
    pub opening_amount_cents: i64,
}

/// Input for closing a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRegisterInput {
    /// The amount actually counted in the drawer.
    pub closing_amount_cents: i64,
}

/// Reconciliation summary returned by a successful close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCloseSummary {
    pub register_id: String,
    pub opening_amount_cents: i64,
    pub closing_amount_cents: i64,
    pub expected_amount_cents: i64,
    /// `closing - expected`: positive means the drawer is over, negative short.
    pub difference_cents: i64,
    pub total_sales_cents: i64,
    pub cash_sales_cents: i64,
    pub sales_count: i64,
}

// =============================================================================
// Open
// =============================================================================

/// Opens a register session for the acting user.
///
/// A user may hold at most one OPEN register per business; a second open is
/// rejected with `RegisterAlreadyOpen`.
pub async fn open_register(
    db: &Database,
    user_id: &str,
    input: OpenRegisterInput,
) -> WorkflowResult<CashRegister> {
    debug!(business_id = %input.business_id, "open_register");

    validation::validate_amount_cents("opening_amount", input.opening_amount_cents)?;

    let mut tx = db.pool().begin().await?;

    let existing: Option<String> = sqlx::query_scalar(
        "SELECT id FROM cash_registers WHERE business_id = ?1 AND user_id = ?2 AND status = ?3",
    )
    .bind(&input.business_id)
    .bind(user_id)
    .bind(RegisterStatus::Open)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(CoreError::RegisterAlreadyOpen.into());
    }

    let register = CashRegister {
        id: Uuid::new_v4().to_string(),
        business_id: input.business_id,
        user_id: user_id.to_string(),
        opening_amount_cents: input.opening_amount_cents,
        closing_amount_cents: None,
        expected_amount_cents: None,
        opened_at: Utc::now(),
        closed_at: None,
        status: RegisterStatus::Open,
    };

    sqlx::query(
        r#"
        INSERT INTO cash_registers (id, business_id, user_id, opening_amount_cents, opened_at, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&register.id)
    .bind(&register.business_id)
    .bind(&register.user_id)
    .bind(register.opening_amount_cents)
    .bind(register.opened_at)
    .bind(register.status)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(register_id = %register.id, "Cash register opened");

    Ok(register)
}

// =============================================================================
// Close
// =============================================================================

/// Closes a register session and reconciles the drawer.
///
/// ## Errors
/// - `RegisterNotFound` - no such register
/// - `RegisterOwnedByAnotherUser` - only the opener may close
/// - `RegisterAlreadyClosed` - closing is one-shot
pub async fn close_register(
    db: &Database,
    user_id: &str,
    register_id: &str,
    input: CloseRegisterInput,
) -> WorkflowResult<RegisterCloseSummary> {
    debug!(register_id = %register_id, "close_register");

    validation::validate_amount_cents("closing_amount", input.closing_amount_cents)?;

    let mut tx = db.pool().begin().await?;

    let register: Option<CashRegister> = sqlx::query_as(
        r#"
        SELECT id, business_id, user_id, opening_amount_cents, closing_amount_cents,
               expected_amount_cents, opened_at, closed_at, status
        FROM cash_registers
        WHERE id = ?1
        "#,
    )
    .bind(register_id)
    .fetch_optional(&mut *tx)
    .await?;

    let register = match register {
        Some(register) => register,
        None => return Err(CoreError::RegisterNotFound(register_id.to_string()).into()),
    };

    if register.user_id != user_id {
        return Err(CoreError::RegisterOwnedByAnotherUser {
            register_id: register_id.to_string(),
        }
        .into());
    }

    if register.status == RegisterStatus::Closed {
        return Err(CoreError::RegisterAlreadyClosed(register_id.to_string()).into());
    }

    // Aggregate the session's completed sales; cash settles into the drawer,
    // everything else only counts toward the session totals.
    let (cash_sales_cents, total_sales_cents, sales_count): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN payment_method = ?2 THEN total_cents ELSE 0 END), 0),
            COALESCE(SUM(total_cents), 0),
            COUNT(*)
        FROM sales
        WHERE cash_register_id = ?1 AND status = ?3
        "#,
    )
    .bind(register_id)
    .bind(PaymentMethod::Cash)
    .bind(SaleStatus::Completed)
    .fetch_one(&mut *tx)
    .await?;

    let expected_amount_cents = register.opening_amount_cents + cash_sales_cents;
    let difference_cents = input.closing_amount_cents - expected_amount_cents;
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE cash_registers
        SET closing_amount_cents = ?2, expected_amount_cents = ?3, closed_at = ?4, status = ?5
        WHERE id = ?1
        "#,
    )
    .bind(register_id)
    .bind(input.closing_amount_cents)
    .bind(expected_amount_cents)
    .bind(now)
    .bind(RegisterStatus::Closed)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        register_id = %register_id,
        expected_amount_cents,
        difference_cents,
        "Cash register closed"
    );

    Ok(RegisterCloseSummary {
        register_id: register_id.to_string(),
        opening_amount_cents: register.opening_amount_cents,
        closing_amount_cents: input.closing_amount_cents,
        expected_amount_cents,
        difference_cents,
        total_sales_cents,
        cash_sales_cents,
        sales_count,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
