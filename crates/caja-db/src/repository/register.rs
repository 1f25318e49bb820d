//! # Cash Register Repository
//!
//! Read access to cash register sessions. Opening and closing go through
//! [`crate::workflow::register`].

use sqlx::SqlitePool;

use crate::error::DbResult;
use caja_core::{CashRegister, RegisterStatus};

const REGISTER_COLUMNS: &str = "id, business_id, user_id, opening_amount_cents, \
     closing_amount_cents, expected_amount_cents, opened_at, closed_at, status";

/// Repository for cash register queries.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(&format!(
            "SELECT {REGISTER_COLUMNS} FROM cash_registers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Gets the user's currently open register for a business, if any.
    ///
    /// A user holds at most one open register per business; the most
    /// recently opened wins if historical data ever violates that.
    pub async fn current_open(
        &self,
        business_id: &str,
        user_id: &str,
    ) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(&format!(
            r#"
            SELECT {REGISTER_COLUMNS}
            FROM cash_registers
            WHERE business_id = ?1 AND user_id = ?2 AND status = 'OPEN'
            ORDER BY opened_at DESC
            LIMIT 1
            "#
        ))
        .bind(business_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Lists registers for a business, newest first, optionally filtered by
    /// status.
    pub async fn list(
        &self,
        business_id: &str,
        status: Option<RegisterStatus>,
        limit: u32,
    ) -> DbResult<Vec<CashRegister>> {
        let registers = sqlx::query_as::<_, CashRegister>(&format!(
            r#"
            SELECT {REGISTER_COLUMNS}
            FROM cash_registers
            WHERE business_id = ?1
              AND (?2 IS NULL OR status = ?2)
            ORDER BY opened_at DESC
            LIMIT ?3
            "#
        ))
        .bind(business_id)
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }
}
