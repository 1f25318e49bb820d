//! # Transactional Workflows
//!
//! The multi-step operations of the back office: sale creation, sale
//! cancellation, manual stock adjustment, and cash register open/close.
//!
//! ## Execution Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     One Request, One Transaction                    │
//! │                                                                     │
//! │  validate input (pure, caja-core)                                   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  BEGIN ───► business-rule checks ───► writes ───► COMMIT            │
//! │                     │                    │                          │
//! │                     └────── any error ───┴──► ROLLBACK              │
//! │                                                                     │
//! │  Either every row of a workflow lands, or none do. A failure can    │
//! │  never leave a sale without its items, or a stock change without    │
//! │  its ledger row.                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock decrements use a guarded conditional update
//! (`... SET stock = stock + ?1 WHERE ... AND stock + ?1 >= 0`) with the
//! affected-row count checked, so two concurrent sales of the same product
//! cannot both succeed past the available stock.
//!
//! Every function takes the acting user's id as an explicit argument; the
//! authentication layer in front of the API resolves it before calling in.

use thiserror::Error;

use caja_core::{CoreError, ValidationError};

use crate::error::DbError;

pub mod register;
pub mod sale;
pub mod stock;

pub use register::{
    close_register, open_register, CloseRegisterInput, OpenRegisterInput, RegisterCloseSummary,
};
pub use sale::{cancel_sale, create_sale, CreateSaleInput, CreatedSale, SaleLine};
pub use stock::{adjust_stock, AdjustStockInput, StockAdjustment};

// =============================================================================
// Workflow Error
// =============================================================================

/// Everything a workflow can fail with: a business-rule rejection
/// (client error) or a storage failure (server error).
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Validation failures enter through the CoreError wrapper.
impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        WorkflowError::Core(CoreError::Validation(err))
    }
}

/// Raw sqlx errors are storage failures.
impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Db(DbError::from(err))
    }
}

impl WorkflowError {
    /// True when the failure is the caller's fault (bad input or a
    /// business-rule rejection) rather than a storage problem.
    /// API hosts use this to pick 4xx vs 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(self, WorkflowError::Core(_))
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
