//! # caja-core: Pure Business Logic for the Caja Back Office
//!
//! This crate is the **heart** of Caja. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Caja Architecture                            │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │              API host (HTTP server, external)               │   │
//! │  │   authenticates the user, parses requests, maps errors      │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 caja-db (workflows + storage)               │   │
//! │  │   create_sale, cancel_sale, adjust_stock, close_register    │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ caja-core (THIS CRATE) ★                    │   │
//! │  │                                                             │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐    │   │
//! │  │   │  types   │ │  money   │ │  totals  │ │ validation │    │   │
//! │  │   │ Product  │ │  Money   │ │ SaleT.   │ │   rules    │    │   │
//! │  │   │  Sale    │ │ TaxRate  │ │ compute  │ │   checks   │    │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────┘    │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Business, Product, Sale, StockMovement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Sale total computation (subtotal, discount, tax, total)
//! - [`error`] - Domain error types
//! - [`validation`] - Input value validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), rates are bps
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caja_core::Money` instead of
// `use caja_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::SaleTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item in a sale.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of line items in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Default stock threshold below which a product counts as "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Default row limit for listing queries.
pub const DEFAULT_QUERY_LIMIT: u32 = 50;

/// Default currency code for new businesses.
pub const DEFAULT_CURRENCY: &str = "USD";
