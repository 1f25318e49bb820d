//! # Domain Types
//!
//! Core domain types for the Caja back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐  ┌───────────────┐  ┌────────────────────┐      │
//! │  │   Business    │  │    Product    │  │       Sale         │      │
//! │  │  ───────────  │  │  ───────────  │  │  ────────────────  │      │
//! │  │  id (UUID)    │  │  id (UUID)    │  │  id (UUID)         │      │
//! │  │  tax_rate_bps │  │  price_cents  │  │  subtotal/discount │      │
//! │  │  currency     │  │  stock        │  │  tax/total (cents) │      │
//! │  └───────────────┘  │  is_active    │  │  payment_method    │      │
//! │                     └───────────────┘  │  status            │      │
//! │  ┌───────────────┐  ┌───────────────┐  └─────────┬──────────┘      │
//! │  │ StockMovement │  │ CashRegister  │            │                 │
//! │  │  ───────────  │  │  ───────────  │  ┌─────────▼──────────┐      │
//! │  │  signed qty   │  │  opening /    │  │     SaleItem       │      │
//! │  │  IN/OUT/ADJ   │  │  closing /    │  │  quantity ×        │      │
//! │  │  append-only  │  │  expected     │  │  unit_price_cents  │      │
//! │  └───────────────┘  └───────────────┘  └────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity carries a UUID v4 string id generated by the caller; amounts
//! are integer cents and tax rates are basis points throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (a common VAT rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Business
// =============================================================================

/// A tenant: owns products, customers, sales, and cash registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Business {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    /// ISO currency code, default "USD".
    pub currency: String,
    /// Tax rate in basis points, applied to the discounted subtotal of sales.
    pub tax_rate_bps: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `stock` is the on-hand quantity. It is mutated only by the sale,
/// cancellation, and manual adjustment workflows, each of which writes a
/// matching [`StockMovement`] ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub sku: Option<String>,
    /// Price in cents (smallest currency unit), never negative.
    pub price_cents: i64,
    /// Current stock level.
    pub stock: i64,
    /// Whether product is active (soft delete).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity can be taken from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of a business. Optional on sales (walk-in sales carry none).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// The only transition is Completed → Cancelled, and it is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Sale has been recorded and stock decremented.
    Completed,
    /// Sale was cancelled and its inventory effects reversed.
    Cancelled,
    /// Declared for a future held/quote flow; no operation produces it.
    Pending,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash; the only method counted in register reconciliation.
    Cash,
    Debit,
    Credit,
    Transfer,
}

impl PaymentMethod {
    /// Whether this method settles through the cash drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale transaction.
///
/// Totals obey `total == subtotal - discount + tax` with
/// `tax == round((subtotal - discount) × business tax rate)`; both are
/// computed once at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub business_id: String,
    /// The cashier who recorded the sale.
    pub user_id: String,
    pub customer_id: Option<String>,
    pub cash_register_id: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Quantity and unit price are snapshotted at the time of sale, so the line
/// survives later product price changes. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Always `quantity * unit_price_cents`.
    pub subtotal_cents: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Classification of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock entering (cancellation restore, positive adjustment).
    In,
    /// Stock leaving (sale, negative adjustment).
    Out,
    /// Zero-delta correction entry.
    Adjustment,
}

impl MovementType {
    /// Classifies a signed stock delta.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::types::MovementType;
    ///
    /// assert_eq!(MovementType::for_delta(5), MovementType::In);
    /// assert_eq!(MovementType::for_delta(-3), MovementType::Out);
    /// assert_eq!(MovementType::for_delta(0), MovementType::Adjustment);
    /// ```
    pub const fn for_delta(delta: i64) -> Self {
        if delta > 0 {
            MovementType::In
        } else if delta < 0 {
            MovementType::Out
        } else {
            MovementType::Adjustment
        }
    }
}

/// An append-only ledger entry recording one change to a product's stock.
///
/// `quantity` is the signed delta applied; its sign always matches the
/// direction of the change. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub business_id: String,
    pub product_id: String,
    /// Signed delta: negative for sales, positive for restores.
    pub quantity: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub movement_type: MovementType,
    pub reason: Option<String>,
    /// The user whose action caused the change.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Register
// =============================================================================

/// Status of a cash register session. OPEN → CLOSED, one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisterStatus {
    Open,
    Closed,
}

/// A cash register session: a bounded period during which one user's cash
/// handling is tracked, opened with a float and reconciled at close.
///
/// `expected_amount_cents` is a snapshot taken at close time; sales
/// cancelled after the close are NOT reflected retroactively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashRegister {
    pub id: String,
    pub business_id: String,
    /// The user who opened (and must close) the session.
    pub user_id: String,
    pub opening_amount_cents: i64,
    pub closing_amount_cents: Option<i64>,
    pub expected_amount_cents: Option<i64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub status: RegisterStatus,
}

impl CashRegister {
    /// Returns the opening float as Money.
    #[inline]
    pub fn opening_amount(&self) -> Money {
        Money::from_cents(self.opening_amount_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(2100);
        assert_eq!(rate.bps(), 2100);
        assert!((rate.percentage() - 21.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(21.0).bps(), 2100);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_movement_type_for_delta() {
        assert_eq!(MovementType::for_delta(1), MovementType::In);
        assert_eq!(MovementType::for_delta(-1), MovementType::Out);
        assert_eq!(MovementType::for_delta(0), MovementType::Adjustment);
    }

    #[test]
    fn test_payment_method_is_cash() {
        assert!(PaymentMethod::Cash.is_cash());
        assert!(!PaymentMethod::Debit.is_cash());
        assert!(!PaymentMethod::Transfer.is_cash());
    }

    #[test]
    fn test_enum_wire_format() {
        // The API layer serializes enums in the same upper-case form the
        // database CHECK constraints use.
        assert_eq!(
            serde_json::to_value(PaymentMethod::Cash).unwrap(),
            serde_json::json!("CASH")
        );
        assert_eq!(
            serde_json::to_value(SaleStatus::Completed).unwrap(),
            serde_json::json!("COMPLETED")
        );
        assert_eq!(
            serde_json::to_value(MovementType::Adjustment).unwrap(),
            serde_json::json!("ADJUSTMENT")
        );
        assert_eq!(
            serde_json::to_value(RegisterStatus::Open).unwrap(),
            serde_json::json!("OPEN")
        );
    }

    #[test]
    fn test_movement_type_serde_round_trip() {
        let parsed: MovementType = serde_json::from_str("\"OUT\"").unwrap();
        assert_eq!(parsed, MovementType::Out);
    }
}
