//! # Sale Totals
//!
//! Pure computation of sale totals from line items, a discount, and the
//! business tax rate.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  line subtotal = quantity × unit_price                              │
//! │  subtotal      = Σ line subtotals                                   │
//! │  tax           = round((subtotal - discount) × tax_rate)            │
//! │  total         = subtotal - discount + tax                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The discount is an absolute amount (not a percentage) applied before tax,
//! so tax is charged only on what the customer actually pays.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxRate;

/// The four computed amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Computes sale totals from a pre-summed subtotal.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    /// use caja_core::totals::SaleTotals;
    /// use caja_core::types::TaxRate;
    ///
    /// // Two units at $10.00 each, no discount, 21% tax
    /// let totals = SaleTotals::compute(
    ///     Money::from_cents(2000),
    ///     Money::zero(),
    ///     TaxRate::from_bps(2100),
    /// );
    /// assert_eq!(totals.tax.cents(), 420);
    /// assert_eq!(totals.total.cents(), 2420);
    /// ```
    pub fn compute(subtotal: Money, discount: Money, rate: TaxRate) -> Self {
        let taxable = subtotal - discount;
        let tax = taxable.tax_amount(rate);

        SaleTotals {
            subtotal,
            discount,
            tax,
            total: taxable + tax,
        }
    }
}

/// Computes one line's subtotal: `quantity × unit_price`.
#[inline]
pub fn line_subtotal(unit_price: Money, quantity: i64) -> Money {
    unit_price * quantity
}

// =============================================================================
// Unit Tests
// =============================================================================
