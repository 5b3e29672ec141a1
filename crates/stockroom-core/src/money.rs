//! # Money Module
//!
//! Provides the `Money` type for unit costs and purchase order totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unit costs arrive as integer minor units (cents).                      │
//! │                                                                         │
//! │    PoDetail.unit_cost_cents ──► line total = cost × qty_ordered         │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                          PO ordered total / received total              │
//! │                                                                         │
//! │  Product.last_price_cents is overwritten from the latest receipt.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let cost = Money::from_cents(125_000); // $1,250.00 laptop
//! let line = cost.multiply_quantity(4);
//! assert_eq!(line.cents(), 500_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Arithmetic saturates instead of overflowing; totals are for display.
///
/// Signed so that differences (ordered minus received value) can go negative
/// without a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// There is deliberately no float constructor.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Unit cost times a quantity. Saturates at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let mouse = Money::from_cents(1999);
    /// assert_eq!(mouse.multiply_quantity(3).cents(), 5997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering, e.g. `$1250.00`. Clients format for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Summing line totals into a purchase order total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(125_000).to_string(), "$1250.00");
        assert_eq!(Money::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 4).cents(), 1000);

        let mut c = a;
        c += b;
        assert_eq!(c.cents(), 1250);
    }

    #[test]
    fn test_sum_of_line_totals() {
        let lines = [(1999, 3), (125_000, 2), (0, 10)];
        let total: Money = lines
            .iter()
            .map(|(cost, qty)| Money::from_cents(*cost).multiply_quantity(*qty))
            .sum();
        assert_eq!(total.cents(), 5997 + 250_000);
    }

    #[test]
    fn test_totals_saturate() {
        let cost = Money::from_cents(100_000_000_000);
        assert_eq!(cost.multiply_quantity(1_000_000_000).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + cost).cents(), i64::MAX);
    }
}
