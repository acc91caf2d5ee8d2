//! # Money Module
//!
//! Integer-cent money for every price, total, balance and refund.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored as i64 cents                                                    │
//! │                                                                         │
//! │    "9.99" (CSV) ──parse_decimal──► Money(999) ──to_decimal──► "9.99"    │
//! │                                                                         │
//! │    Money(999) ──Display──► "$9.99"                                      │
//! │                                                                         │
//! │  Percentages round half away from zero to the nearest cent:            │
//! │    Money(1050).percent(7) = 73.5 → 74                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arithmetic saturates at the ends of the i64 range instead of wrapping.
//!
//! Floats never touch an amount. Decimal text (CSV cells, CLI input) goes
//! through `rust_decimal` and is rounded to cents exactly once.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents. Signed, so refunds and adjustments can be
/// negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whole currency units, truncated toward zero.
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Tax at `rate`, rounded half up.
    ///
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(700));
    /// assert_eq!(tax.cents(), 70);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.apply_bps(rate.bps())
    }

    /// `percent`% of this amount, rounded to the nearest cent.
    pub fn percent(&self, percent: u32) -> Money {
        self.apply_bps(percent.saturating_mul(100))
    }

    fn apply_bps(&self, bps: u32) -> Money {
        // i128 keeps large amounts from overflowing before the division
        let scaled = self.0 as i128 * bps as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money(rounded as i64)
    }

    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Never below zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Parses decimal currency text such as `"9.99"` or `"12"`.
    ///
    /// Extra precision is rounded half away from zero to whole cents.
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let trimmed = input.trim();
        let invalid = || ValidationError::InvalidAmount {
            value: trimmed.to_string(),
        };

        let decimal = Decimal::from_str(trimmed).map_err(|_| invalid())?;
        let cents = (decimal * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents.to_i64().map(Money).ok_or_else(invalid)
    }

    /// Plain decimal text with two places and no symbol, e.g. `"9.99"`.
    pub fn to_decimal_string(&self) -> String {
        Decimal::new(self.0, 2).to_string()
    }

    /// Display with a caller-chosen symbol, e.g. `"€9.99"`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}", sign, symbol, self.abs().to_decimal_string())
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
