//! # Money Module
//!
//! Provides the `Money` type used for every price, debt, limit and total.
//!
//! ## Integer Cents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Floating point:   1200.00 * 0.9 * 3 = 3239.9999999999995  ❌           │
//! │  Integer cents:    120000 - 12000 = 108000; 108000 * 3 = 324000  ✅     │
//! │                                                                         │
//! │  Credit checks compare debt against limit. A one-cent drift there      │
//! │  decides whether an order is blocked, so no float ever touches it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Analytics converts to `f64` at the very edge ([`Money::as_major_f64`]);
//! nothing converts back.
//!
//! ## Usage
//! ```rust
//! use erp_core::money::Money;
//!
//! let price = Money::from_cents(120_000);
//! let vip = price.apply_percentage_discount(1000); // -10%
//! assert_eq!(vip.cents(), 108_000);
//! assert_eq!((vip * 3).cents(), 324_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► OrderItem.unit_price (frozen, VIP discount applied)
///                          │
///                          ▼
///                 Order.total_amount ──► Client.current_debt (on validation)
///                          │
///                          ▼
///                 FactSales.revenue / cost / margin (warehouse)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major units (whole currency).
    ///
    /// ```rust
    /// use erp_core::money::Money;
    /// assert_eq!(Money::from_major(1200).cents(), 120_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (0-99), always positive.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Value in major units as `f64`, for statistics only.
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }

    /// Subtracts a percentage discount expressed in basis points.
    ///
    /// ## Rounding
    /// The discount amount is rounded half-up to the nearest cent, so the
    /// customer never pays a fraction of a cent.
    ///
    /// ```rust
    /// use erp_core::money::Money;
    ///
    /// // 10% off 1200.00
    /// assert_eq!(Money::from_cents(120_000).apply_percentage_discount(1000).cents(), 108_000);
    /// // 10% off 0.15 = 0.015 discount → rounds to 0.02
    /// assert_eq!(Money::from_cents(15).apply_percentage_discount(1000).cents(), 13);
    /// ```
    pub fn apply_percentage_discount(&self, bps: u32) -> Self {
        let discount = (self.0 * bps as i64 + 5000) / 10000;
        Money(self.0 - discount)
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{}.{:02}", self.major().abs(), self.minor())
        } else {
            write!(f, "{}.{:02}", self.major(), self.minor())
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, quantity: i64) -> Money {
        Money(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
