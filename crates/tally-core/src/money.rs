//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is a whole number of cents. Sums are exact.             │
//! │    Rounding happens exactly once, where a product or a rate creates     │
//! │    fractions of a cent (quantity × price, amount × tax rate).          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! Round half away from zero, to two fractional digits, at the output of a
//! computed value. Intermediate values are never rounded twice.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::quantity::Quantity;
//!
//! let price = Money::parse("10.50").unwrap();
//! let total = price.times(Quantity::from_units(5)).unwrap();
//! assert_eq!(total, Money::from_cents(5250)); // $52.50
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;
use crate::types::TaxRate;

// =============================================================================
// Rounding
// =============================================================================

/// Divides `numerator` by a positive `denominator`, rounding half away from
/// zero.
///
/// ```text
///   125 / 10 → 12.5 → 13        -125 / 10 → -12.5 → -13
///   124 / 10 → 12.4 → 12        -124 / 10 → -12.4 → -12
/// ```
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

/// Narrows an exact `i128` intermediate back to the `i64` range.
pub(crate) fn narrow(value: i128, what: &'static str) -> CoreResult<i64> {
    i64::try_from(value).map_err(|_| CoreError::Overflow(what))
}

/// Converts a decimal to an integer count of hundredths (cents), rounding
/// half away from zero.
pub(crate) fn decimal_to_hundredths(value: Decimal, field: &str) -> Result<i64, ValidationError> {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{} is out of range", value),
        })
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances and remaining amounts can go negative
///   (overpayment, customer credit)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as integer cents
///
/// ## Where Money is Used
/// ```text
/// CartLine.unit_price ──► line_total ──► subtotal ──► invoice_total
///                                                        │
/// LedgerTransaction.amount ──► customer_balance          ▼
///                                   │               remaining
///                                   ▼
///                           credit limit checks
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(0);

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` = -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates Money from an exact decimal, rounding half away from zero to
    /// cents.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    ///
    /// // 10.005 → 10.01
    /// let money = Money::from_decimal(Decimal::new(10005, 3)).unwrap();
    /// assert_eq!(money.cents(), 1001);
    /// ```
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        decimal_to_hundredths(value, "amount").map(Money)
    }

    /// Parses a decimal string such as `"52.5"` or `"-3.125"`.
    ///
    /// This is the entry point for amounts typed by users or read back from
    /// `numeric` columns. Floats never enter the kernel.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = Decimal::from_str(input.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_decimal(value)
    }

    /// Returns the value as an exact decimal with two fractional digits.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// The exact product is `cents × hundredths / 100`; it is rounded half
    /// away from zero to whole cents exactly once.
    ///
    /// ## Example
    /// ```text
    /// Unit price: 3.99, Quantity: 1.25 kg
    ///      │
    ///      ▼
    /// 399 × 125 / 100 = 498.75 cents → 499 cents (4.99)
    /// ```
    ///
    /// # Errors
    /// `Overflow` if the rounded product does not fit in `i64` cents.
    pub fn times(&self, quantity: Quantity) -> CoreResult<Money> {
        let exact = self.0 as i128 * quantity.hundredths() as i128;
        narrow(div_round_half_away(exact, 100), "amount × quantity").map(Money)
    }

    /// Calculates tax for a rate in basis points.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(1000); // $10.00
    /// let rate = TaxRate::from_bps(825);   // 8.25%
    ///
    /// // $10.00 × 8.25% = $0.825 → rounds to $0.83
    /// assert_eq!(price.calculate_tax(rate).unwrap().cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> CoreResult<Money> {
        self.percentage_of(rate.bps())
    }

    /// Returns `bps / 10000` of this amount, rounded half away from zero.
    ///
    /// Used for both tax (`TaxRate`) and percentage discounts. Rates above
    /// 100% can push the result past `i64`, which is an `Overflow`.
    pub fn percentage_of(&self, bps: u32) -> CoreResult<Money> {
        let exact = self.0 as i128 * bps as i128;
        narrow(div_round_half_away(exact, 10_000), "amount × rate").map(Money)
    }

    /// `self + other`, or `None` past the `i64` range.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self - other`, or `None` past the `i64` range.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self - other`, clamped to the `i64` range.
    #[inline]
    pub const fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and error messages. The UI formats amounts with the
/// tenant's currency and locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
