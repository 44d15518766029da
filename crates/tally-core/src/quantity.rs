//! # Quantity Module
//!
//! Stock and cart quantities, stored as integer hundredths of a unit.
//!
//! Counted goods (`3` cans) and weighed goods (`1.25` kg) share one exact
//! representation, the same way [`Money`](crate::money::Money) stores cents.
//!
//! ```text
//! Quantity::from_units(3)        →  300 hundredths  → "3.00"
//! Quantity::from_hundredths(125) →  125 hundredths  → "1.25"
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::decimal_to_hundredths;

/// A quantity of stock in hundredths of a unit.
///
/// Signed so that subtraction can be checked before it is accepted; every
/// state the kernel hands back holds a non-negative quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Zero quantity.
    pub const ZERO: Quantity = Quantity(0);

    /// Creates a quantity of whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 100)
    }

    /// Creates a quantity from hundredths of a unit.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from an exact decimal, rounding half away from zero
    /// to hundredths.
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        decimal_to_hundredths(value, "quantity").map(Quantity)
    }

    /// Parses a decimal string such as `"12"` or `"0.75"`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = Decimal::from_str(input.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_decimal(value)
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part (truncated toward zero).
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the value as an exact decimal with two fractional digits.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
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

    /// `self + other`, or `None` past the `i64` range.
    #[inline]
    pub const fn checked_add(self, other: Quantity) -> Option<Quantity> {
        match self.0.checked_add(other.0) {
            Some(hundredths) => Some(Quantity(hundredths)),
            None => None,
        }
    }

    /// `self - other`, or `None` past the `i64` range.
    #[inline]
    pub const fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        match self.0.checked_sub(other.0) {
            Some(hundredths) => Some(Quantity(hundredths)),
            None => None,
        }
    }

    /// `self - other`, clamped to the `i64` range.
    #[inline]
    pub const fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(other.0))
    }

    /// Floors the value at zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Quantity::ZERO)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::ZERO
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_and_hundredths() {
        let q = Quantity::from_units(3);
        assert_eq!(q.hundredths(), 300);
        assert_eq!(q.whole_units(), 3);
        assert_eq!(Quantity::from_hundredths(125).whole_units(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_units(80).to_string(), "80.00");
        assert_eq!(Quantity::from_hundredths(125).to_string(), "1.25");
        assert_eq!(Quantity::from_hundredths(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Quantity::parse("12").unwrap(), Quantity::from_units(12));
        assert_eq!(Quantity::parse("0.755").unwrap(), Quantity::from_hundredths(76));
        assert!(Quantity::parse("twelve").is_err());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Quantity::from_units(-2).non_negative(), Quantity::ZERO);
        assert_eq!(Quantity::from_units(2).non_negative(), Quantity::from_units(2));
    }

    #[test]
    fn test_checked_arithmetic() {
        let q = Quantity::from_units(2);
        assert_eq!(q.checked_add(q), Some(Quantity::from_units(4)));
        assert_eq!(q.checked_sub(q), Some(Quantity::ZERO));
        assert_eq!(Quantity::from_hundredths(i64::MAX).checked_add(q), None);
        assert_eq!(Quantity::from_hundredths(i64::MIN).checked_sub(q), None);
        assert_eq!(
            Quantity::from_hundredths(i64::MIN).saturating_sub(q),
            Quantity::from_hundredths(i64::MIN)
        );
    }
}
