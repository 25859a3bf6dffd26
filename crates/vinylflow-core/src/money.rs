//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, line total and sale total is an i64 cent count.        │
//! │    The CSV bridge converts to/from decimal strings at the boundary.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vinylflow_core::money::Money;
//!
//! let price = Money::from_cents(2500); // $25.00
//! let line_total = price.multiply_quantity(2);
//! assert_eq!(line_total.cents(), 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: totals and corrections can go either way
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support; serializes as a bare cent count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vinylflow_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vinylflow_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500); // $25.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 5000); // $50.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a decimal string (`"25.00"`, `"9.5"`, `"12"`) into Money.
    ///
    /// Accepts at most two fractional digits. Used by the CSV bridge,
    /// where prices travel as decimal text.
    ///
    /// ## Example
    /// ```rust
    /// use vinylflow_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("25.00").unwrap().cents(), 2500);
    /// assert_eq!(Money::from_decimal_str("9.5").unwrap().cents(), 950);
    /// assert_eq!(Money::from_decimal_str("12").unwrap().cents(), 1200);
    /// assert!(Money::from_decimal_str("abc").is_err());
    /// ```
    pub fn from_decimal_str(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((maj, min)) => (maj, min),
            None => (digits, ""),
        };

        if minor_str.len() > 2 {
            return Err(invalid("more than two fractional digits"));
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str
                .parse()
                .map_err(|_| invalid("not a decimal number"))?
        };

        let minor: i64 = if minor_str.is_empty() {
            0
        } else {
            if !minor_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("not a decimal number"));
            }
            // "5" means 50 cents, "05" means 5 cents
            let parsed: i64 = minor_str
                .parse()
                .map_err(|_| invalid("not a decimal number"))?;
            if minor_str.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };

        let cents = major * 100 + minor;
        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Formats as a plain decimal string without a currency symbol
    /// (`2500` → `"25.00"`). The CSV bridge writes this form.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The UI formats for display itself.
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

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_decimal_parse() {
        assert_eq!(Money::from_decimal_str("25.00").unwrap().cents(), 2500);
        assert_eq!(Money::from_decimal_str("25").unwrap().cents(), 2500);
        assert_eq!(Money::from_decimal_str("9.5").unwrap().cents(), 950);
        assert_eq!(Money::from_decimal_str("9.05").unwrap().cents(), 905);
        assert_eq!(Money::from_decimal_str(".99").unwrap().cents(), 99);
        assert_eq!(Money::from_decimal_str("-5.50").unwrap().cents(), -550);
        assert_eq!(Money::from_decimal_str(" 12.34 ").unwrap().cents(), 1234);

        assert!(Money::from_decimal_str("").is_err());
        assert!(Money::from_decimal_str("abc").is_err());
        assert!(Money::from_decimal_str("1.234").is_err());
        assert!(Money::from_decimal_str("1.x").is_err());
    }

    #[test]
    fn test_decimal_format() {
        assert_eq!(Money::from_cents(2500).to_decimal_string(), "25.00");
        assert_eq!(Money::from_cents(905).to_decimal_string(), "9.05");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
    }

    #[test]
    fn test_decimal_round_trip() {
        for cents in [0, 1, 99, 100, 101, 2500, 123456] {
            let m = Money::from_cents(cents);
            assert_eq!(Money::from_decimal_str(&m.to_decimal_string()).unwrap(), m);
        }
    }

    #[test]
    fn test_serializes_as_bare_cents() {
        let json = serde_json::to_string(&Money::from_cents(2500)).unwrap();
        assert_eq!(json, "2500");
    }
}
