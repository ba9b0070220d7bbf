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
//! │    3 × 19.99 = 59.96999999999999  ❌ WRONG!                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3 × 1999 cents = 5997 cents = 59.97                                  │
//! │                                                                         │
//! │  Decimal input ("19.99", 19.99) is parsed digit by digit straight into │
//! │  cents, so no float ever touches an amount that gets stored.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::parse_decimal("19.99").unwrap();
//! assert_eq!(price.cents(), 1999);
//!
//! let total = price.multiply_quantity(3);
//! assert_eq!(total.to_string(), "59.97");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents / paise).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  request.unit_price ──► SaleRecord.unit_price_cents                     │
/// │                              │                                          │
/// │                              ▼  × quantity                              │
/// │                         SaleRecord.total_cents ──► LedgerEntry.total    │
/// │                              │                                          │
/// │                              ▼  Σ                                       │
/// │                         SaleStats.total_revenue ──► Overview.net_profit │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10000);
    /// assert_eq!(unit_price.multiply_quantity(5).cents(), 50000);
    /// ```
    ///
    /// Callers pass amounts already bounded by validation; use
    /// [`Money::checked_multiply_quantity`] otherwise.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity; `None` if the product leaves the
    /// i64 cents range.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Divides into `parts` equal shares, rounding half away from zero.
    ///
    /// Returns zero when `parts` is zero, which is what an average over an
    /// empty set should show.
    pub fn divide_rounded(&self, parts: i64) -> Money {
        if parts == 0 {
            return Money::zero();
        }

        let numerator = self.0 as i128 * 2;
        let denominator = parts as i128 * 2;
        let half = parts as i128;
        let rounded = if (numerator < 0) != (denominator < 0) {
            (numerator - half) / denominator
        } else {
            (numerator + half) / denominator
        };
        Money(rounded as i64)
    }

    /// Returns the value in major units as a float.
    ///
    /// ## Note
    /// For JSON output only. Never feed the result back into arithmetic.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a decimal amount ("12", "12.5", "-3.25", "+0.99") into cents.
    ///
    /// ## Rules
    /// - Optional sign, at least one digit
    /// - At most two fractional digits (no silent rounding of prices)
    /// - No exponents, separators or currency symbols
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.5").unwrap().cents(), 1250);
    /// assert!(Money::parse_decimal("12.505").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ParseMoneyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, body) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseMoneyError::InvalidCharacter);
        }
        if fraction.len() > 2 {
            return Err(ParseMoneyError::TooManyDecimals);
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add((digit - b'0') as i64))
                .ok_or(ParseMoneyError::Overflow)?;
        }
        cents = cents.checked_mul(100).ok_or(ParseMoneyError::Overflow)?;

        let mut scale = 10;
        for digit in fraction.bytes() {
            cents = cents
                .checked_add((digit - b'0') as i64 * scale)
                .ok_or(ParseMoneyError::Overflow)?;
            scale /= 10;
        }

        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Errors from [`Money::parse_decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must be a plain decimal number")]
    InvalidCharacter,
    #[error("amount has more than 2 decimal places")]
    TooManyDecimals,
    #[error("amount is too large")]
    Overflow,
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering ("59.97", "-5.50"), no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Arithmetic saturates at the i64 cents bounds. Report totals are sums
// over unbounded row counts and must not panic or wrap.

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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Decimal Input
// =============================================================================

/// A decimal amount exactly as the client sent it.
///
/// Accepts a JSON number (`19.99`) or a numeric string (`"19.99"`) and
/// keeps its textual form, so validation can parse it into cents without a
/// float round trip deciding the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalInput(String);

impl DecimalInput {
    pub fn new(text: impl Into<String>) -> Self {
        DecimalInput(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses into money. See [`Money::parse_decimal`].
    pub fn to_money(&self) -> Result<Money, ParseMoneyError> {
        Money::parse_decimal(&self.0)
    }
}

impl<'de> Deserialize<'de> for DecimalInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl<'de> Visitor<'de> for DecimalVisitor {
            type Value = DecimalInput;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            // f64 Display is the shortest string that round-trips, which is
            // the literal the client typed for any amount with few decimals.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if !v.is_finite() {
                    return Err(E::custom("amount must be finite"));
                }
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(DecimalInput(v))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
