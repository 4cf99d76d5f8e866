//! Amount type for monetary values typed by the user.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may include a leading currency symbol and thousands separators.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Symbols that may prefix an amount as typed, e.g. `$1,500` or `€20`.
const CURRENCY_SYMBOLS: &[char] = &['$', '€'];

/// Represents a monetary amount, independent of currency.
///
/// Amounts are written to the backend as JSON numbers and can be read back from either numbers
/// or strings.
///
/// ```
/// # use pocketbook::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$12,500.50").unwrap();
/// assert_eq!(amount.to_string(), "12500.50");
/// assert!(amount.is_positive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    /// The value as a float, for formatting and for the JSON wire format.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // An empty input field means nothing has been entered yet
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let without_symbol = unsigned.trim_start_matches(CURRENCY_SYMBOLS);
        let without_commas = without_symbol.replace(',', "");

        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        Decimal::from_f64(v)
            .map(Amount::new)
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_with_symbol_and_commas() {
        assert_eq!(Amount::from_str("$1,234,567.89").unwrap().value(), dec("1234567.89"));
        assert_eq!(Amount::from_str("€20").unwrap().value(), dec("20"));
        assert_eq!(Amount::from_str("-$60,000").unwrap().value(), dec("-60000"));
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert!(Amount::from_str("").unwrap().is_zero());
        assert!(Amount::from_str("   ").unwrap().is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("1.2.3").is_err());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Amount::from_str("0.01").unwrap().is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
        assert!(Amount::from_str("-3").unwrap().is_negative());
        assert!(!Amount::from_str("-3").unwrap().is_positive());
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_str("12.5").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "12.5");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("12500").unwrap();
        assert_eq!(a.value(), dec("12500"));
        let b: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(b.value(), dec("19.99"));
        let c: Amount = serde_json::from_str("\"1,000.50\"").unwrap();
        assert_eq!(c.value(), dec("1000.50"));
    }

    #[test]
    fn test_ordering() {
        let a1 = Amount::from_str("30").unwrap();
        let a2 = Amount::from_str("50").unwrap();
        assert!(a1 < a2);
    }
}
