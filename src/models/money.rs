//! Defines the `Amount` type used for all monetary values.
//!
//! Amounts are fixed-point decimals held at two fraction digits and
//! serialized as strings (e.g. `"41.00"`), so totals survive any number of
//! add/subtract cycles without binary floating-point drift.

use std::{
    fmt::Display,
    ops::{Add, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// A monetary value with exactly two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount, `"0.00"`.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount from a decimal, rounding half-away-from-zero to two
    /// fraction digits.
    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);

        Self(rounded)
    }

    /// Parse an amount from its decimal string form, e.g. `"41"` or `"41.00"`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `text` is not a decimal number.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Decimal::from_str(text.trim())
            .map(Self::new)
            .map_err(|_| Error::InvalidAmount(text.to_string()))
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Multiply the amount by a plain fraction, e.g. a budget target of `0.075`.
    pub fn scale_by(&self, fraction: Decimal) -> Self {
        Self::new(self.0 * fraction)
    }

    /// Round to the nearest whole unit, keeping the two-digit rendering.
    pub fn rounded_whole(&self) -> Self {
        Self::new(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.0 - rhs.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut value = self.0;
        value.rescale(2);
        write!(f, "{value}")
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts both string (`"41.00"`) and bare number (`41`) forms, since
    /// API clients historically sent either.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;

        let text = match &value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Number(number) => number.to_string(),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a decimal string or number, got {other}"
                )));
            }
        };

        Amount::parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod amount_tests {
    use rust_decimal_macros::dec;

    use super::Amount;
    use crate::Error;

    #[test]
    fn parse_pads_to_two_fraction_digits() {
        let amount = Amount::parse("41").unwrap();

        assert_eq!(amount.to_string(), "41.00");
    }

    #[test]
    fn parse_round_trips_exact_values() {
        let amount = Amount::parse("41.00").unwrap();

        assert_eq!(amount.to_string(), "41.00");
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = Amount::parse("forty-one");

        assert_eq!(result, Err(Error::InvalidAmount("forty-one".to_string())));
    }

    #[test]
    fn addition_has_no_binary_drift() {
        // 0.1 + 0.2 is the classic binary float failure case.
        let sum = Amount::parse("0.10").unwrap() + Amount::parse("0.20").unwrap();

        assert_eq!(sum.to_string(), "0.30");
    }

    #[test]
    fn subtraction_can_go_negative() {
        let difference = Amount::parse("10.00").unwrap() - Amount::parse("12.50").unwrap();

        assert_eq!(difference.to_string(), "-2.50");
        assert!(difference.is_negative());
    }

    #[test]
    fn scale_by_keeps_two_digits() {
        let funds = Amount::parse("1000.00").unwrap().scale_by(dec!(0.075));

        assert_eq!(funds.to_string(), "75.00");
    }

    #[test]
    fn rounded_whole_rounds_half_up() {
        assert_eq!(
            Amount::parse("20.50").unwrap().rounded_whole().to_string(),
            "21.00"
        );
        assert_eq!(
            Amount::parse("20.49").unwrap().rounded_whole().to_string(),
            "20.00"
        );
    }

    #[test]
    fn deserializes_from_string_and_number() {
        let from_string: Amount = serde_json::from_str("\"41.00\"").unwrap();
        let from_number: Amount = serde_json::from_str("41").unwrap();

        assert_eq!(from_string, from_number);
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::parse("41").unwrap()).unwrap();

        assert_eq!(json, "\"41.00\"");
    }
}
