//! Money normalization used by every allocation computation.
//!
//! Amounts entered on a split form may be numbers, numeric text, or nothing at all.
//! [`Amount`] keeps the "not entered yet" state distinct for display while every sum
//! treats it as zero. [`round2`] is applied to each money value the engine emits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Rounds to two decimal places, half-up on the scaled value.
///
/// Non-finite input normalizes to `0.0` so a half-typed form never poisons a sum.
#[must_use]
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = ((value * 100.0) + 0.5).floor() / 100.0;
    // -0.0 would render as "-0.00"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A possibly-empty money amount as entered on a form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Amount(Option<f64>);

impl Amount {
    /// The "not entered" amount.
    pub const EMPTY: Self = Self(None);

    /// Wraps a number; non-finite values are treated as not entered.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(Some(value))
        } else {
            Self::EMPTY
        }
    }

    /// Parses form input. Blank or non-numeric text yields [`Amount::EMPTY`].
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::EMPTY;
        }
        trimmed.parse::<f64>().map_or(Self::EMPTY, Self::new)
    }

    /// Whether nothing has been entered.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.is_none()
    }

    /// The entered number, if any.
    #[must_use]
    pub const fn get(self) -> Option<f64> {
        self.0
    }

    /// The numeric value, with "not entered" counted as zero.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Option<f64>> for Amount {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::EMPTY, Self::new)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => Ok(()),
        }
    }
}

// Stored records keep the form's shape: an entered amount is a JSON number,
// an empty one is "".
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(""),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<RawAmount>::deserialize(deserializer)? {
            Some(RawAmount::Number(value)) => Self::new(value),
            Some(RawAmount::Text(text)) => Self::parse(&text),
            None => Self::EMPTY,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(-0.001), 0.0);
    }

    #[test]
    fn test_round2_non_finite_is_zero() {
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::parse(" 120.5 ").get(), Some(120.5));
        assert!(Amount::parse("").is_empty());
        assert!(Amount::parse("   ").is_empty());
        assert!(Amount::parse("abc").is_empty());
        assert_eq!(Amount::parse("abc").value(), 0.0);
    }

    #[test]
    fn test_amount_serde_matches_form_shape() {
        let entered: Amount = serde_json::from_str("150").unwrap();
        let text: Amount = serde_json::from_str("\"75\"").unwrap();
        let blank: Amount = serde_json::from_str("\"\"").unwrap();
        let null: Amount = serde_json::from_str("null").unwrap();

        assert_eq!(entered.get(), Some(150.0));
        assert_eq!(text.get(), Some(75.0));
        assert!(blank.is_empty());
        assert!(null.is_empty());

        assert_eq!(serde_json::to_string(&entered).unwrap(), "150.0");
        assert_eq!(serde_json::to_string(&blank).unwrap(), "\"\"");
    }
}
