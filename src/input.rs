//! Conversion boundary for amounts coming from JSON-serialized on-chain data.
//!
//! Reserve resources and indexer responses carry amounts either as decimal strings
//! or as plain JSON numbers. Everything is normalized to [`Decimal`] here, before it
//! reaches the math. Unparseable text, NaN and infinities are rejected so they can
//! never leak into a health-factor comparison.

use crate::types::{Amount, Price, Usd};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    pub fn to_decimal(&self) -> Result<Decimal, InputError> {
        match self {
            NumericInput::Number(n) => decimal_from_f64(*n),
            NumericInput::Text(s) => decimal_from_str(s),
        }
    }

    pub fn to_non_negative(&self) -> Result<Decimal, InputError> {
        let value = self.to_decimal()?;
        if value < Decimal::ZERO {
            return Err(InputError::Negative { value });
        }
        Ok(value)
    }

    pub fn to_usd(&self) -> Result<Usd, InputError> {
        self.to_decimal().and_then(Usd::try_from)
    }

    pub fn to_amount(&self) -> Result<Amount, InputError> {
        self.to_decimal().and_then(Amount::try_from)
    }

    pub fn to_price(&self) -> Result<Price, InputError> {
        self.to_decimal().and_then(Price::try_from)
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        NumericInput::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        NumericInput::Text(s.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(s: String) -> Self {
        NumericInput::Text(s)
    }
}

/// Parses a non-negative USD amount such as `"1250.75"` or `"1.5e3"`.
pub fn parse_amount(s: &str) -> Result<Usd, InputError> {
    decimal_from_str(s).and_then(Usd::try_from)
}

fn decimal_from_str(s: &str) -> Result<Decimal, InputError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(InputError::Unparseable {
            input: s.to_string(),
        });
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| InputError::Unparseable {
            input: s.to_string(),
        })
}

fn decimal_from_f64(n: f64) -> Result<Decimal, InputError> {
    if !n.is_finite() {
        return Err(InputError::NonFinite);
    }
    Decimal::from_f64(n).ok_or(InputError::Unparseable {
        input: n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Cannot parse {input:?} as a decimal amount")]
    Unparseable { input: String },

    #[error("Amount is NaN or infinite")]
    NonFinite,

    #[error("Amount {value} is negative")]
    Negative { value: Decimal },

    #[error("Price {value} must be positive")]
    NonPositivePrice { value: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_amount("1250.75").unwrap().value(), dec!(1250.75));
        assert_eq!(parse_amount("  42 ").unwrap().value(), dec!(42));
        assert_eq!(parse_amount("1.5e3").unwrap().value(), dec!(1500));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_amount("abc"),
            Err(InputError::Unparseable { .. })
        ));
        assert!(matches!(parse_amount(""), Err(InputError::Unparseable { .. })));
        assert!(matches!(
            parse_amount("NaN"),
            Err(InputError::Unparseable { .. })
        ));
    }

    #[test]
    fn rejects_negative() {
        assert_eq!(
            parse_amount("-5"),
            Err(InputError::Negative { value: dec!(-5) })
        );
        // signed inputs are fine when the caller asks for a plain decimal
        assert_eq!(NumericInput::from("-5").to_decimal().unwrap(), dec!(-5));
    }

    #[test]
    fn numbers_reject_non_finite() {
        assert_eq!(
            NumericInput::from(f64::NAN).to_decimal(),
            Err(InputError::NonFinite)
        );
        assert_eq!(
            NumericInput::from(f64::INFINITY).to_decimal(),
            Err(InputError::NonFinite)
        );
        assert_eq!(NumericInput::from(0.5).to_decimal().unwrap(), dec!(0.5));
    }

    #[test]
    fn deserializes_both_json_shapes() {
        let values: Vec<NumericInput> = serde_json::from_str(r#"[12.5, "7.25"]"#).unwrap();
        assert_eq!(values[0].to_decimal().unwrap(), dec!(12.5));
        assert_eq!(values[1].to_decimal().unwrap(), dec!(7.25));
    }

    #[test]
    fn typed_conversions() {
        assert_eq!(NumericInput::from("150").to_amount().unwrap().value(), dec!(150));
        assert_eq!(
            NumericInput::from(-2.5).to_amount(),
            Err(InputError::Negative { value: dec!(-2.5) })
        );
        assert_eq!(NumericInput::from("8.50").to_price().unwrap().value(), dec!(8.50));
        assert_eq!(
            NumericInput::from("0").to_price(),
            Err(InputError::NonPositivePrice { value: dec!(0) })
        );
    }
}
