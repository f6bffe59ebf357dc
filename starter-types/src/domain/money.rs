//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies accepted by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    #[default]
    INR,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::USD | Currency::EUR | Currency::GBP | Currency::INR => 2,
        }
    }

    /// Number of minor units (cents, paise) in one major unit.
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "INR" => Ok(Currency::INR),
            other => Err(DomainError::UnsupportedCurrency(other.to_string())),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// Amount is stored in the smallest unit of the currency (cents, paise, etc.)
/// to avoid floating-point precision issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Converts a major-unit amount (e.g. rupees) to minor units, rounding to
    /// the nearest minor unit.
    ///
    /// The amount must be finite and at least one major unit.
    pub fn from_major(amount: f64, currency: Currency) -> Result<Self, DomainError> {
        if !amount.is_finite() || amount < 1.0 {
            return Err(DomainError::InvalidAmount);
        }

        let minor = (amount * currency.minor_per_major() as f64).round();
        if minor > i64::MAX as f64 {
            return Err(DomainError::InvalidAmount);
        }

        Ok(Self {
            amount: minor as i64,
            currency,
        })
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::new(1000, Currency::INR).unwrap();
        assert_eq!(money.amount(), 1000);
        assert_eq!(money.currency(), Currency::INR);
    }

    #[test]
    fn test_negative_money_fails() {
        let result = Money::new(-100, Currency::USD);
        assert!(matches!(result, Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_from_major_converts_to_paise() {
        let money = Money::from_major(100.0, Currency::INR).unwrap();
        assert_eq!(money.amount(), 10000);
    }

    #[test]
    fn test_from_major_rounds_fractional_paise() {
        assert_eq!(Money::from_major(1.005, Currency::INR).unwrap().amount(), 100);
        assert_eq!(Money::from_major(19.99, Currency::INR).unwrap().amount(), 1999);
    }

    #[test]
    fn test_from_major_rejects_below_one_unit() {
        for amount in [0.0, -5.0, 0.99, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Money::from_major(amount, Currency::INR),
                Err(DomainError::InvalidAmount)
            ));
        }
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("inr".parse::<Currency>().unwrap(), Currency::INR);
        assert!(matches!(
            "JPY".parse::<Currency>(),
            Err(DomainError::UnsupportedCurrency(_))
        ));
    }
}
