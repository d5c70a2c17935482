//! Monetary amounts and the currencies the store can charge in.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies the payment gateway can be asked to charge in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    AUD,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// ISO 4217 code in the lowercase form payment processors expect.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::AUD => "aud",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::AUD => "A$",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
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
        match s.trim().to_uppercase().as_str() {
            "AUD" => Ok(Currency::AUD),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            other => Err(DomainError::ValidationError(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// A non-negative amount of money in minor currency units (cents).
///
/// Stored as an integer to avoid floating-point precision issues. The
/// currency is a store-wide setting, so it is not carried per amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value from minor units.
    pub fn from_minor(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self(amount))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Price of `quantity` units at this unit price.
    pub fn times(&self, quantity: i32) -> Result<Money, DomainError> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::from_minor(1000).unwrap();
        assert_eq!(money.amount(), 1000);
    }

    #[test]
    fn test_negative_money_fails() {
        let result = Money::from_minor(-100);
        assert!(matches!(result, Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_money_times_quantity() {
        let price = Money::from_minor(899).unwrap();
        assert_eq!(price.times(3).unwrap().amount(), 2697);
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::from_minor(i64::MAX).unwrap();
        assert!(matches!(
            big.checked_add(Money::from_minor(1).unwrap()),
            Err(DomainError::AmountOverflow)
        ));
        assert!(matches!(big.times(2), Err(DomainError::AmountOverflow)));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor(1050).unwrap().to_string(), "10.50");
        assert_eq!(Money::from_minor(5).unwrap().to_string(), "0.05");
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("aud".parse::<Currency>().unwrap(), Currency::AUD);
        assert_eq!(Currency::GBP.code(), "gbp");
        assert!("XYZ".parse::<Currency>().is_err());
    }
}
