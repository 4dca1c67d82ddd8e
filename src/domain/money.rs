use crate::error::{AgencyError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated monetary amount bound to a currency code.
///
/// Amounts are rounded to 2 decimal places on construction (midpoint away
/// from zero) and can never be negative. Arithmetic across different
/// currencies is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Result<Self> {
        let currency = currency.into();
        if amount < Decimal::ZERO {
            return Err(AgencyError::Validation(
                "Amount cannot be negative".to_string(),
            ));
        }
        if currency.trim().is_empty() {
            return Err(AgencyError::Validation("Currency required".to_string()));
        }
        Ok(Self {
            amount: amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            currency,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money> {
        if other.currency != self.currency {
            return Err(AgencyError::Validation("Currency mismatch".to_string()));
        }
        Money::new(self.amount + other.amount, self.currency.clone())
    }

    pub fn subtract(&self, other: &Money) -> Result<Money> {
        if other.currency != self.currency {
            return Err(AgencyError::Validation("Currency mismatch".to_string()));
        }
        let result = self.amount - other.amount;
        if result < Decimal::ZERO {
            return Err(AgencyError::Validation(
                "Resulting amount cannot be negative".to_string(),
            ));
        }
        Money::new(result, self.currency.clone())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounds_midpoint_away_from_zero() {
        let money = Money::new(dec!(10.005), "RUB").unwrap();
        assert_eq!(money.amount(), dec!(10.01));
    }

    #[test]
    fn test_rejects_negative_amount() {
        assert!(matches!(
            Money::new(dec!(-1.0), "RUB"),
            Err(AgencyError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_blank_currency() {
        assert!(matches!(
            Money::new(dec!(1.0), "  "),
            Err(AgencyError::Validation(_))
        ));
    }

    #[test]
    fn test_add_same_currency() {
        let a = Money::new(dec!(10.50), "RUB").unwrap();
        let b = Money::new(dec!(4.50), "RUB").unwrap();
        assert_eq!(a.add(&b).unwrap(), Money::new(dec!(15.00), "RUB").unwrap());
    }

    #[test]
    fn test_add_currency_mismatch() {
        let a = Money::new(dec!(10.0), "RUB").unwrap();
        let b = Money::new(dec!(10.0), "USD").unwrap();
        assert!(matches!(a.add(&b), Err(AgencyError::Validation(_))));
        assert!(matches!(a.subtract(&b), Err(AgencyError::Validation(_))));
    }

    #[test]
    fn test_subtract_negative_result() {
        let a = Money::new(dec!(5.0), "RUB").unwrap();
        let b = Money::new(dec!(10.0), "RUB").unwrap();
        assert!(matches!(a.subtract(&b), Err(AgencyError::Validation(_))));
    }

    #[test]
    fn test_value_equality() {
        let a = Money::new(dec!(10.00), "RUB").unwrap();
        let b = Money::new(dec!(10.0), "RUB").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "10.00 RUB");
    }
}
