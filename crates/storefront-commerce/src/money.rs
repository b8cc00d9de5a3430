//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (cents), so
/// line subtotals like 3 × 25.00 come out at exactly 75.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Whether the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Multiply by a quantity, `None` on overflow.
    pub fn try_multiply(&self, quantity: i64) -> Option<Self> {
        Some(Self::new(
            self.amount_cents.checked_mul(quantity)?,
            self.currency,
        ))
    }

    /// Add another amount, `None` on overflow or currency mismatch.
    pub fn try_add(&self, other: &Money) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self::new(
            self.amount_cents.checked_add(other.amount_cents)?,
            self.currency,
        ))
    }

    /// Sum an iterator of amounts in one currency, `None` on overflow
    /// or currency mismatch.
    pub fn try_sum<'a>(amounts: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Self> {
        let mut total = Money::zero(currency);
        for amount in amounts {
            total = total.try_add(amount)?;
        }
        Some(total)
    }

    /// Format as a decimal string, e.g. `"USD 49.99"`.
    pub fn display(&self) -> String {
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        format!("{} {}{}.{:02}", self.currency, sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtotal_is_exact() {
        let unit = Money::new(2500, Currency::USD);
        let subtotal = unit.try_multiply(3).unwrap();
        assert_eq!(subtotal.amount_cents, 7500);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::new(1000, Currency::USD), Money::new(250, Currency::USD)];
        let total = Money::try_sum(amounts.iter(), Currency::USD).unwrap();
        assert_eq!(total.amount_cents, 1250);
    }

    #[test]
    fn test_currency_mismatch() {
        let a = Money::new(100, Currency::USD);
        let b = Money::new(100, Currency::EUR);
        assert!(a.try_add(&b).is_none());
    }

    #[test]
    fn test_overflow_is_checked() {
        let a = Money::new(i64::MAX, Currency::USD);
        assert!(a.try_multiply(2).is_none());
        assert!(a.try_add(&Money::new(1, Currency::USD)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "USD 49.99");
        assert_eq!(Money::new(-50, Currency::EUR).display(), "EUR -0.50");
    }
}
