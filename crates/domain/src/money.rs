// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monetary amounts in Brazilian Real.
//!
//! Amounts are held as integer centavos. Floating point never enters the
//! type; decimal input from the payment gateway is parsed textually.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// A non-negative amount of money in centavos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money {
    cents: i64,
}

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self { cents: 0 };

    /// Creates an amount from integer centavos.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMoney` if `cents` is negative.
    pub fn from_cents(cents: i64) -> Result<Self, DomainError> {
        if cents < 0 {
            return Err(DomainError::InvalidMoney {
                reason: format!("amount must not be negative, got {cents} cents"),
            });
        }
        Ok(Self { cents })
    }

    /// Parses a decimal amount in reais such as `"180"`, `"180.5"` or `"180.50"`.
    ///
    /// Trailing zeros past the second fractional digit are tolerated; any other
    /// sub-centavo precision is rejected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMoney` if the input is empty, negative,
    /// not a decimal number, or carries a fraction of a centavo.
    pub fn parse_decimal(input: &str) -> Result<Self, DomainError> {
        let trimmed: &str = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidMoney {
                reason: String::from("amount is empty"),
            });
        }
        if trimmed.starts_with('-') {
            return Err(DomainError::InvalidMoney {
                reason: format!("amount must not be negative, got '{trimmed}'"),
            });
        }

        let (whole, fraction): (&str, &str) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let fraction: &str = if fraction.len() > 2 {
            let (kept, rest) = fraction.split_at(2);
            if rest.chars().any(|c| c != '0') {
                return Err(DomainError::InvalidMoney {
                    reason: format!("'{trimmed}' is not a whole number of centavos"),
                });
            }
            kept
        } else {
            fraction
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidMoney {
                reason: format!("'{trimmed}' is not a decimal amount"),
            });
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidMoney {
                reason: format!("'{trimmed}' is not a decimal amount"),
            });
        }

        let reais: i64 = whole.parse().map_err(|_| DomainError::MoneyOverflow {
            operation: "parse",
        })?;
        let centavos: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let cents: i64 = reais
            .checked_mul(100)
            .and_then(|c| c.checked_add(centavos))
            .ok_or(DomainError::MoneyOverflow { operation: "parse" })?;
        Self::from_cents(cents)
    }

    /// Returns the amount in centavos.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MoneyOverflow` if the sum does not fit.
    pub fn add(self, other: Self) -> Result<Self, DomainError> {
        self.cents
            .checked_add(other.cents)
            .map(|cents| Self { cents })
            .ok_or(DomainError::MoneyOverflow { operation: "add" })
    }

    /// Subtracts `other` from this amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MoneyUnderflow` if the result would be negative.
    pub const fn subtract(self, other: Self) -> Result<Self, DomainError> {
        if other.cents > self.cents {
            return Err(DomainError::MoneyUnderflow {
                minuend: self.cents,
                subtrahend: other.cents,
            });
        }
        Ok(Self {
            cents: self.cents - other.cents,
        })
    }

    /// Multiplies the amount by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MoneyOverflow` if the product does not fit.
    pub fn multiply(self, quantity: u32) -> Result<Self, DomainError> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(|cents| Self { cents })
            .ok_or(DomainError::MoneyOverflow {
                operation: "multiply",
            })
    }

    /// Renders the amount as a plain decimal string in reais (`"180.00"`).
    ///
    /// This is the representation the payment gateway expects.
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:02}", self.cents / 100, self.cents % 100)
    }

    /// Renders the amount for display (`"R$ 1.234,56"`).
    #[must_use]
    pub fn formatted(&self) -> String {
        let reais: String = (self.cents / 100).to_string();
        let mut grouped: String = String::with_capacity(reais.len() + reais.len() / 3);
        for (index, digit) in reais.chars().enumerate() {
            if index > 0 && (reais.len() - index) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }
        format!("R$ {grouped},{:02}", self.cents % 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.cents
    }
}
