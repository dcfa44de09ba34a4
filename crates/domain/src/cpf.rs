// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The Brazilian individual taxpayer identifier (CPF).

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of digits in a CPF.
const CPF_LENGTH: usize = 11;

/// A validated CPF, stored as its 11 raw digits.
///
/// Formatting punctuation (`.`, `-`, spaces) is accepted on input and
/// discarded. Two CPFs are equal when their digits are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf {
    digits: String,
}

impl Cpf {
    /// Parses and validates a CPF.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCpf` if the input contains characters
    /// other than digits and punctuation, does not have exactly 11 digits,
    /// repeats a single digit, or fails either check digit.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut digits: Vec<u32> = Vec::with_capacity(CPF_LENGTH);
        for c in input.trim().chars() {
            match c {
                '.' | '-' | ' ' => {}
                _ => {
                    let digit: u32 = c.to_digit(10).ok_or_else(|| {
                        DomainError::InvalidCpf(format!("unexpected character '{c}'"))
                    })?;
                    digits.push(digit);
                }
            }
        }

        if digits.len() != CPF_LENGTH {
            return Err(DomainError::InvalidCpf(format!(
                "expected {CPF_LENGTH} digits, found {}",
                digits.len()
            )));
        }

        if digits.iter().all(|d| *d == digits[0]) {
            return Err(DomainError::InvalidCpf(String::from(
                "all digits are identical",
            )));
        }

        if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
            return Err(DomainError::InvalidCpf(String::from(
                "check digits do not match",
            )));
        }

        Ok(Self {
            digits: digits
                .iter()
                .filter_map(|d| char::from_digit(*d, 10))
                .collect(),
        })
    }

    /// Returns the raw 11 digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Returns the conventional presentation, e.g. `529.982.247-25`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.digits[0..3],
            &self.digits[3..6],
            &self.digits[6..9],
            &self.digits[9..11]
        )
    }
}

/// Computes one CPF check digit over `digits`.
///
/// Weights run from `digits.len() + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .zip(2_u32..)
        .map(|(digit, weight)| digit * weight)
        .sum();
    (sum * 10) % 11 % 10
}

impl std::fmt::Display for Cpf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl FromStr for Cpf {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.digits
    }
}
