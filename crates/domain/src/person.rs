// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contact and personal-data value objects.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Month};

const MAX_EMAIL_LENGTH: usize = 254;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 120;

/// A normalized email address.
///
/// Addresses are trimmed and lower-cased so lookups by email are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    value: String,
}

impl Email {
    /// Parses and normalizes an email address.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEmail` if the address is not of the
    /// form `local@domain.tld`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let value: String = input.trim().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::InvalidEmail(String::from(
                "email cannot be empty",
            )));
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(DomainError::InvalidEmail(format!(
                "email exceeds {MAX_EMAIL_LENGTH} characters"
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidEmail(format!(
                "'{value}' contains whitespace"
            )));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::InvalidEmail(format!("'{value}' is missing '@'")));
        };
        if local.is_empty() || domain.contains('@') {
            return Err(DomainError::InvalidEmail(format!(
                "'{value}' is not a valid address"
            )));
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(DomainError::InvalidEmail(format!(
                "'{value}' has an invalid domain"
            )));
        }

        Ok(Self { value })
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.value
    }
}

/// A Brazilian phone number with area code, stored as digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone {
    digits: String,
}

impl Phone {
    /// Parses a phone number, discarding `()`, `-`, `.`, `+55` and spaces.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhone` unless the remaining digits form a
    /// 10-digit landline or 11-digit mobile number with a valid area code.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed: &str = input.trim();
        let without_country: &str = trimmed.strip_prefix("+55").unwrap_or(trimmed);

        let mut digits: String = String::with_capacity(11);
        for c in without_country.chars() {
            match c {
                '(' | ')' | '-' | '.' | ' ' => {}
                d if d.is_ascii_digit() => digits.push(d),
                other => {
                    return Err(DomainError::InvalidPhone(format!(
                        "unexpected character '{other}'"
                    )));
                }
            }
        }

        if digits.len() != 10 && digits.len() != 11 {
            return Err(DomainError::InvalidPhone(format!(
                "expected 10 or 11 digits, found {}",
                digits.len()
            )));
        }
        if digits.starts_with('0') {
            return Err(DomainError::InvalidPhone(String::from(
                "area code cannot start with 0",
            )));
        }

        Ok(Self { digits })
    }

    /// Returns the raw digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Returns the number formatted as `(11) 98765-4321`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (area, number) = self.digits.split_at(2);
        let split: usize = number.len() - 4;
        format!("({area}) {}-{}", &number[..split], &number[split..])
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl TryFrom<String> for Phone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.digits
    }
}

/// A person's full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName {
    value: String,
}

impl PersonName {
    /// Creates a name, trimming and collapsing internal whitespace.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidName` if the normalized name is shorter
    /// than 2 or longer than 120 characters.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let value: String = input.split_whitespace().collect::<Vec<&str>>().join(" ");
        let length: usize = value.chars().count();

        if length < MIN_NAME_LENGTH {
            return Err(DomainError::InvalidName(format!(
                "name must have at least {MIN_NAME_LENGTH} characters"
            )));
        }
        if length > MAX_NAME_LENGTH {
            return Err(DomainError::InvalidName(format!(
                "name must have at most {MAX_NAME_LENGTH} characters"
            )));
        }

        Ok(Self { value })
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for PersonName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PersonName> for String {
    fn from(name: PersonName) -> Self {
        name.value
    }
}

/// A date of birth.
///
/// Validation depends on the current date, so there is no `Deserialize`
/// implementation; parse through [`BirthDate::new`] or [`BirthDate::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct BirthDate {
    date: Date,
}

impl BirthDate {
    /// Validates a birth date against `today`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBirthDate` if the date is in the future
    /// or before 1900-01-01.
    pub fn new(date: Date, today: Date) -> Result<Self, DomainError> {
        if date > today {
            return Err(DomainError::InvalidBirthDate(format!(
                "{date} is in the future"
            )));
        }
        let earliest: Date = Date::from_calendar_date(1900, Month::January, 1).map_err(|e| {
            DomainError::InvalidBirthDate(format!("invalid lower bound: {e}"))
        })?;
        if date < earliest {
            return Err(DomainError::InvalidBirthDate(format!(
                "{date} is before {earliest}"
            )));
        }
        Ok(Self { date })
    }

    /// Parses an ISO 8601 calendar date (`YYYY-MM-DD`) and validates it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBirthDate` if the string is not a date
    /// or the date is out of range.
    pub fn parse(input: &str, today: Date) -> Result<Self, DomainError> {
        let date: Date = Date::parse(input.trim(), &time::format_description::well_known::Iso8601::DATE)
            .map_err(|e| DomainError::InvalidBirthDate(format!("'{input}': {e}")))?;
        Self::new(date, today)
    }

    /// Rebuilds a birth date that was validated when first stored.
    #[must_use]
    pub const fn from_stored(date: Date) -> Self {
        Self { date }
    }

    /// Returns the calendar date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Returns the age in whole years on `on`.
    #[must_use]
    pub fn age_on(&self, on: Date) -> u16 {
        let mut years: i32 = on.year() - self.date.year();
        if (u8::from(on.month()), on.day()) < (u8::from(self.date.month()), self.date.day()) {
            years -= 1;
        }
        u16::try_from(years.max(0)).unwrap_or(0)
    }
}

impl From<BirthDate> for String {
    fn from(birth_date: BirthDate) -> Self {
        birth_date.date.to_string()
    }
}

/// Declared gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Gender {
    /// Returns the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(DomainError::InvalidGender(s.to_string())),
        }
    }
}
