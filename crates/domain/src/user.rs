// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::cpf::Cpf;
use crate::error::DomainError;
use crate::person::{BirthDate, Email, Gender, PersonName, Phone};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A parishioner managing their own registrations.
    #[default]
    User,
    /// Parish staff. May confirm and cancel any registration.
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity provider subject. Never changes.
    pub id: String,
    /// Login email, unique across accounts.
    pub email: Email,
    pub name: PersonName,
    /// Unique across accounts when present.
    pub cpf: Option<Cpf>,
    pub phone: Option<Phone>,
    pub birth_date: Option<BirthDate>,
    pub gender: Option<Gender>,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new account with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegistrant` if `id` is blank.
    pub fn register(
        id: &str,
        email: Email,
        name: PersonName,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidRegistrant(String::from(
                "account id cannot be empty",
            )));
        }
        Ok(Self {
            id: id.to_string(),
            email,
            name,
            cpf: None,
            phone: None,
            birth_date: None,
            gender: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Applies a profile edit. Absent fields are left unchanged.
    pub fn apply_profile(&mut self, update: ProfileUpdate, now: OffsetDateTime) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(cpf) = update.cpf {
            self.cpf = Some(cpf);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        self.updated_at = now;
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<PersonName>,
    pub cpf: Option<Cpf>,
    pub phone: Option<Phone>,
    pub birth_date: Option<BirthDate>,
    pub gender: Option<Gender>,
}
