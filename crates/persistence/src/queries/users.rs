// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::{BirthDate, Cpf, Email, PersonName, Phone, User};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::{date_from_text, parse_column, timestamp_from_text};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserRow {
    id: String,
    email: String,
    name: String,
    cpf: Option<String>,
    phone: Option<String>,
    birth_date: Option<String>,
    gender: Option<String>,
    role: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn into_domain(self) -> Result<User, PersistenceError> {
        Ok(User {
            email: Email::parse(&self.email)?,
            name: PersonName::parse(&self.name)?,
            cpf: self.cpf.as_deref().map(Cpf::parse).transpose()?,
            phone: self.phone.as_deref().map(Phone::parse).transpose()?,
            birth_date: self
                .birth_date
                .as_deref()
                .map(|d| date_from_text(d).map(BirthDate::from_stored))
                .transpose()?,
            gender: self
                .gender
                .as_deref()
                .map(|g| parse_column("users.gender", g))
                .transpose()?,
            role: parse_column("users.role", &self.role)?,
            created_at: timestamp_from_text(&self.created_at)?,
            updated_at: timestamp_from_text(&self.updated_at)?,
            id: self.id,
        })
    }
}

fn first(
    conn: &mut SqliteConnection,
    query: users::BoxedQuery<'_, diesel::sqlite::Sqlite>,
) -> Result<Option<User>, PersistenceError> {
    query
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .optional()?
        .map(UserRow::into_domain)
        .transpose()
}

/// Finds an account by identity provider subject.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>, PersistenceError> {
    first(conn, users::table.filter(users::id.eq(user_id.to_string())).into_boxed())
}

/// Finds an account by its (normalized) email.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_user_by_email(
    conn: &mut SqliteConnection,
    email: &Email,
) -> Result<Option<User>, PersistenceError> {
    first(
        conn,
        users::table
            .filter(users::email.eq(email.as_str().to_string()))
            .into_boxed(),
    )
}

/// Finds the account holding a CPF.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_user_by_cpf(
    conn: &mut SqliteConnection,
    cpf: &Cpf,
) -> Result<Option<User>, PersistenceError> {
    first(
        conn,
        users::table
            .filter(users::cpf.eq(cpf.as_str().to_string()))
            .into_boxed(),
    )
}
