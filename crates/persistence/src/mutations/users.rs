// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::User;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::{date_to_text, timestamp_to_text};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

fn birth_date_text(user: &User) -> Result<Option<String>, PersistenceError> {
    user.birth_date
        .as_ref()
        .map(|b| date_to_text(b.date()))
        .transpose()
}

/// Inserts an account.
///
/// # Errors
///
/// Returns `UniqueViolation` if the id, email or CPF is taken.
pub fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::id.eq(&user.id),
            users::email.eq(user.email.as_str()),
            users::name.eq(user.name.as_str()),
            users::cpf.eq(user.cpf.as_ref().map(|c| c.as_str())),
            users::phone.eq(user.phone.as_ref().map(|p| p.as_str())),
            users::birth_date.eq(birth_date_text(user)?),
            users::gender.eq(user.gender.map(|g| g.as_str())),
            users::role.eq(user.role.as_str()),
            users::created_at.eq(timestamp_to_text(user.created_at)?),
            users::updated_at.eq(timestamp_to_text(user.updated_at)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes an account's profile columns.
///
/// # Errors
///
/// Returns `UniqueViolation` if the new CPF is taken and `NotFound` if no
/// such account exists.
pub fn update_user(conn: &mut SqliteConnection, user: &User) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table)
        .filter(users::id.eq(&user.id))
        .set((
            users::email.eq(user.email.as_str()),
            users::name.eq(user.name.as_str()),
            users::cpf.eq(user.cpf.as_ref().map(|c| c.as_str())),
            users::phone.eq(user.phone.as_ref().map(|p| p.as_str())),
            users::birth_date.eq(birth_date_text(user)?),
            users::gender.eq(user.gender.map(|g| g.as_str())),
            users::role.eq(user.role.as_str()),
            users::updated_at.eq(timestamp_to_text(user.updated_at)?),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("user {}", user.id)));
    }
    Ok(())
}
