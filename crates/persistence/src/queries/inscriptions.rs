// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela::InscriptionFilter;
use capela_domain::{
    Cpf, Email, GuestData, Inscription, InscriptionParts, InscriptionStatus, Money, PaymentMethod,
    PersonName, Phone, Registrant,
};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::{parse_column, timestamp_from_text};
use crate::diesel_schema::inscriptions;
use crate::error::PersistenceError;

const CANCELLED: &str = "cancelled";

#[derive(Queryable, Selectable)]
#[diesel(table_name = inscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct InscriptionRow {
    id: String,
    event_id: String,
    category_id: String,
    user_id: Option<String>,
    guest_name: Option<String>,
    guest_email: Option<String>,
    guest_phone: Option<String>,
    cpf: Option<String>,
    status: String,
    amount_cents: i64,
    external_payment_id: Option<String>,
    preferred_payment_method: Option<String>,
    confirmed_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl InscriptionRow {
    fn registrant(&self) -> Result<Registrant, PersistenceError> {
        let cpf: Option<Cpf> = self.cpf.as_deref().map(Cpf::parse).transpose()?;
        if let Some(user_id) = &self.user_id {
            return Ok(Registrant::Account {
                user_id: user_id.clone(),
                cpf,
            });
        }

        let missing = |column: &str| {
            PersistenceError::ReconstructionError(format!(
                "guest inscription {} has no {column}",
                self.id
            ))
        };
        Ok(Registrant::Guest(GuestData {
            name: PersonName::parse(self.guest_name.as_deref().ok_or_else(|| missing("name"))?)?,
            email: Email::parse(self.guest_email.as_deref().ok_or_else(|| missing("email"))?)?,
            phone: Phone::parse(self.guest_phone.as_deref().ok_or_else(|| missing("phone"))?)?,
            cpf: cpf.ok_or_else(|| missing("cpf"))?,
        }))
    }

    fn into_domain(self) -> Result<Inscription, PersistenceError> {
        let registrant: Registrant = self.registrant()?;
        let status: InscriptionStatus = parse_column("inscriptions.status", &self.status)?;
        let preferred_payment_method: Option<PaymentMethod> = self
            .preferred_payment_method
            .as_deref()
            .map(|m| parse_column("inscriptions.preferred_payment_method", m))
            .transpose()?;

        Ok(Inscription::from_parts(InscriptionParts {
            amount: Money::from_cents(self.amount_cents)?,
            created_at: timestamp_from_text(&self.created_at)?,
            updated_at: timestamp_from_text(&self.updated_at)?,
            id: self.id,
            event_id: self.event_id,
            category_id: self.category_id,
            registrant,
            status,
            external_payment_id: self.external_payment_id,
            preferred_payment_method,
            confirmed_by: self.confirmed_by,
        }))
    }
}

fn first(
    conn: &mut SqliteConnection,
    query: inscriptions::BoxedQuery<'_, diesel::sqlite::Sqlite>,
) -> Result<Option<Inscription>, PersistenceError> {
    query
        .select(InscriptionRow::as_select())
        .first::<InscriptionRow>(conn)
        .optional()?
        .map(InscriptionRow::into_domain)
        .transpose()
}

/// Finds an inscription, optionally scoped to an event.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_inscription(
    conn: &mut SqliteConnection,
    inscription_id: &str,
    event_id: Option<&str>,
) -> Result<Option<Inscription>, PersistenceError> {
    let mut query = inscriptions::table
        .filter(inscriptions::id.eq(inscription_id.to_string()))
        .into_boxed();
    if let Some(event_id) = event_id {
        query = query.filter(inscriptions::event_id.eq(event_id.to_string()));
    }
    first(conn, query)
}

/// Finds the live inscription of an account in an event.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_active_by_user(
    conn: &mut SqliteConnection,
    event_id: &str,
    user_id: &str,
) -> Result<Option<Inscription>, PersistenceError> {
    let query = inscriptions::table
        .filter(inscriptions::event_id.eq(event_id.to_string()))
        .filter(inscriptions::user_id.eq(user_id.to_string()))
        .filter(inscriptions::status.ne(CANCELLED))
        .into_boxed();
    first(conn, query)
}

/// Finds the live inscription holding a CPF in an event.
///
/// With `guests_only` set, account inscriptions are not considered.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_active_by_cpf(
    conn: &mut SqliteConnection,
    event_id: &str,
    cpf: &Cpf,
    guests_only: bool,
) -> Result<Option<Inscription>, PersistenceError> {
    let mut query = inscriptions::table
        .filter(inscriptions::event_id.eq(event_id.to_string()))
        .filter(inscriptions::cpf.eq(cpf.as_str().to_string()))
        .filter(inscriptions::status.ne(CANCELLED))
        .into_boxed();
    if guests_only {
        query = query.filter(inscriptions::user_id.is_null());
    }
    first(conn, query)
}

/// Lists an event's inscriptions, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_by_event(
    conn: &mut SqliteConnection,
    event_id: &str,
    filter: InscriptionFilter,
) -> Result<Vec<Inscription>, PersistenceError> {
    let mut query = inscriptions::table
        .filter(inscriptions::event_id.eq(event_id.to_string()))
        .into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(inscriptions::status.eq(status.as_str()));
    }
    query
        .order((inscriptions::created_at.asc(), inscriptions::id.asc()))
        .limit(i64::from(filter.page.limit))
        .offset(i64::from(filter.page.offset))
        .select(InscriptionRow::as_select())
        .load::<InscriptionRow>(conn)?
        .into_iter()
        .map(InscriptionRow::into_domain)
        .collect()
}

/// Lists an account's inscriptions, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_by_user(
    conn: &mut SqliteConnection,
    user_id: &str,
    status: Option<InscriptionStatus>,
) -> Result<Vec<Inscription>, PersistenceError> {
    let mut query = inscriptions::table
        .filter(inscriptions::user_id.eq(user_id.to_string()))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(inscriptions::status.eq(status.as_str()));
    }
    query
        .order((inscriptions::created_at.asc(), inscriptions::id.asc()))
        .select(InscriptionRow::as_select())
        .load::<InscriptionRow>(conn)?
        .into_iter()
        .map(InscriptionRow::into_domain)
        .collect()
}
