// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::{Money, Payment, PaymentParts};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::{parse_column, timestamp_from_text};
use crate::diesel_schema::payments;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PaymentRow {
    id: String,
    event_id: String,
    inscription_id: String,
    external_payment_id: String,
    status: String,
    amount_cents: i64,
    method: String,
    created_at: String,
    updated_at: String,
}

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, PersistenceError> {
        Ok(Payment::from_parts(PaymentParts {
            status: parse_column("payments.status", &self.status)?,
            method: parse_column("payments.method", &self.method)?,
            amount: Money::from_cents(self.amount_cents)?,
            created_at: timestamp_from_text(&self.created_at)?,
            updated_at: timestamp_from_text(&self.updated_at)?,
            id: self.id,
            event_id: self.event_id,
            inscription_id: self.inscription_id,
            external_payment_id: self.external_payment_id,
        }))
    }
}

/// Finds the most recent payment of an inscription.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_latest_for_inscription(
    conn: &mut SqliteConnection,
    inscription_id: &str,
    event_id: &str,
) -> Result<Option<Payment>, PersistenceError> {
    payments::table
        .filter(payments::inscription_id.eq(inscription_id))
        .filter(payments::event_id.eq(event_id))
        .order((payments::created_at.desc(), payments::id.desc()))
        .select(PaymentRow::as_select())
        .first::<PaymentRow>(conn)
        .optional()?
        .map(PaymentRow::into_domain)
        .transpose()
}

/// Lists the payments of an inscription, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn find_all_for_inscription(
    conn: &mut SqliteConnection,
    inscription_id: &str,
    event_id: &str,
) -> Result<Vec<Payment>, PersistenceError> {
    payments::table
        .filter(payments::inscription_id.eq(inscription_id))
        .filter(payments::event_id.eq(event_id))
        .order((payments::created_at.asc(), payments::id.asc()))
        .select(PaymentRow::as_select())
        .load::<PaymentRow>(conn)?
        .into_iter()
        .map(PaymentRow::into_domain)
        .collect()
}

/// Finds a payment by its gateway charge id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_by_external_id(
    conn: &mut SqliteConnection,
    external_payment_id: &str,
) -> Result<Option<Payment>, PersistenceError> {
    payments::table
        .filter(payments::external_payment_id.eq(external_payment_id))
        .select(PaymentRow::as_select())
        .first::<PaymentRow>(conn)
        .optional()?
        .map(PaymentRow::into_domain)
        .transpose()
}
