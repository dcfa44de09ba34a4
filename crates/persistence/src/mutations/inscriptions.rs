// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::{GuestData, Inscription, PaymentMethod};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::timestamp_to_text;
use crate::diesel_schema::inscriptions;
use crate::error::PersistenceError;

/// Inserts a new inscription.
///
/// # Errors
///
/// Returns `UniqueViolation` if the account or CPF already holds a live
/// inscription for the event.
pub fn insert_inscription(
    conn: &mut SqliteConnection,
    inscription: &Inscription,
) -> Result<(), PersistenceError> {
    let registrant = inscription.registrant();
    let guest: Option<&GuestData> = registrant.guest();

    diesel::insert_into(inscriptions::table)
        .values((
            inscriptions::id.eq(inscription.id()),
            inscriptions::event_id.eq(inscription.event_id()),
            inscriptions::category_id.eq(inscription.category_id()),
            inscriptions::user_id.eq(registrant.user_id()),
            inscriptions::guest_name.eq(guest.map(|g| g.name.as_str())),
            inscriptions::guest_email.eq(guest.map(|g| g.email.as_str())),
            inscriptions::guest_phone.eq(guest.map(|g| g.phone.as_str())),
            inscriptions::cpf.eq(registrant.cpf().map(|c| c.as_str())),
            inscriptions::status.eq(inscription.status().as_str()),
            inscriptions::amount_cents.eq(inscription.amount().cents()),
            inscriptions::external_payment_id.eq(inscription.external_payment_id()),
            inscriptions::preferred_payment_method
                .eq(inscription.preferred_payment_method().map(|m| m.as_str())),
            inscriptions::confirmed_by.eq(inscription.confirmed_by()),
            inscriptions::created_at.eq(timestamp_to_text(inscription.created_at())?),
            inscriptions::updated_at.eq(timestamp_to_text(inscription.updated_at())?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes the status and payment columns of an inscription.
///
/// # Errors
///
/// Returns `NotFound` if no such inscription exists.
pub fn update_inscription(
    conn: &mut SqliteConnection,
    inscription: &Inscription,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(inscriptions::table)
        .filter(inscriptions::id.eq(inscription.id()))
        .set((
            inscriptions::status.eq(inscription.status().as_str()),
            inscriptions::external_payment_id.eq(inscription.external_payment_id()),
            inscriptions::preferred_payment_method.eq(inscription
                .preferred_payment_method()
                .map(|m: PaymentMethod| m.as_str())),
            inscriptions::confirmed_by.eq(inscription.confirmed_by()),
            inscriptions::updated_at.eq(timestamp_to_text(inscription.updated_at())?),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "inscription {}",
            inscription.id()
        )));
    }
    Ok(())
}
