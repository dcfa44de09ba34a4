// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::Payment;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::timestamp_to_text;
use crate::diesel_schema::payments;
use crate::error::PersistenceError;

/// Records a gateway charge.
///
/// # Errors
///
/// Returns `UniqueViolation` if the charge is already recorded.
pub fn insert_payment(conn: &mut SqliteConnection, payment: &Payment) -> Result<(), PersistenceError> {
    diesel::insert_into(payments::table)
        .values((
            payments::id.eq(payment.id()),
            payments::event_id.eq(payment.event_id()),
            payments::inscription_id.eq(payment.inscription_id()),
            payments::external_payment_id.eq(payment.external_payment_id()),
            payments::status.eq(payment.status().as_str()),
            payments::amount_cents.eq(payment.amount().cents()),
            payments::method.eq(payment.method().as_str()),
            payments::created_at.eq(timestamp_to_text(payment.created_at())?),
            payments::updated_at.eq(timestamp_to_text(payment.updated_at())?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes the mirrored status of a charge.
///
/// # Errors
///
/// Returns `NotFound` if no such payment exists.
pub fn update_payment(conn: &mut SqliteConnection, payment: &Payment) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(payments::table)
        .filter(payments::id.eq(payment.id()))
        .set((
            payments::status.eq(payment.status().as_str()),
            payments::updated_at.eq(timestamp_to_text(payment.updated_at())?),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("payment {}", payment.id())));
    }
    Ok(())
}
