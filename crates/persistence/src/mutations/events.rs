// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela_domain::Event;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::convert::{date_to_text, timestamp_to_text};
use crate::diesel_schema::{categories, events};
use crate::error::PersistenceError;

/// Inserts an event and its categories in one transaction.
///
/// # Errors
///
/// Returns an error if the id is taken or the insert fails.
pub fn insert_event(conn: &mut SqliteConnection, event: &Event) -> Result<(), PersistenceError> {
    let start_date: String = date_to_text(event.start_date())?;
    let end_date: String = date_to_text(event.end_date())?;
    let created_at: String = timestamp_to_text(event.created_at())?;
    let updated_at: String = timestamp_to_text(event.updated_at())?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(events::table)
            .values((
                events::id.eq(event.id()),
                events::title.eq(event.title()),
                events::description.eq(event.description()),
                events::start_date.eq(&start_date),
                events::end_date.eq(&end_date),
                events::location.eq(event.location()),
                events::visible.eq(i32::from(event.is_visible())),
                events::status.eq(event.status().as_str()),
                events::created_at.eq(&created_at),
                events::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        for (position, category) in event.categories().iter().enumerate() {
            let position: i32 = i32::try_from(position).map_err(|_| {
                PersistenceError::SerializationError(String::from("too many categories"))
            })?;
            diesel::insert_into(categories::table)
                .values((
                    categories::event_id.eq(event.id()),
                    categories::category_id.eq(category.id()),
                    categories::name.eq(category.name()),
                    categories::price_cents.eq(category.price().cents()),
                    categories::position.eq(position),
                ))
                .execute(conn)?;
        }
        Ok(())
    })?;

    debug!(event_id = %event.id(), "Event inserted");
    Ok(())
}

/// Writes an event's mutable columns. Categories are fixed once created.
///
/// # Errors
///
/// Returns `NotFound` if no such event exists.
pub fn update_event(conn: &mut SqliteConnection, event: &Event) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(events::table)
        .filter(events::id.eq(event.id()))
        .set((
            events::title.eq(event.title()),
            events::description.eq(event.description()),
            events::location.eq(event.location()),
            events::visible.eq(i32::from(event.is_visible())),
            events::status.eq(event.status().as_str()),
            events::updated_at.eq(timestamp_to_text(event.updated_at())?),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("event {}", event.id())));
    }
    Ok(())
}
