// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capela::EventFilter;
use capela_domain::{Category, Event, EventParts, EventStatus, Money, Tz};
use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;

use crate::convert::{date_from_text, parse_column, timestamp_from_text};
use crate::diesel_schema::{categories, events};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct EventRow {
    id: String,
    title: String,
    description: String,
    start_date: String,
    end_date: String,
    location: String,
    visible: i32,
    status: String,
    created_at: String,
    updated_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct CategoryRow {
    category_id: String,
    name: String,
    price_cents: i64,
}

impl CategoryRow {
    fn into_domain(self) -> Result<Category, PersistenceError> {
        let price: Money = Money::from_cents(self.price_cents)?;
        Ok(Category::new(&self.category_id, &self.name, price)?)
    }
}

fn load_categories(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Vec<Category>, PersistenceError> {
    categories::table
        .filter(categories::event_id.eq(event_id))
        .order(categories::position.asc())
        .select(CategoryRow::as_select())
        .load::<CategoryRow>(conn)?
        .into_iter()
        .map(CategoryRow::into_domain)
        .collect()
}

fn assemble(conn: &mut SqliteConnection, row: EventRow) -> Result<Event, PersistenceError> {
    let categories: Vec<Category> = load_categories(conn, &row.id)?;
    let status: EventStatus = parse_column("events.status", &row.status)?;
    Ok(Event::from_parts(EventParts {
        start_date: date_from_text(&row.start_date)?,
        end_date: date_from_text(&row.end_date)?,
        created_at: timestamp_from_text(&row.created_at)?,
        updated_at: timestamp_from_text(&row.updated_at)?,
        id: row.id,
        title: row.title,
        description: row.description,
        location: row.location,
        visible: row.visible != 0,
        status,
        categories,
    })?)
}

/// Finds an event with its categories.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_event(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Option<Event>, PersistenceError> {
    let row: Option<EventRow> = events::table
        .filter(events::id.eq(event_id))
        .select(EventRow::as_select())
        .first::<EventRow>(conn)
        .optional()?;
    row.map(|r| assemble(conn, r)).transpose()
}

/// Lists events by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_events(
    conn: &mut SqliteConnection,
    filter: EventFilter,
) -> Result<Vec<Event>, PersistenceError> {
    let mut query = events::table.select(EventRow::as_select()).into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(events::status.eq(status.as_str()));
    }
    if filter.visible_only {
        query = query
            .filter(events::visible.eq(1))
            .filter(events::status.ne(EventStatus::Draft.as_str()));
    }
    let rows: Vec<EventRow> = query
        .order((events::start_date.asc(), events::id.asc()))
        .limit(i64::from(filter.page.limit))
        .offset(i64::from(filter.page.offset))
        .load::<EventRow>(conn)?;
    rows.into_iter().map(|r| assemble(conn, r)).collect()
}

/// Finds one category of an event.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_category(
    conn: &mut SqliteConnection,
    event_id: &str,
    category_id: &str,
) -> Result<Option<Category>, PersistenceError> {
    categories::table
        .filter(categories::event_id.eq(event_id))
        .filter(categories::category_id.eq(category_id))
        .select(CategoryRow::as_select())
        .first::<CategoryRow>(conn)
        .optional()?
        .map(CategoryRow::into_domain)
        .transpose()
}

/// Lists an event's categories in display order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_categories(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Vec<Category>, PersistenceError> {
    load_categories(conn, event_id)
}

/// Lists open events whose last day is over in `tz`.
///
/// The end-of-day boundary depends on the timezone, so candidates are
/// filtered after loading.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn find_expired_open_events(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
    tz: Tz,
) -> Result<Vec<Event>, PersistenceError> {
    let rows: Vec<EventRow> = events::table
        .filter(events::status.eq(EventStatus::Open.as_str()))
        .order(events::end_date.asc())
        .select(EventRow::as_select())
        .load::<EventRow>(conn)?;

    let mut expired: Vec<Event> = Vec::new();
    for row in rows {
        let event: Event = assemble(conn, row)?;
        if event.has_ended(now, tz)? {
            expired.push(event);
        }
    }
    Ok(expired)
}
