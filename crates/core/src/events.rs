// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event lifecycle and listing.

use crate::error::CoreError;
use crate::inscriptions::new_id;
use crate::repository::{EventFilter, Repositories};
use capela_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use capela_domain::{Category, Event, EventParts, EventStatus, Money, Tz};
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing::info;

/// Actor name recorded for the expiry sweep.
pub const CLOSE_EXPIRED_JOB: &str = "close-expired-events";

/// Result of the expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedEvents {
    pub closed_count: usize,
    pub closed_events: Vec<String>,
}

/// A category as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub price: Money,
}

/// An event as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_date: Date,
    pub end_date: Date,
    pub location: String,
    pub visible: bool,
    pub categories: Vec<NewCategory>,
}

/// Closes every open event whose last day is over in the parish timezone.
///
/// Running it again once nothing is left to close is a no-op.
/// Inscriptions are not touched.
///
/// # Errors
///
/// Returns `Repository` if storage fails.
pub async fn close_expired_events(
    repos: &Repositories,
    tz: Tz,
    now: OffsetDateTime,
) -> Result<ClosedEvents, CoreError> {
    let expired: Vec<Event> = repos.events.find_expired_open_events(now, tz).await?;
    let mut closed: ClosedEvents = ClosedEvents::default();

    for mut event in expired {
        let before: EventStatus = event.status();
        event.close(now)?;
        repos.events.update(&event).await?;
        repos
            .record(AuditEvent::for_event(
                event.id().to_string(),
                Actor::system(CLOSE_EXPIRED_JOB),
                Cause::new(
                    String::from(CLOSE_EXPIRED_JOB),
                    format!("End date {} has passed", event.end_date()),
                ),
                Action::new(String::from("CloseEvent"), None),
                StateSnapshot::event(before),
                StateSnapshot::event(event.status()),
                now,
            ))
            .await;
        closed.closed_events.push(event.id().to_string());
    }
    closed.closed_count = closed.closed_events.len();

    info!(
        closed_count = closed.closed_count,
        timezone = %tz,
        "Expired events closed"
    );
    Ok(closed)
}

/// Creates a draft event.
///
/// # Errors
///
/// Returns `DomainViolation` if the event or a category is invalid.
pub async fn create_event(
    repos: &Repositories,
    input: NewEvent,
    created_by: &str,
    now: OffsetDateTime,
) -> Result<Event, CoreError> {
    let categories: Vec<Category> = input
        .categories
        .into_iter()
        .map(|c| {
            let id: String = c.id.unwrap_or_else(new_id);
            Category::new(&id, &c.name, c.price)
        })
        .collect::<Result<_, _>>()?;

    let event: Event = Event::from_parts(EventParts {
        id: new_id(),
        title: input.title,
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
        location: input.location,
        visible: input.visible,
        status: EventStatus::Draft,
        categories,
        created_at: now,
        updated_at: now,
    })?;
    repos.events.save(&event).await?;

    repos
        .record(AuditEvent::for_event(
            event.id().to_string(),
            Actor::admin(created_by),
            Cause::new(event.id().to_string(), String::from("Event created")),
            Action::new(String::from("CreateEvent"), Some(event.title().to_string())),
            StateSnapshot::absent(),
            StateSnapshot::event(event.status()),
            now,
        ))
        .await;

    info!(event_id = %event.id(), title = %event.title(), "Event created");
    Ok(event)
}

/// Opens a draft event for registration.
///
/// # Errors
///
/// Returns `EventNotFound` if absent and `DomainViolation` unless it is a draft.
pub async fn open_event(
    repos: &Repositories,
    event_id: &str,
    opened_by: &str,
    now: OffsetDateTime,
) -> Result<Event, CoreError> {
    let mut event: Event = require_event(repos, event_id).await?;
    let before: EventStatus = event.status();
    event.open(now)?;
    repos.events.update(&event).await?;

    repos
        .record(AuditEvent::for_event(
            event.id().to_string(),
            Actor::admin(opened_by),
            Cause::new(event.id().to_string(), String::from("Registration opened")),
            Action::new(String::from("OpenEvent"), None),
            StateSnapshot::event(before),
            StateSnapshot::event(event.status()),
            now,
        ))
        .await;

    info!(event_id = %event.id(), "Event opened");
    Ok(event)
}

/// Lists events.
///
/// # Errors
///
/// Returns `Repository` if storage fails.
pub async fn list_events(repos: &Repositories, filter: EventFilter) -> Result<Vec<Event>, CoreError> {
    Ok(repos.events.find_all(filter).await?)
}

/// Fetches one event. Hidden and draft events are only returned when
/// `include_hidden` is set.
///
/// # Errors
///
/// Returns `EventNotFound` if absent or not visible to the caller.
pub async fn get_event(
    repos: &Repositories,
    event_id: &str,
    include_hidden: bool,
) -> Result<Event, CoreError> {
    let event: Event = require_event(repos, event_id).await?;
    if !include_hidden && (!event.is_visible() || event.status() == EventStatus::Draft) {
        return Err(CoreError::EventNotFound(event_id.to_string()));
    }
    Ok(event)
}

pub(crate) async fn require_event(repos: &Repositories, event_id: &str) -> Result<Event, CoreError> {
    repos
        .events
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| CoreError::EventNotFound(event_id.to_string()))
}
