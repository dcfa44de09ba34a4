// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Events and their registration categories.
//!
//! An event moves one way through `draft → open → closed`. Registrations
//! are only accepted while it is open.

use crate::error::DomainError;
use crate::money::Money;
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being prepared by administrators. Not visible, not open.
    #[default]
    Draft,
    /// Accepting registrations.
    Open,
    /// No longer accepting registrations.
    Closed,
}

impl EventStatus {
    /// Returns the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Checks if a transition from this status to `target` is valid.
    ///
    /// Valid transitions are:
    /// - Draft → Open
    /// - Open → Closed
    /// - Draft → Closed (abandoned before opening)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Open) | (Self::Open | Self::Draft, Self::Closed)
        )
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidEventStatus(s.to_string())),
        }
    }
}

/// A registration category within an event (e.g. "Adult", "Youth").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    id: String,
    name: String,
    price: Money,
}

impl Category {
    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCategory` if the id or name is blank.
    pub fn new(id: &str, name: &str, price: Money) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidCategory(String::from(
                "category id cannot be empty",
            )));
        }
        let name: &str = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidCategory(String::from(
                "category name cannot be empty",
            )));
        }
        Ok(Self {
            id: id.trim().to_string(),
            name: name.to_string(),
            price,
        })
    }

    /// Returns the category identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current price.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }
}

/// Stored attributes of an event, used to create or rebuild one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParts {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: Date,
    pub end_date: Date,
    pub location: String,
    pub visible: bool,
    pub status: EventStatus,
    pub categories: Vec<Category>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A parish event that people register for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: String,
    title: String,
    description: String,
    #[serde(with = "crate::dates::iso_date")]
    start_date: Date,
    #[serde(with = "crate::dates::iso_date")]
    end_date: Date,
    location: String,
    visible: bool,
    status: EventStatus,
    categories: Vec<Category>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Event {
    /// Builds an event from its parts, checking structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEvent` if the title is blank, the end
    /// date precedes the start date, or two categories share an id or a
    /// name (compared case-insensitively).
    pub fn from_parts(parts: EventParts) -> Result<Self, DomainError> {
        if parts.title.trim().is_empty() {
            return Err(DomainError::InvalidEvent {
                reason: String::from("title cannot be empty"),
            });
        }
        if parts.end_date < parts.start_date {
            return Err(DomainError::InvalidEvent {
                reason: format!(
                    "end date {} precedes start date {}",
                    parts.end_date, parts.start_date
                ),
            });
        }
        for (index, category) in parts.categories.iter().enumerate() {
            if parts.categories[..index]
                .iter()
                .any(|other| other.id == category.id)
            {
                return Err(DomainError::InvalidEvent {
                    reason: format!("duplicate category id '{}'", category.id),
                });
            }
            let name: String = category.name.trim().to_lowercase();
            if parts.categories[..index]
                .iter()
                .any(|other| other.name.trim().to_lowercase() == name)
            {
                return Err(DomainError::InvalidEvent {
                    reason: format!("duplicate category name '{}'", category.name),
                });
            }
        }

        Ok(Self {
            id: parts.id,
            title: parts.title.trim().to_string(),
            description: parts.description,
            start_date: parts.start_date,
            end_date: parts.end_date,
            location: parts.location,
            visible: parts.visible,
            status: parts.status,
            categories: parts.categories,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    #[must_use]
    pub const fn end_date(&self) -> Date {
        self.end_date
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn status(&self) -> EventStatus {
        self.status
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Returns true if the event is accepting registrations.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == EventStatus::Open
    }

    /// Looks up a category by id.
    #[must_use]
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Opens a draft event for registration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEventTransition` unless the event is a draft.
    pub fn open(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        self.transition_to(EventStatus::Open, now)
    }

    /// Closes the event to further registrations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEventTransition` if the event is already closed.
    pub fn close(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        self.transition_to(EventStatus::Closed, now)
    }

    fn transition_to(&mut self, target: EventStatus, now: OffsetDateTime) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidEventTransition {
                event_id: self.id.clone(),
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// Returns true once the parish-local day after `end_date` has begun.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary cannot be represented in `tz`.
    pub fn has_ended(&self, now: OffsetDateTime, tz: Tz) -> Result<bool, DomainError> {
        let boundary: i64 = local_day_start_after(self.end_date, tz)?;
        Ok(now.unix_timestamp() >= boundary)
    }
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is not a known zone.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Unix timestamp of local midnight starting the day after `date` in `tz`.
fn local_day_start_after(date: Date, tz: Tz) -> Result<i64, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: format!("computing the day after {date}"),
    };

    let next: Date = date.next_day().ok_or_else(overflow)?;
    let naive: NaiveDate = NaiveDate::from_ymd_opt(
        next.year(),
        u32::from(u8::from(next.month())),
        u32::from(next.day()),
    )
    .ok_or_else(overflow)?;
    let midnight = naive.and_hms_opt(0, 0, 0).ok_or_else(overflow)?;

    // Brazilian DST used to start at local midnight, skipping it entirely.
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            naive
                .and_hms_opt(1, 0, 0)
                .and_then(|one_am| tz.from_local_datetime(&one_am).earliest())
        })
        .ok_or_else(|| DomainError::InvalidEvent {
            reason: format!("local midnight after {date} does not exist in {tz}"),
        })?;

    Ok(start.timestamp())
}
