// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Column encodings for dates and instants.
//!
//! Instants are stored in UTC with a fixed-width fraction so that text
//! ordering matches chronological ordering.

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::PersistenceError;

pub fn timestamp_to_text(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
        ))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn timestamp_from_text(text: &str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp '{text}': {e}")))
}

pub fn date_to_text(date: Date) -> Result<String, PersistenceError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn date_from_text(text: &str) -> Result<Date, PersistenceError> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::ReconstructionError(format!("date '{text}': {e}")))
}

/// Parses an enum column through its `FromStr` implementation.
pub fn parse_column<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}
