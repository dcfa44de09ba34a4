// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit timeline queries.

use capela_audit::{Action, Actor, ActorKind, AuditEvent, Cause, StateSnapshot};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::convert::{parse_column, timestamp_from_text};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct AuditEventRow {
    audit_id: i64,
    event_id: String,
    inscription_id: Option<String>,
    actor_id: String,
    actor_kind: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    occurred_at: String,
}

impl AuditEventRow {
    fn into_domain(self) -> Result<AuditEvent, PersistenceError> {
        let actor_kind: ActorKind = parse_column("audit_events.actor_kind", &self.actor_kind)?;
        let cause: Cause = serde_json::from_str(&self.cause_json)?;
        let action: Action = serde_json::from_str(&self.action_json)?;
        let before: StateSnapshot = serde_json::from_str(&self.before_snapshot_json)?;
        let after: StateSnapshot = serde_json::from_str(&self.after_snapshot_json)?;

        Ok(AuditEvent {
            id: Some(self.audit_id),
            event_id: self.event_id,
            inscription_id: self.inscription_id,
            actor: Actor::new(self.actor_id, actor_kind),
            cause,
            action,
            before,
            after,
            occurred_at: timestamp_from_text(&self.occurred_at)?,
        })
    }
}

/// Retrieves the audit timeline of one event, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .order(audit_events::audit_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(AuditEventRow::into_domain)
        .collect()
}
