// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use capela_audit::AuditEvent;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::convert::timestamp_to_text;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// # Returns
///
/// The id assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let cause_json: String = serde_json::to_string(&event.cause)?;
    let action_json: String = serde_json::to_string(&event.action)?;
    let before_json: String = serde_json::to_string(&event.before)?;
    let after_json: String = serde_json::to_string(&event.after)?;

    let audit_id: i64 = diesel::insert_into(audit_events::table)
        .values((
            audit_events::event_id.eq(&event.event_id),
            audit_events::inscription_id.eq(event.inscription_id.as_deref()),
            audit_events::actor_id.eq(&event.actor.id),
            audit_events::actor_kind.eq(event.actor.kind.as_str()),
            audit_events::cause_json.eq(cause_json),
            audit_events::action_json.eq(action_json),
            audit_events::before_snapshot_json.eq(before_json),
            audit_events::after_snapshot_json.eq(after_json),
            audit_events::occurred_at.eq(timestamp_to_text(event.occurred_at)?),
        ))
        .returning(audit_events::audit_id)
        .get_result(conn)?;
    debug!(audit_id, action = %event.action.name, "Audit event persisted");
    Ok(audit_id)
}
