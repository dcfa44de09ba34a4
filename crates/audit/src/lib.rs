// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Audit trail for registration and event lifecycle changes.
//!
//! Every successful transition of an inscription or event produces exactly
//! one [`AuditEvent`] describing who did it, why, what happened, and the
//! status before and after.

use capela_domain::{EventStatus, InscriptionStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Kind of entity that initiated a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A parishioner acting on their own account.
    User,
    /// Parish staff.
    Admin,
    /// Someone registering without an account.
    Guest,
    /// The payment gateway, via webhook.
    Gateway,
    /// Scheduled jobs.
    System,
}

impl ActorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Guest => "guest",
            Self::Gateway => "gateway",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for ActorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            "gateway" => Ok(Self::Gateway),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown actor kind '{s}'")),
        }
    }
}

/// Represents the entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Account id, gateway name or job name.
    pub id: String,
    pub kind: ActorKind,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `kind` - The type of actor
    #[must_use]
    pub const fn new(id: String, kind: ActorKind) -> Self {
        Self { id, kind }
    }

    #[must_use]
    pub fn user(id: &str) -> Self {
        Self::new(id.to_string(), ActorKind::User)
    }

    #[must_use]
    pub fn admin(id: &str) -> Self {
        Self::new(id.to_string(), ActorKind::Admin)
    }

    /// A guest identified by the CPF digits they registered with.
    #[must_use]
    pub fn guest(cpf: &str) -> Self {
        Self::new(cpf.to_string(), ActorKind::Guest)
    }

    #[must_use]
    pub fn gateway(name: &str) -> Self {
        Self::new(name.to_string(), ActorKind::Gateway)
    }

    #[must_use]
    pub fn system(job: &str) -> Self {
        Self::new(job.to_string(), ActorKind::System)
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., webhook payment id, request id).
    pub id: String,
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`ConfirmInscription`", "`CloseEvent`").
    pub name: String,
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The status of the audited entity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Snapshot of an entity that did not exist yet.
    #[must_use]
    pub fn absent() -> Self {
        Self::new(String::from("none"))
    }

    #[must_use]
    pub fn inscription(status: InscriptionStatus) -> Self {
        Self::new(format!("inscription:{}", status.as_str()))
    }

    #[must_use]
    pub fn event(status: EventStatus) -> Self {
        Self::new(format!("event:{}", status.as_str()))
    }

    #[must_use]
    pub fn payment(status: PaymentStatus) -> Self {
        Self::new(format!("payment:{}", status.as_str()))
    }
}

/// An immutable audit event representing a state transition.
///
/// Scoped to the event it concerns and, for registration changes, to the
/// inscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Assigned by persistence; `None` until stored.
    pub id: Option<i64>,
    pub event_id: String,
    pub inscription_id: Option<String>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates an audit event for a change to an event.
    ///
    /// # Arguments
    ///
    /// * `event_id` - The event concerned
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    /// * `occurred_at` - When the change happened
    #[must_use]
    pub const fn for_event(
        event_id: String,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: None,
            event_id,
            inscription_id: None,
            actor,
            cause,
            action,
            before,
            after,
            occurred_at,
        }
    }

    /// Creates an audit event for a change to an inscription.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn for_inscription(
        event_id: String,
        inscription_id: String,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: None,
            event_id,
            inscription_id: Some(inscription_id),
            actor,
            cause,
            action,
            before,
            after,
            occurred_at,
        }
    }

    /// Returns a copy carrying the id persistence assigned.
    #[must_use]
    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}
