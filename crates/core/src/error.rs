// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::gateway::GatewayError;
use crate::repository::RepositoryError;
use capela_domain::DomainError;

/// Errors returned by the use cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No event with this id.
    EventNotFound(String),
    /// No inscription with this id (within the given event, when scoped).
    InscriptionNotFound(String),
    /// No account with this id.
    UserNotFound(String),
    /// The event has no category with this id.
    CategoryNotFound {
        /// The event searched.
        event_id: String,
        /// The missing category.
        category_id: String,
    },
    /// Input or state did not satisfy a business rule.
    Validation {
        /// Human-readable message.
        message: String,
        /// Optional field-level details.
        details: Option<String>,
    },
    /// A non-cancelled inscription already exists for this person and event.
    DuplicateInscription {
        /// The event concerned.
        event_id: String,
        /// Which uniqueness rule matched.
        reason: String,
    },
    /// The event is not accepting registrations.
    EventNotOpen {
        /// The event concerned.
        event_id: String,
        /// Its current status.
        status: String,
    },
    /// An account with this id or email already exists.
    UserAlreadyExists(String),
    /// The CPF belongs to another account.
    CpfAlreadyInUse,
    /// Persistence failed.
    Repository(RepositoryError),
    /// The payment gateway failed.
    Gateway(GatewayError),
    /// A domain rule was violated.
    DomainViolation(DomainError),
}

impl CoreError {
    /// Builds a validation error without details.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "Event '{id}' not found"),
            Self::InscriptionNotFound(id) => write!(f, "Inscription '{id}' not found"),
            Self::UserNotFound(id) => write!(f, "User '{id}' not found"),
            Self::CategoryNotFound {
                event_id,
                category_id,
            } => write!(
                f,
                "Category '{category_id}' not found in event '{event_id}'"
            ),
            Self::Validation { message, details } => match details {
                Some(details) => write!(f, "{message} ({details})"),
                None => write!(f, "{message}"),
            },
            Self::DuplicateInscription { event_id, reason } => {
                write!(f, "Already registered for event '{event_id}': {reason}")
            }
            Self::EventNotOpen { event_id, status } => write!(
                f,
                "Event '{event_id}' is not open for registration (status: {status})"
            ),
            Self::UserAlreadyExists(id) => write!(f, "User '{id}' already exists"),
            Self::CpfAlreadyInUse => write!(f, "CPF is already registered to another account"),
            Self::Repository(err) => write!(f, "Repository error: {err}"),
            Self::Gateway(err) => write!(f, "Payment gateway error: {err}"),
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Repository(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::DomainViolation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}
