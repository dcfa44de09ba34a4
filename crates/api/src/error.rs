// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use capela::CoreError;
use capela_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { message, .. } | Self::InvalidInput { message, .. } => {
                write!(f, "{message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match err {
        DomainError::InvalidInscriptionTransition { reason, .. } => {
            return violation("inscription_lifecycle", reason);
        }
        DomainError::InvalidEventTransition { .. } => {
            return violation("event_lifecycle", err.to_string());
        }
        DomainError::InvalidPaymentTransition { .. } => {
            return violation("payment_lifecycle", err.to_string());
        }
        DomainError::InvalidMoney { .. }
        | DomainError::MoneyUnderflow { .. }
        | DomainError::MoneyOverflow { .. } => "amount",
        DomainError::InvalidCpf(_) => "cpf",
        DomainError::InvalidEmail(_) => "email",
        DomainError::InvalidPhone(_) => "phone",
        DomainError::InvalidName(_) => "name",
        DomainError::InvalidBirthDate(_) => "birthDate",
        DomainError::InvalidGender(_) => "gender",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidEventStatus(_) | DomainError::InvalidInscriptionStatus(_) => "status",
        DomainError::InvalidEvent { .. } => "event",
        DomainError::InvalidCategory(_) => "categories",
        DomainError::InvalidTimezone(_) => "timezone",
        DomainError::InvalidRegistrant(_) => "registrant",
        DomainError::InvalidPaymentMethod(_) => "paymentMethod",
        DomainError::InvalidPaymentStatus(_) => "payment.status",
        DomainError::DateArithmeticOverflow { .. } => "date",
    };
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::EventNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Event"),
            message: format!("Event '{id}' does not exist"),
        },
        CoreError::InscriptionNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Inscription"),
            message: format!("Inscription '{id}' does not exist"),
        },
        CoreError::UserNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("No account registered for '{id}'"),
        },
        CoreError::CategoryNotFound {
            event_id,
            category_id,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Category"),
            message: format!("Category '{category_id}' does not exist in event '{event_id}'"),
        },
        err @ CoreError::Validation { .. } => ApiError::InvalidInput {
            field: String::from("request"),
            message: err.to_string(),
        },
        err @ CoreError::DuplicateInscription { .. } => {
            violation("unique_inscription", err.to_string())
        }
        err @ CoreError::EventNotOpen { .. } => violation("event_open", err.to_string()),
        err @ CoreError::UserAlreadyExists(_) => violation("unique_account", err.to_string()),
        err @ CoreError::CpfAlreadyInUse => violation("unique_cpf", err.to_string()),
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        err @ (CoreError::Repository(_) | CoreError::Gateway(_)) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
