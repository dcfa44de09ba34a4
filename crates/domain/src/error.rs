// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
///
/// Value-object constructors and entity transitions return these
/// synchronously. They never carry I/O failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A monetary amount is malformed or negative.
    InvalidMoney {
        /// Description of the problem.
        reason: String,
    },
    /// Subtracting would produce a negative amount.
    MoneyUnderflow {
        /// The amount being subtracted from, in cents.
        minuend: i64,
        /// The amount being subtracted, in cents.
        subtrahend: i64,
    },
    /// A monetary operation overflowed the representable range.
    MoneyOverflow {
        /// The operation that overflowed.
        operation: &'static str,
    },
    /// CPF is malformed or fails the check digits.
    InvalidCpf(String),
    /// Email address is malformed.
    InvalidEmail(String),
    /// Phone number is malformed.
    InvalidPhone(String),
    /// Person name is empty or out of bounds.
    InvalidName(String),
    /// Birth date is out of range.
    InvalidBirthDate(String),
    /// Gender value is not recognized.
    InvalidGender(String),
    /// Role value is not recognized.
    InvalidRole(String),
    /// Event status string is not recognized.
    InvalidEventStatus(String),
    /// Event data is inconsistent.
    InvalidEvent {
        /// Description of the problem.
        reason: String,
    },
    /// Event status transition is not permitted.
    InvalidEventTransition {
        /// The event identifier.
        event_id: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Category data is invalid.
    InvalidCategory(String),
    /// The configured timezone is not a known IANA zone.
    InvalidTimezone(String),
    /// Inscription status string is not recognized.
    InvalidInscriptionStatus(String),
    /// Inscription transition is not permitted from its current status.
    InvalidInscriptionTransition {
        /// The inscription identifier.
        inscription_id: String,
        /// The current status.
        from: String,
        /// The attempted operation.
        operation: &'static str,
        /// Why the transition was refused.
        reason: String,
    },
    /// Registrant must be exactly one of an account or guest data.
    InvalidRegistrant(String),
    /// Payment method is not recognized.
    InvalidPaymentMethod(String),
    /// Payment status is not recognized.
    InvalidPaymentStatus(String),
    /// Mirrored payment status would move backwards.
    InvalidPaymentTransition {
        /// The payment identifier.
        payment_id: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMoney { reason } => write!(f, "Invalid amount: {reason}"),
            Self::MoneyUnderflow {
                minuend,
                subtrahend,
            } => {
                write!(
                    f,
                    "Cannot subtract {subtrahend} cents from {minuend} cents: result would be negative"
                )
            }
            Self::MoneyOverflow { operation } => {
                write!(f, "Amount overflow during {operation}")
            }
            Self::InvalidCpf(msg) => write!(f, "Invalid CPF: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidBirthDate(msg) => write!(f, "Invalid birth date: {msg}"),
            Self::InvalidGender(value) => write!(f, "Invalid gender: '{value}'"),
            Self::InvalidRole(value) => write!(f, "Invalid role: '{value}'"),
            Self::InvalidEventStatus(value) => write!(f, "Invalid event status: '{value}'"),
            Self::InvalidEvent { reason } => write!(f, "Invalid event: {reason}"),
            Self::InvalidEventTransition { event_id, from, to } => {
                write!(
                    f,
                    "Event '{event_id}' cannot transition from '{from}' to '{to}'"
                )
            }
            Self::InvalidCategory(msg) => write!(f, "Invalid category: {msg}"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: '{tz}'"),
            Self::InvalidInscriptionStatus(value) => {
                write!(f, "Invalid inscription status: '{value}'")
            }
            Self::InvalidInscriptionTransition {
                inscription_id,
                from,
                operation,
                reason,
            } => {
                write!(
                    f,
                    "Cannot {operation} inscription '{inscription_id}' in status '{from}': {reason}"
                )
            }
            Self::InvalidRegistrant(msg) => write!(f, "Invalid registrant: {msg}"),
            Self::InvalidPaymentMethod(value) => write!(f, "Invalid payment method: '{value}'"),
            Self::InvalidPaymentStatus(value) => write!(f, "Invalid payment status: '{value}'"),
            Self::InvalidPaymentTransition {
                payment_id,
                from,
                to,
            } => {
                write!(
                    f,
                    "Payment '{payment_id}' cannot move from '{from}' back to '{to}'"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
