// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The inscription (event registration) state machine.
//!
//! An inscription starts `pending` and ends either `confirmed` or
//! `cancelled`. Both end states are terminal. Confirmation arrives through
//! one of two paths: an administrator confirming by hand, or the payment
//! gateway reporting a settled charge. The gateway path tolerates repeated
//! deliveries of the same notification.
//!
//! All mutation goes through the transition methods on [`Inscription`];
//! fields are private so invalid states cannot be constructed.

use crate::cpf::Cpf;
use crate::error::DomainError;
use crate::money::Money;
use crate::person::{Email, PersonName, Phone};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Status of an inscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InscriptionStatus {
    /// Awaiting payment or manual confirmation.
    #[default]
    Pending,
    /// Registration accepted. Terminal.
    Confirmed,
    /// Registration withdrawn. Terminal.
    Cancelled,
}

impl InscriptionStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the human-readable label shown to parishioners.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Confirmed => "Confirmada",
            Self::Cancelled => "Cancelada",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl std::fmt::Display for InscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidInscriptionStatus(s.to_string())),
        }
    }
}

/// How the registrant would like to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Instant transfer via PIX.
    Pix,
    /// Credit card.
    CreditCard,
    /// Bank slip.
    Boleto,
}

impl PaymentMethod {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::CreditCard => "credit_card",
            Self::Boleto => "boleto",
        }
    }

    /// Returns the billing type code used by the payment gateway.
    #[must_use]
    pub const fn billing_type(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::CreditCard => "CREDIT_CARD",
            Self::Boleto => "BOLETO",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    /// Accepts both the API form (`credit_card`) and the gateway form (`CREDIT_CARD`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" | "PIX" => Ok(Self::Pix),
            "credit_card" | "CREDIT_CARD" => Ok(Self::CreditCard),
            "boleto" | "BOLETO" => Ok(Self::Boleto),
            _ => Err(DomainError::InvalidPaymentMethod(s.to_string())),
        }
    }
}

/// Contact data for someone registering without an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestData {
    pub name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub cpf: Cpf,
}

/// Who an inscription belongs to.
///
/// Exactly one of an account holder or a guest. The account variant
/// carries the account's CPF when one was on file at registration so that
/// per-CPF uniqueness covers both kinds of registrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registrant {
    /// A registered account holder.
    Account {
        /// The account identifier.
        user_id: String,
        /// The account's CPF at registration time, if any.
        cpf: Option<Cpf>,
    },
    /// A guest without an account.
    Guest(GuestData),
}

impl Registrant {
    /// Builds a registrant from two optional inputs, as they arrive at the
    /// request boundary.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegistrant` if both or neither are supplied.
    pub fn from_options(
        account: Option<(String, Option<Cpf>)>,
        guest: Option<GuestData>,
    ) -> Result<Self, DomainError> {
        match (account, guest) {
            (Some((user_id, cpf)), None) => {
                if user_id.trim().is_empty() {
                    return Err(DomainError::InvalidRegistrant(String::from(
                        "account id cannot be empty",
                    )));
                }
                Ok(Self::Account { user_id, cpf })
            }
            (None, Some(guest)) => Ok(Self::Guest(guest)),
            (Some(_), Some(_)) => Err(DomainError::InvalidRegistrant(String::from(
                "provide either an account or guest data, not both",
            ))),
            (None, None) => Err(DomainError::InvalidRegistrant(String::from(
                "an account or guest data is required",
            ))),
        }
    }

    /// Returns the account id for account registrants.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Account { user_id, .. } => Some(user_id),
            Self::Guest(_) => None,
        }
    }

    /// Returns the CPF associated with this registrant, if known.
    #[must_use]
    pub const fn cpf(&self) -> Option<&Cpf> {
        match self {
            Self::Account { cpf, .. } => cpf.as_ref(),
            Self::Guest(guest) => Some(&guest.cpf),
        }
    }

    /// Returns guest data for guest registrants.
    #[must_use]
    pub const fn guest(&self) -> Option<&GuestData> {
        match self {
            Self::Account { .. } => None,
            Self::Guest(guest) => Some(guest),
        }
    }

    /// Returns true for guest registrants.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

/// Input for creating a new inscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInscription {
    pub event_id: String,
    pub category_id: String,
    pub registrant: Registrant,
    /// Category price at the moment of registration.
    pub amount: Money,
    pub preferred_payment_method: Option<PaymentMethod>,
}

/// Result of applying a payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentConfirmation {
    /// The inscription moved from pending to confirmed.
    Applied,
    /// The inscription was already confirmed; nothing changed.
    AlreadyConfirmed,
}

/// Stored attributes of an inscription, used to rebuild one from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionParts {
    pub id: String,
    pub event_id: String,
    pub category_id: String,
    pub registrant: Registrant,
    pub status: InscriptionStatus,
    pub amount: Money,
    pub external_payment_id: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub confirmed_by: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A registration for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inscription {
    id: String,
    event_id: String,
    category_id: String,
    registrant: Registrant,
    status: InscriptionStatus,
    amount: Money,
    external_payment_id: Option<String>,
    preferred_payment_method: Option<PaymentMethod>,
    confirmed_by: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Inscription {
    /// Creates a new pending inscription.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegistrant` if the id, event id or
    /// category id is blank.
    pub fn create(id: String, input: NewInscription, now: OffsetDateTime) -> Result<Self, DomainError> {
        if id.trim().is_empty() || input.event_id.trim().is_empty() {
            return Err(DomainError::InvalidRegistrant(String::from(
                "inscription and event ids are required",
            )));
        }
        if input.category_id.trim().is_empty() {
            return Err(DomainError::InvalidRegistrant(String::from(
                "category id is required",
            )));
        }

        Ok(Self {
            id,
            event_id: input.event_id,
            category_id: input.category_id,
            registrant: input.registrant,
            status: InscriptionStatus::Pending,
            amount: input.amount,
            external_payment_id: None,
            preferred_payment_method: input.preferred_payment_method,
            confirmed_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an inscription previously persisted.
    #[must_use]
    pub fn from_parts(parts: InscriptionParts) -> Self {
        Self {
            id: parts.id,
            event_id: parts.event_id,
            category_id: parts.category_id,
            registrant: parts.registrant,
            status: parts.status,
            amount: parts.amount,
            external_payment_id: parts.external_payment_id,
            preferred_payment_method: parts.preferred_payment_method,
            confirmed_by: parts.confirmed_by,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    #[must_use]
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    #[must_use]
    pub const fn registrant(&self) -> &Registrant {
        &self.registrant
    }

    #[must_use]
    pub const fn status(&self) -> InscriptionStatus {
        self.status
    }

    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    #[must_use]
    pub fn external_payment_id(&self) -> Option<&str> {
        self.external_payment_id.as_deref()
    }

    #[must_use]
    pub const fn preferred_payment_method(&self) -> Option<PaymentMethod> {
        self.preferred_payment_method
    }

    #[must_use]
    pub fn confirmed_by(&self) -> Option<&str> {
        self.confirmed_by.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InscriptionStatus::Pending
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == InscriptionStatus::Confirmed
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == InscriptionStatus::Cancelled
    }

    /// Returns true if `user_id` is the account holder of this inscription.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.registrant.user_id() == Some(user_id)
    }

    /// Confirms the inscription on an administrator's authority.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInscriptionTransition` unless pending.
    pub fn confirm_manually(
        &mut self,
        confirmed_by: &str,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        self.require_pending("confirm", "only pending registrations can be confirmed")?;
        self.status = InscriptionStatus::Confirmed;
        self.confirmed_by = Some(confirmed_by.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Confirms the inscription because the gateway reported payment.
    ///
    /// Re-applying a confirmation to an already confirmed inscription is a
    /// successful no-op so duplicate webhook deliveries are harmless.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInscriptionTransition` if cancelled.
    pub fn confirm_from_payment(
        &mut self,
        external_payment_id: &str,
        now: OffsetDateTime,
    ) -> Result<PaymentConfirmation, DomainError> {
        match self.status {
            InscriptionStatus::Confirmed => Ok(PaymentConfirmation::AlreadyConfirmed),
            InscriptionStatus::Cancelled => Err(self.transition_error(
                "confirm",
                "a cancelled registration cannot be confirmed by payment",
            )),
            InscriptionStatus::Pending => {
                self.status = InscriptionStatus::Confirmed;
                if self.external_payment_id.is_none() {
                    self.external_payment_id = Some(external_payment_id.to_string());
                }
                self.updated_at = now;
                Ok(PaymentConfirmation::Applied)
            }
        }
    }

    /// Cancels the inscription.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInscriptionTransition` unless pending.
    pub fn cancel(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        self.require_pending("cancel", "cannot cancel non-pending registration")?;
        self.status = InscriptionStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Links the external charge created for this inscription.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInscriptionTransition` unless pending.
    pub fn attach_payment(
        &mut self,
        external_payment_id: &str,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        self.require_pending(
            "attach a payment to",
            "charges can only be created for pending registrations",
        )?;
        self.external_payment_id = Some(external_payment_id.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Produces the transport representation, including computed display fields.
    #[must_use]
    pub fn to_record(&self) -> InscriptionRecord {
        InscriptionRecord {
            id: self.id.clone(),
            event_id: self.event_id.clone(),
            category_id: self.category_id.clone(),
            user_id: self.registrant.user_id().map(ToString::to_string),
            guest: self.registrant.guest().map(|guest| GuestRecord {
                name: guest.name.as_str().to_string(),
                email: guest.email.as_str().to_string(),
                phone: guest.phone.formatted(),
                cpf: guest.cpf.formatted(),
            }),
            status: self.status,
            status_label: self.status.label().to_string(),
            amount: self.amount.cents(),
            amount_formatted: self.amount.formatted(),
            external_payment_id: self.external_payment_id.clone(),
            preferred_payment_method: self.preferred_payment_method,
            confirmed_by: self.confirmed_by.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn require_pending(&self, operation: &'static str, reason: &str) -> Result<(), DomainError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(self.transition_error(operation, reason))
        }
    }

    fn transition_error(&self, operation: &'static str, reason: &str) -> DomainError {
        DomainError::InvalidInscriptionTransition {
            inscription_id: self.id.clone(),
            from: self.status.as_str().to_string(),
            operation,
            reason: reason.to_string(),
        }
    }
}

/// Guest contact details as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
}

/// Plain, serializable view of an inscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionRecord {
    pub id: String,
    pub event_id: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestRecord>,
    pub status: InscriptionStatus,
    pub status_label: String,
    /// Amount in centavos.
    pub amount: i64,
    pub amount_formatted: String,
    pub external_payment_id: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub confirmed_by: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
