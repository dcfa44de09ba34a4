// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration use cases: create, confirm by hand, cancel.

use crate::error::CoreError;
use crate::gateway::PaymentGateway;
use crate::repository::{Repositories, RepositoryError};
use capela_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use capela_domain::{
    Category, Event, GuestData, Inscription, InscriptionRecord, InscriptionStatus, NewInscription,
    Payment, PaymentMethod, PaymentStatus, Registrant, User,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Who is acting on an existing inscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// An account holder; may only act on their own inscriptions.
    Owner(String),
    /// Parish staff; may act on any inscription.
    Admin(String),
}

impl Authority {
    pub(crate) fn actor(&self) -> Actor {
        match self {
            Self::Owner(id) => Actor::user(id),
            Self::Admin(id) => Actor::admin(id),
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if an owner acts on someone else's inscription.
    pub(crate) fn check(&self, inscription: &Inscription) -> Result<(), CoreError> {
        match self {
            Self::Owner(user_id) if !inscription.is_owned_by(user_id) => Err(CoreError::Validation {
                message: String::from("you may only manage your own registrations"),
                details: Some(format!("inscription {}", inscription.id())),
            }),
            _ => Ok(()),
        }
    }
}

/// Input for an account holder registering for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInscriptionRequest {
    pub user_id: String,
    pub event_id: String,
    pub category_id: String,
    pub preferred_payment_method: Option<PaymentMethod>,
}

/// Input for someone registering without an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGuestInscriptionRequest {
    pub event_id: String,
    pub category_id: String,
    pub guest: GuestData,
    pub preferred_payment_method: Option<PaymentMethod>,
}

/// Input for an administrator confirming a registration by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmInscriptionRequest {
    pub event_id: String,
    pub inscription_id: String,
    pub confirmed_by: String,
}

/// Summary of a confirmed inscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedInscription {
    pub id: String,
    pub status: InscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

/// Result of a manual confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualConfirmation {
    pub success: bool,
    pub inscription: ConfirmedInscription,
    /// Whether an outstanding gateway charge was cancelled.
    pub asaas_payment_cancelled: bool,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub inscription: InscriptionRecord,
    pub asaas_payment_cancelled: bool,
}

/// Registers an account holder for an event.
///
/// # Arguments
///
/// * `repos` - Storage handles
/// * `request` - Who registers for what
/// * `now` - The current instant
///
/// # Errors
///
/// Returns `UserNotFound`, `EventNotFound`, `EventNotOpen`,
/// `CategoryNotFound` or `DuplicateInscription` when the corresponding
/// check fails, and `Repository` if storage fails.
pub async fn create_inscription(
    repos: &Repositories,
    request: CreateInscriptionRequest,
    now: OffsetDateTime,
) -> Result<InscriptionRecord, CoreError> {
    let user: User = repos
        .users
        .find_by_id(&request.user_id)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(request.user_id.clone()))?;
    let event: Event = require_open_event(repos, &request.event_id).await?;
    let category: Category = require_category(repos, &event, &request.category_id).await?;

    if repos
        .inscriptions
        .find_by_event_and_user(event.id(), &user.id)
        .await?
        .is_some()
    {
        return Err(CoreError::DuplicateInscription {
            event_id: event.id().to_string(),
            reason: String::from("this account already has an active registration"),
        });
    }

    // Same person registered once as a guest and now through their account.
    if let Some(cpf) = &user.cpf {
        let guest_registration: Option<Inscription> = repos
            .inscriptions
            .find_guest_by_event_and_cpf(event.id(), cpf)
            .await?;
        if guest_registration.is_some() {
            return Err(CoreError::DuplicateInscription {
                event_id: event.id().to_string(),
                reason: String::from("this CPF was already used for a guest registration"),
            });
        }
    }

    let inscription: Inscription = Inscription::create(
        new_id(),
        NewInscription {
            event_id: event.id().to_string(),
            category_id: category.id().to_string(),
            registrant: Registrant::Account {
                user_id: user.id.clone(),
                cpf: user.cpf.clone(),
            },
            amount: category.price(),
            preferred_payment_method: request.preferred_payment_method,
        },
        now,
    )?;

    persist_new(repos, &inscription, Actor::user(&user.id), now).await?;
    Ok(inscription.to_record())
}

/// Registers a guest (no account) for an event.
///
/// # Errors
///
/// Returns `EventNotFound`, `EventNotOpen`, `CategoryNotFound` or
/// `DuplicateInscription` when the corresponding check fails.
pub async fn create_guest_inscription(
    repos: &Repositories,
    request: CreateGuestInscriptionRequest,
    now: OffsetDateTime,
) -> Result<InscriptionRecord, CoreError> {
    let event: Event = require_open_event(repos, &request.event_id).await?;
    let category: Category = require_category(repos, &event, &request.category_id).await?;

    if repos
        .inscriptions
        .find_by_event_and_cpf(event.id(), &request.guest.cpf)
        .await?
        .is_some()
    {
        return Err(CoreError::DuplicateInscription {
            event_id: event.id().to_string(),
            reason: String::from("this CPF already has an active registration"),
        });
    }

    let actor: Actor = Actor::guest(request.guest.cpf.as_str());
    let inscription: Inscription = Inscription::create(
        new_id(),
        NewInscription {
            event_id: event.id().to_string(),
            category_id: category.id().to_string(),
            registrant: Registrant::Guest(request.guest),
            amount: category.price(),
            preferred_payment_method: request.preferred_payment_method,
        },
        now,
    )?;

    persist_new(repos, &inscription, actor, now).await?;
    Ok(inscription.to_record())
}

/// Confirms a pending inscription on an administrator's authority.
///
/// Any outstanding gateway charge is cancelled first so the registrant is
/// not billed after being let in. A failed cancellation is logged and does
/// not block the confirmation.
///
/// # Errors
///
/// Returns `Validation` if the event does not exist or the inscription is
/// not pending, and `InscriptionNotFound` if it is not part of the event.
pub async fn confirm_inscription_manually(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    request: ConfirmInscriptionRequest,
    now: OffsetDateTime,
) -> Result<ManualConfirmation, CoreError> {
    if repos.events.find_by_id(&request.event_id).await?.is_none() {
        return Err(CoreError::Validation {
            message: String::from("event not found"),
            details: Some(format!("eventId {}", request.event_id)),
        });
    }

    let mut inscription: Inscription = repos
        .inscriptions
        .find_by_id(&request.inscription_id, Some(&request.event_id))
        .await?
        .ok_or_else(|| CoreError::InscriptionNotFound(request.inscription_id.clone()))?;

    if !inscription.is_pending() {
        return Err(CoreError::Validation {
            message: String::from("only pending registrations can be confirmed"),
            details: Some(format!("current status: {}", inscription.status())),
        });
    }

    let charge_cancelled: bool = cancel_outstanding_charge(repos, gateway, &inscription, now).await;

    let before: InscriptionStatus = inscription.status();
    inscription.confirm_manually(&request.confirmed_by, now)?;
    repos.inscriptions.update(&inscription).await?;

    repos
        .record(inscription_audit(
            &inscription,
            Actor::admin(&request.confirmed_by),
            Cause::new(
                inscription.id().to_string(),
                String::from("Manual confirmation by administrator"),
            ),
            Action::new(
                String::from("ConfirmInscription"),
                charge_cancelled.then(|| String::from("outstanding charge cancelled")),
            ),
            before,
            now,
        ))
        .await;

    info!(
        event_id = %inscription.event_id(),
        inscription_id = %inscription.id(),
        confirmed_by = %request.confirmed_by,
        charge_cancelled,
        "Inscription confirmed manually"
    );

    Ok(ManualConfirmation {
        success: true,
        inscription: ConfirmedInscription {
            id: inscription.id().to_string(),
            status: inscription.status(),
            payment_id: inscription.external_payment_id().map(ToString::to_string),
        },
        asaas_payment_cancelled: charge_cancelled,
    })
}

/// Cancels a pending inscription.
///
/// # Errors
///
/// Returns `InscriptionNotFound` if absent, and `Validation` if an owner
/// targets someone else's inscription or it is not pending.
pub async fn cancel_inscription(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    inscription_id: &str,
    authority: &Authority,
    now: OffsetDateTime,
) -> Result<Cancellation, CoreError> {
    let mut inscription: Inscription = repos
        .inscriptions
        .find_by_id(inscription_id, None)
        .await?
        .ok_or_else(|| CoreError::InscriptionNotFound(inscription_id.to_string()))?;

    authority.check(&inscription)?;

    if !inscription.is_pending() {
        return Err(CoreError::Validation {
            message: String::from("only pending registrations may be cancelled"),
            details: Some(format!("current status: {}", inscription.status())),
        });
    }

    let charge_cancelled: bool = cancel_outstanding_charge(repos, gateway, &inscription, now).await;

    let before: InscriptionStatus = inscription.status();
    inscription.cancel(now)?;
    repos.inscriptions.update(&inscription).await?;

    repos
        .record(inscription_audit(
            &inscription,
            authority.actor(),
            Cause::new(
                inscription.id().to_string(),
                String::from("Cancellation requested"),
            ),
            Action::new(String::from("CancelInscription"), None),
            before,
            now,
        ))
        .await;

    info!(
        event_id = %inscription.event_id(),
        inscription_id = %inscription.id(),
        charge_cancelled,
        "Inscription cancelled"
    );

    Ok(Cancellation {
        inscription: inscription.to_record(),
        asaas_payment_cancelled: charge_cancelled,
    })
}

/// Cancels every gateway charge of the inscription that could still be paid.
///
/// A charge replaced after going overdue stays payable at the gateway, so
/// older charges are cancelled along with the latest one. Returns true
/// when the gateway accepted at least one cancellation.
pub(crate) async fn cancel_outstanding_charge(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    inscription: &Inscription,
    now: OffsetDateTime,
) -> bool {
    let payments: Vec<Payment> = match repos
        .payments
        .find_all_by_inscription(inscription.id(), inscription.event_id())
        .await
    {
        Ok(payments) => payments,
        Err(err) => {
            warn!(
                inscription_id = %inscription.id(),
                error = %err,
                "Could not look up payments; skipping charge cancellation"
            );
            return false;
        }
    };

    let mut any_cancelled: bool = false;
    for mut payment in payments.into_iter().filter(|p| p.status().is_payable()) {
        if let Err(err) = gateway.cancel_charge(payment.external_payment_id()).await {
            warn!(
                inscription_id = %inscription.id(),
                payment_id = %payment.external_payment_id(),
                error = %err,
                "Failed to cancel gateway charge"
            );
            continue;
        }
        any_cancelled = true;

        match payment.mirror_status(PaymentStatus::Cancelled, now) {
            Ok(true) => {
                if let Err(err) = repos.payments.update(&payment).await {
                    warn!(
                        payment_id = %payment.external_payment_id(),
                        error = %err,
                        "Charge cancelled but local mirror not updated"
                    );
                }
            }
            Ok(false) => {}
            Err(err) => warn!(error = %err, "Charge cancelled but mirror refused the status"),
        }
    }
    any_cancelled
}

pub(crate) async fn require_open_event(
    repos: &Repositories,
    event_id: &str,
) -> Result<Event, CoreError> {
    let event: Event = repos
        .events
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| CoreError::EventNotFound(event_id.to_string()))?;
    if !event.is_open() {
        return Err(CoreError::EventNotOpen {
            event_id: event_id.to_string(),
            status: event.status().to_string(),
        });
    }
    Ok(event)
}

async fn require_category(
    repos: &Repositories,
    event: &Event,
    category_id: &str,
) -> Result<Category, CoreError> {
    repos
        .events
        .find_category(event.id(), category_id)
        .await?
        .ok_or_else(|| CoreError::CategoryNotFound {
            event_id: event.id().to_string(),
            category_id: category_id.to_string(),
        })
}

async fn persist_new(
    repos: &Repositories,
    inscription: &Inscription,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    repos
        .inscriptions
        .save(inscription)
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(detail) => CoreError::DuplicateInscription {
                event_id: inscription.event_id().to_string(),
                reason: detail,
            },
            other => CoreError::Repository(other),
        })?;

    repos
        .record(AuditEvent::for_inscription(
            inscription.event_id().to_string(),
            inscription.id().to_string(),
            actor,
            Cause::new(inscription.id().to_string(), String::from("Registration submitted")),
            Action::new(
                String::from("CreateInscription"),
                Some(format!("category {}", inscription.category_id())),
            ),
            StateSnapshot::absent(),
            StateSnapshot::inscription(inscription.status()),
            now,
        ))
        .await;

    info!(
        event_id = %inscription.event_id(),
        inscription_id = %inscription.id(),
        amount = inscription.amount().cents(),
        guest = inscription.registrant().is_guest(),
        "Inscription created"
    );
    Ok(())
}

pub(crate) fn inscription_audit(
    inscription: &Inscription,
    actor: Actor,
    cause: Cause,
    action: Action,
    before: InscriptionStatus,
    now: OffsetDateTime,
) -> AuditEvent {
    AuditEvent::for_inscription(
        inscription.event_id().to_string(),
        inscription.id().to_string(),
        actor,
        cause,
        action,
        StateSnapshot::inscription(before),
        StateSnapshot::inscription(inscription.status()),
        now,
    )
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
