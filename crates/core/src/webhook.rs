// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reconciling gateway payment notifications with inscriptions.
//!
//! The gateway retries any notification that is not answered with 200, so
//! this use case never treats "nothing to do" as an error. Repeated
//! deliveries are absorbed by the inscription's idempotent payment
//! confirmation and by the payment mirror refusing to move backwards.

use crate::error::CoreError;
use crate::inscriptions::{inscription_audit, new_id};
use crate::repository::Repositories;
use capela_audit::{Action, Actor, Cause};
use capela_domain::{
    Inscription, InscriptionStatus, Money, Payment, PaymentConfirmation, PaymentMethod,
    PaymentParts, PaymentStatus,
};
use serde::Serialize;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Name recorded as the actor for gateway-driven changes.
pub const GATEWAY_ACTOR: &str = "asaas";

const SETTLEMENT_EVENTS: [&str; 2] = ["PAYMENT_RECEIVED", "PAYMENT_CONFIRMED"];

/// What to do with a pending inscription whose charge failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure on the payment only. The registrant may pay again.
    #[default]
    KeepPending,
    /// Cancel the inscription as well.
    CancelInscription,
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeepPending => "keep-pending",
            Self::CancelInscription => "cancel-inscription",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-pending" => Ok(Self::KeepPending),
            "cancel-inscription" => Ok(Self::CancelInscription),
            _ => Err(format!(
                "unknown failure policy '{s}' (expected keep-pending or cancel-inscription)"
            )),
        }
    }
}

/// A structurally valid gateway notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    /// Gateway event type, e.g. `PAYMENT_RECEIVED`.
    pub event: String,
    /// Gateway charge id.
    pub payment_id: String,
    /// Gateway charge status, e.g. `RECEIVED`.
    pub status: String,
    pub external_reference: Option<String>,
    pub value: Option<Money>,
    pub billing_type: Option<String>,
}

/// How a notification was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// A pending inscription was confirmed.
    Confirmed {
        #[serde(rename = "inscriptionId")]
        inscription_id: String,
    },
    /// The inscription had already been confirmed; nothing changed.
    AlreadyConfirmed {
        #[serde(rename = "inscriptionId")]
        inscription_id: String,
    },
    /// The charge failed.
    PaymentFailed {
        #[serde(rename = "inscriptionId")]
        inscription_id: String,
        status: PaymentStatus,
        #[serde(rename = "inscriptionCancelled")]
        inscription_cancelled: bool,
    },
    /// The payment mirror was updated; the inscription did not change.
    StatusRecorded {
        #[serde(rename = "inscriptionId")]
        inscription_id: String,
        status: PaymentStatus,
    },
    /// Nothing to act on.
    Ignored { reason: String },
}

/// Applies a payment notification.
///
/// # Errors
///
/// Returns `Repository` if storage fails. Notifications that cannot be
/// matched or acted on are reported as [`WebhookOutcome::Ignored`].
pub async fn process_payment_webhook(
    repos: &Repositories,
    notification: &PaymentNotification,
    policy: FailurePolicy,
    now: OffsetDateTime,
) -> Result<WebhookOutcome, CoreError> {
    let Some(status) = effective_status(notification) else {
        warn!(
            payment_id = %notification.payment_id,
            event = %notification.event,
            status = %notification.status,
            "Ignoring notification with unrecognized status"
        );
        return Ok(ignored("unrecognized payment status"));
    };

    let Some(mut inscription) = resolve_inscription(repos, notification).await? else {
        warn!(
            payment_id = %notification.payment_id,
            external_reference = ?notification.external_reference,
            "Ignoring notification for unknown inscription"
        );
        return Ok(ignored("no matching inscription"));
    };

    let settles: bool =
        status.is_settled() || SETTLEMENT_EVENTS.contains(&notification.event.as_str());

    let mirrored: Mirror =
        mirror_payment(repos, &inscription, notification, status, settles, now).await?;
    if mirrored == Mirror::ForeignCharge {
        warn!(
            payment_id = %notification.payment_id,
            inscription_id = %inscription.id(),
            "Ignoring notification whose charge belongs to another inscription"
        );
        return Ok(ignored("charge belongs to another inscription"));
    }

    if settles {
        return confirm(repos, &mut inscription, notification, now).await;
    }

    if mirrored == Mirror::OutOfOrder {
        return Ok(ignored("out-of-order payment status"));
    }

    if status.is_failure() && inscription.is_pending() {
        let cancel: bool = policy == FailurePolicy::CancelInscription;
        if cancel {
            let before: InscriptionStatus = inscription.status();
            inscription.cancel(now)?;
            repos.inscriptions.update(&inscription).await?;
            repos
                .record(inscription_audit(
                    &inscription,
                    Actor::gateway(GATEWAY_ACTOR),
                    gateway_cause(notification),
                    Action::new(
                        String::from("CancelInscription"),
                        Some(format!("payment {}", status.as_str())),
                    ),
                    before,
                    now,
                ))
                .await;
        }
        info!(
            event_id = %inscription.event_id(),
            inscription_id = %inscription.id(),
            status = status.as_str(),
            inscription_cancelled = cancel,
            "Payment failure recorded"
        );
        return Ok(WebhookOutcome::PaymentFailed {
            inscription_id: inscription.id().to_string(),
            status,
            inscription_cancelled: cancel,
        });
    }

    Ok(WebhookOutcome::StatusRecorded {
        inscription_id: inscription.id().to_string(),
        status,
    })
}

async fn confirm(
    repos: &Repositories,
    inscription: &mut Inscription,
    notification: &PaymentNotification,
    now: OffsetDateTime,
) -> Result<WebhookOutcome, CoreError> {
    let before: InscriptionStatus = inscription.status();
    match inscription.confirm_from_payment(&notification.payment_id, now) {
        Ok(PaymentConfirmation::Applied) => {
            repos.inscriptions.update(inscription).await?;
            repos
                .record(inscription_audit(
                    inscription,
                    Actor::gateway(GATEWAY_ACTOR),
                    gateway_cause(notification),
                    Action::new(String::from("ConfirmInscription"), None),
                    before,
                    now,
                ))
                .await;
            info!(
                event_id = %inscription.event_id(),
                inscription_id = %inscription.id(),
                payment_id = %notification.payment_id,
                "Inscription confirmed by payment"
            );
            Ok(WebhookOutcome::Confirmed {
                inscription_id: inscription.id().to_string(),
            })
        }
        Ok(PaymentConfirmation::AlreadyConfirmed) => Ok(WebhookOutcome::AlreadyConfirmed {
            inscription_id: inscription.id().to_string(),
        }),
        Err(err) => {
            warn!(
                inscription_id = %inscription.id(),
                payment_id = %notification.payment_id,
                error = %err,
                "Payment settled for an inscription that cannot be confirmed"
            );
            Ok(ignored("inscription is cancelled"))
        }
    }
}

/// What happened to the local payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mirror {
    /// Created, updated, or already at this status.
    Applied,
    /// The stored charge refused to move to this status.
    OutOfOrder,
    /// The charge is on file for a different inscription.
    ForeignCharge,
    /// Nothing on file and no money moved.
    Skipped,
}

/// Keeps the local payment record in step with the gateway.
async fn mirror_payment(
    repos: &Repositories,
    inscription: &Inscription,
    notification: &PaymentNotification,
    status: PaymentStatus,
    settles: bool,
    now: OffsetDateTime,
) -> Result<Mirror, CoreError> {
    if let Some(mut payment) = repos
        .payments
        .find_by_external_id(&notification.payment_id)
        .await?
    {
        if payment.inscription_id() != inscription.id()
            || payment.event_id() != inscription.event_id()
        {
            return Ok(Mirror::ForeignCharge);
        }
        return match payment.mirror_status(status, now) {
            Ok(true) => {
                repos.payments.update(&payment).await?;
                Ok(Mirror::Applied)
            }
            Ok(false) => Ok(Mirror::Applied),
            Err(err) => {
                warn!(
                    payment_id = %notification.payment_id,
                    error = %err,
                    "Ignoring out-of-order payment status"
                );
                Ok(Mirror::OutOfOrder)
            }
        };
    }

    // A charge we never stored is only recorded once money moved.
    if !settles {
        return Ok(Mirror::Skipped);
    }
    let method: PaymentMethod = notification
        .billing_type
        .as_deref()
        .and_then(|code| code.parse().ok())
        .or_else(|| inscription.preferred_payment_method())
        .unwrap_or(PaymentMethod::Pix);
    let payment: Payment = Payment::from_parts(PaymentParts {
        id: new_id(),
        event_id: inscription.event_id().to_string(),
        inscription_id: inscription.id().to_string(),
        external_payment_id: notification.payment_id.clone(),
        status,
        amount: notification.value.unwrap_or_else(|| inscription.amount()),
        method,
        created_at: now,
        updated_at: now,
    });
    repos.payments.save(&payment).await?;
    Ok(Mirror::Applied)
}

async fn resolve_inscription(
    repos: &Repositories,
    notification: &PaymentNotification,
) -> Result<Option<Inscription>, CoreError> {
    if let Some(reference) = notification
        .external_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        let found: Option<Inscription> = match reference.split_once(':') {
            Some((event_id, inscription_id)) => {
                repos
                    .inscriptions
                    .find_by_id(inscription_id, Some(event_id))
                    .await?
            }
            None => repos.inscriptions.find_by_id(reference, None).await?,
        };
        return Ok(found);
    }

    // No reference: fall back to a charge we created ourselves.
    match repos
        .payments
        .find_by_external_id(&notification.payment_id)
        .await?
    {
        Some(payment) => Ok(repos
            .inscriptions
            .find_by_id(payment.inscription_id(), Some(payment.event_id()))
            .await?),
        None => Ok(None),
    }
}

/// Uses the charge status when recognized, otherwise infers it from the event type.
fn effective_status(notification: &PaymentNotification) -> Option<PaymentStatus> {
    PaymentStatus::from_gateway(&notification.status)
        .ok()
        .or(match notification.event.as_str() {
            "PAYMENT_RECEIVED" => Some(PaymentStatus::Received),
            "PAYMENT_CONFIRMED" => Some(PaymentStatus::Confirmed),
            "PAYMENT_OVERDUE" => Some(PaymentStatus::Overdue),
            "PAYMENT_DELETED" => Some(PaymentStatus::Cancelled),
            "PAYMENT_REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        })
}

fn gateway_cause(notification: &PaymentNotification) -> Cause {
    Cause::new(
        notification.payment_id.clone(),
        format!("Gateway notification {}", notification.event),
    )
}

fn ignored(reason: &str) -> WebhookOutcome {
    WebhookOutcome::Ignored {
        reason: reason.to_string(),
    }
}
