// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Creating a gateway charge for a pending inscription.

use crate::error::CoreError;
use crate::gateway::{Charge, ChargeRequest, Customer, CustomerRequest, PaymentGateway, PixPayload};
use crate::inscriptions::{Authority, new_id};
use crate::repository::Repositories;
use capela_domain::{
    Cpf, DomainError, Inscription, Payment, PaymentMethod, PaymentParts, PaymentStatus, Registrant,
    User,
};
use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};
use tracing::{info, warn};

/// Days between charge creation and its due date.
pub const PAYMENT_DUE_DAYS: i64 = 3;

/// Input for requesting payment instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub event_id: String,
    pub inscription_id: String,
    pub authority: Authority,
    /// Falls back to the inscription's preferred method.
    pub method: Option<PaymentMethod>,
}

/// PIX details shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixInstructions {
    pub qr_code_image: String,
    pub copy_paste: String,
    pub expiration: Option<String>,
}

/// What the payer needs to complete payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructions {
    pub inscription_id: String,
    pub payment_id: String,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub amount: i64,
    pub amount_formatted: String,
    pub invoice_url: Option<String>,
    pub pix: Option<PixInstructions>,
    /// True when an existing charge was returned instead of a new one.
    pub reused: bool,
}

/// External reference attached to every charge: `"{eventId}:{inscriptionId}"`.
#[must_use]
pub fn external_reference(event_id: &str, inscription_id: &str) -> String {
    format!("{event_id}:{inscription_id}")
}

/// Creates (or returns the existing) gateway charge for a pending inscription.
///
/// # Errors
///
/// Returns `InscriptionNotFound` if absent, `Validation` if the requester
/// does not own it, it is not pending, no payment method is known or the
/// registrant has no CPF, and `Gateway` if the charge cannot be created.
pub async fn request_inscription_payment(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    request: PaymentRequest,
    now: OffsetDateTime,
) -> Result<PaymentInstructions, CoreError> {
    let mut inscription: Inscription = repos
        .inscriptions
        .find_by_id(&request.inscription_id, Some(&request.event_id))
        .await?
        .ok_or_else(|| CoreError::InscriptionNotFound(request.inscription_id.clone()))?;

    request.authority.check(&inscription)?;

    if !inscription.is_pending() {
        return Err(CoreError::validation(
            "payment can only be requested for pending registrations",
        ));
    }

    let live_charge: Option<Payment> = repos
        .payments
        .find_by_inscription(inscription.id(), inscription.event_id())
        .await?
        .filter(|payment| !payment.status().is_failure());
    if let Some(existing) = live_charge {
        let pix: Option<PixInstructions> = if existing.method() == PaymentMethod::Pix {
            fetch_pix(gateway, existing.external_payment_id()).await
        } else {
            None
        };
        return Ok(instructions(&inscription, &existing, None, pix, true));
    }

    let method: PaymentMethod = request
        .method
        .or_else(|| inscription.preferred_payment_method())
        .ok_or_else(|| CoreError::validation("a payment method is required"))?;

    let customer: Customer = resolve_customer(repos, gateway, inscription.registrant()).await?;

    let due_date: Date = now
        .date()
        .checked_add(Duration::days(PAYMENT_DUE_DAYS))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("computing the payment due date"),
        })?;

    let charge: Charge = gateway
        .create_charge(&ChargeRequest {
            customer_id: customer.id,
            method,
            amount: inscription.amount(),
            due_date,
            external_reference: external_reference(inscription.event_id(), inscription.id()),
            description: format!("Inscrição {}", inscription.id()),
        })
        .await?;

    let payment: Payment = Payment::from_parts(PaymentParts {
        id: new_id(),
        event_id: inscription.event_id().to_string(),
        inscription_id: inscription.id().to_string(),
        external_payment_id: charge.id.clone(),
        status: charge.status,
        amount: inscription.amount(),
        method,
        created_at: now,
        updated_at: now,
    });
    repos.payments.save(&payment).await?;

    inscription.attach_payment(&charge.id, now)?;
    repos.inscriptions.update(&inscription).await?;

    info!(
        event_id = %inscription.event_id(),
        inscription_id = %inscription.id(),
        payment_id = %charge.id,
        method = method.as_str(),
        "Charge created"
    );

    let pix: Option<PixInstructions> = if method == PaymentMethod::Pix {
        fetch_pix(gateway, &charge.id).await
    } else {
        None
    };
    Ok(instructions(
        &inscription,
        &payment,
        charge.invoice_url,
        pix,
        false,
    ))
}

async fn resolve_customer(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    registrant: &Registrant,
) -> Result<Customer, CoreError> {
    let request: CustomerRequest = match registrant {
        Registrant::Guest(guest) => CustomerRequest {
            name: guest.name.as_str().to_string(),
            cpf: guest.cpf.clone(),
            email: Some(guest.email.clone()),
            phone: Some(guest.phone.clone()),
        },
        Registrant::Account { user_id, .. } => {
            let user: User = repos
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| CoreError::UserNotFound(user_id.clone()))?;
            let cpf: Cpf = user.cpf.clone().ok_or_else(|| CoreError::Validation {
                message: String::from("a CPF is required to pay"),
                details: Some(String::from("add your CPF to your profile")),
            })?;
            CustomerRequest {
                name: user.name.as_str().to_string(),
                cpf,
                email: Some(user.email.clone()),
                phone: user.phone.clone(),
            }
        }
    };

    if let Some(customer) = gateway.find_customer_by_cpf(&request.cpf).await? {
        return Ok(customer);
    }
    Ok(gateway.create_customer(&request).await?)
}

async fn fetch_pix(gateway: &dyn PaymentGateway, charge_id: &str) -> Option<PixInstructions> {
    match gateway.get_pix_payload(charge_id).await {
        Ok(PixPayload {
            encoded_image,
            payload,
            expiration,
        }) => Some(PixInstructions {
            qr_code_image: encoded_image,
            copy_paste: payload,
            expiration,
        }),
        Err(err) => {
            warn!(payment_id = %charge_id, error = %err, "Could not fetch PIX payload");
            None
        }
    }
}

fn instructions(
    inscription: &Inscription,
    payment: &Payment,
    invoice_url: Option<String>,
    pix: Option<PixInstructions>,
    reused: bool,
) -> PaymentInstructions {
    PaymentInstructions {
        inscription_id: inscription.id().to_string(),
        payment_id: payment.external_payment_id().to_string(),
        status: payment.status(),
        method: payment.method(),
        amount: payment.amount().cents(),
        amount_formatted: payment.amount().formatted(),
        invoice_url,
        pix,
        reused,
    }
}
