// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gateway notification boundary.
//!
//! Only a structurally malformed payload is rejected. Every other outcome,
//! including internal failures, is acknowledged so the gateway stops
//! retrying; failures are reported in the body's `error` field.

use capela::{FailurePolicy, PaymentNotification, Repositories, WebhookOutcome};
use capela_domain::Money;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::error::ApiError;

/// Raw notification as posted by the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    payment: Option<WebhookPayment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayment {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    external_reference: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    billing_type: Option<String>,
}

/// Body returned for every accepted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Option<WebhookOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body returned by the endpoint's `GET` liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub message: &'static str,
}

/// Static acknowledgment for the gateway's endpoint check.
#[must_use]
pub const fn webhook_ack() -> WebhookAck {
    WebhookAck {
        status: "ok",
        message: "Asaas webhook endpoint is active",
    }
}

/// Parses and structurally validates a notification body.
///
/// # Errors
///
/// Returns `InvalidInput` if the body is not JSON or lacks the event type,
/// the payment object, or the payment's id or status.
pub fn parse_payment_notification(body: &[u8]) -> Result<PaymentNotification, ApiError> {
    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidInput {
            field: String::from("body"),
            message: format!("Malformed webhook payload: {e}"),
        })?;

    let event: String = required("event", payload.event)?;
    let payment: WebhookPayment = payload.payment.ok_or_else(|| missing("payment"))?;
    let payment_id: String = required("payment.id", payment.id)?;
    let status: String = required("payment.status", payment.status)?;

    let value: Option<Money> = payment.value.and_then(|reais| {
        Money::parse_decimal(&format!("{reais:.2}"))
            .inspect_err(|e| {
                warn!(payment_id = %payment_id, error = %e, "Ignoring unusable payment value");
            })
            .ok()
    });

    Ok(PaymentNotification {
        event,
        payment_id,
        status,
        external_reference: payment.external_reference,
        value,
        billing_type: payment.billing_type,
    })
}

/// Applies a validated notification and builds the acknowledgment.
pub async fn handle_payment_webhook(
    repos: &Repositories,
    notification: &PaymentNotification,
    policy: FailurePolicy,
    now: OffsetDateTime,
) -> WebhookResponse {
    match capela::process_payment_webhook(repos, notification, policy, now).await {
        Ok(outcome) => WebhookResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
        },
        Err(err) => {
            error!(
                payment_id = %notification.payment_id,
                event = %notification.event,
                error = %err,
                "Webhook processing failed"
            );
            WebhookResponse {
                success: false,
                outcome: None,
                error: Some(err.to_string()),
            }
        }
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Webhook payload is missing '{field}'"),
    }
}
