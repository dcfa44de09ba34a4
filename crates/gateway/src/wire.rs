// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Asaas request and response bodies.

use capela::{Charge, Customer, GatewayError, PixPayload};
use capela_domain::{Money, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBody<'a> {
    pub name: &'a str,
    pub cpf_cnpj: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl From<CustomerResource> for Customer {
    fn from(resource: CustomerResource) -> Self {
        Self {
            id: resource.id,
            name: resource.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomerList {
    #[serde(default)]
    pub data: Vec<CustomerResource>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBody<'a> {
    pub customer: &'a str,
    pub billing_type: &'static str,
    /// Reais, as the gateway expects a decimal number.
    pub value: f64,
    pub due_date: String,
    pub external_reference: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResource {
    pub id: String,
    pub status: String,
    pub value: f64,
    pub billing_type: String,
    pub invoice_url: Option<String>,
    pub external_reference: Option<String>,
}

impl ChargeResource {
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidResponse` if the status, billing type
    /// or value cannot be interpreted.
    pub fn into_charge(self) -> Result<Charge, GatewayError> {
        let status: PaymentStatus = PaymentStatus::from_gateway(&self.status)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let method: PaymentMethod = self
            .billing_type
            .parse::<PaymentMethod>()
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let amount: Money = money_from_reais(self.value)?;
        Ok(Charge {
            id: self.id,
            status,
            amount,
            method,
            invoice_url: self.invoice_url,
            external_reference: self.external_reference,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixQrCodeResource {
    pub encoded_image: String,
    pub payload: String,
    pub expiration_date: Option<String>,
}

impl From<PixQrCodeResource> for PixPayload {
    fn from(resource: PixQrCodeResource) -> Self {
        Self {
            encoded_image: resource.encoded_image,
            payload: resource.payload,
            expiration: resource.expiration_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorItem {
    pub code: Option<String>,
    pub description: String,
}

/// Extracts the gateway's error descriptions, falling back to the raw body.
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .iter()
            .map(|item| match &item.code {
                Some(code) => format!("{code}: {}", item.description),
                None => item.description.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ if body.trim().is_empty() => String::from("no error details"),
        _ => body.trim().to_string(),
    }
}

/// # Errors
///
/// Returns `GatewayError::InvalidResponse` if the amount is negative or
/// not a finite number.
pub fn money_from_reais(value: f64) -> Result<Money, GatewayError> {
    if !value.is_finite() {
        return Err(GatewayError::InvalidResponse(format!(
            "charge value is not a number: {value}"
        )));
    }
    Money::parse_decimal(&format!("{value:.2}"))
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

/// # Errors
///
/// Returns `GatewayError::InvalidResponse` if the decimal form does not parse.
pub fn reais_from_money(amount: Money) -> Result<f64, GatewayError> {
    amount
        .to_decimal_string()
        .parse::<f64>()
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

/// Formats a due date as `YYYY-MM-DD`.
#[must_use]
pub fn due_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
