// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment gateway contract.

use async_trait::async_trait;
use capela_domain::{Cpf, Email, Money, PaymentMethod, PaymentStatus, Phone};
use time::Date;

/// Errors reported by a payment gateway adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The gateway answered but refused the request.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Error description returned by the gateway.
        message: String,
    },
    /// The referenced customer or charge does not exist at the gateway.
    #[error("gateway resource not found: {0}")]
    NotFound(String),
    /// The gateway could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway answered with something we could not interpret.
    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Data needed to register a paying customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRequest {
    pub name: String,
    pub cpf: Cpf,
    pub email: Option<Email>,
    pub phone: Option<Phone>,
}

/// A customer as known to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
}

/// Data needed to create a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub method: PaymentMethod,
    pub amount: Money,
    pub due_date: Date,
    /// Round-tripped by the gateway in webhook notifications.
    pub external_reference: String,
    pub description: String,
}

/// A charge as known to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    pub status: PaymentStatus,
    pub amount: Money,
    pub method: PaymentMethod,
    pub invoice_url: Option<String>,
    pub external_reference: Option<String>,
}

/// PIX copy-and-paste code and QR image for a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixPayload {
    /// Base64 PNG of the QR code.
    pub encoded_image: String,
    /// The "copia e cola" payload.
    pub payload: String,
    pub expiration: Option<String>,
}

/// Operations the core needs from a payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the gateway rejects or cannot be reached.
    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError>;

    /// # Errors
    ///
    /// Returns an error if the gateway cannot be reached.
    async fn find_customer_by_cpf(&self, cpf: &Cpf) -> Result<Option<Customer>, GatewayError>;

    /// # Errors
    ///
    /// Returns an error if the gateway rejects or cannot be reached.
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError>;

    /// Cancels (deletes) an unpaid charge.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway rejects or cannot be reached.
    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if the charge does not exist.
    async fn get_charge(&self, charge_id: &str) -> Result<Charge, GatewayError>;

    /// # Errors
    ///
    /// Returns an error if the charge is not a PIX charge or the gateway fails.
    async fn get_pix_payload(&self, charge_id: &str) -> Result<PixPayload, GatewayError>;
}
