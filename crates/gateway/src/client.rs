// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for the Asaas v3 API.

use crate::wire::{
    ChargeBody, ChargeResource, CustomerBody, CustomerList, CustomerResource, PixQrCodeResource,
    due_date, error_message, reais_from_money,
};
use async_trait::async_trait;
use capela::{
    Charge, ChargeRequest, Customer, CustomerRequest, GatewayError, PaymentGateway, PixPayload,
};
use capela_domain::{Cpf, Email, Phone};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Asaas sandbox API root.
pub const SANDBOX_BASE_URL: &str = "https://api-sandbox.asaas.com/v3";
/// Asaas production API root.
pub const PRODUCTION_BASE_URL: &str = "https://api.asaas.com/v3";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for [`AsaasClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsaasConfig {
    pub api_key: String,
    /// API root without a trailing slash, e.g. [`SANDBOX_BASE_URL`].
    pub base_url: String,
    pub timeout: Duration,
}

impl AsaasConfig {
    /// Sandbox settings with the default timeout.
    #[must_use]
    pub fn sandbox(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: String::from(SANDBOX_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Settings for an explicit API root with the default timeout.
    #[must_use]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`PaymentGateway`] backed by the Asaas REST API.
#[derive(Debug, Clone)]
pub struct AsaasClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AsaasClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: AsaasConfig) -> Result<Self, GatewayError> {
        let http: reqwest::Client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("capela/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// The API root requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request and decodes a successful JSON body.
    ///
    /// `resource` names what was asked for, for `NotFound` reports.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, GatewayError> {
        let response = request
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!(resource = %resource, error = %e, "Gateway request failed");
                GatewayError::Unavailable(e.to_string())
            })?;

        let status: StatusCode = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default();
            let message: String = error_message(&body);
            warn!(
                resource = %resource,
                status = status.as_u16(),
                message = %message,
                "Gateway rejected request"
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for AsaasClient {
    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError> {
        let body: CustomerBody<'_> = CustomerBody {
            name: &request.name,
            cpf_cnpj: request.cpf.as_str(),
            email: request.email.as_ref().map(Email::as_str),
            mobile_phone: request.phone.as_ref().map(Phone::as_str),
        };
        let created: CustomerResource = self
            .send(self.http.post(self.url("/customers")).json(&body), "customer")
            .await?;
        info!(customer_id = %created.id, "Gateway customer created");
        Ok(created.into())
    }

    async fn find_customer_by_cpf(&self, cpf: &Cpf) -> Result<Option<Customer>, GatewayError> {
        let list: CustomerList = self
            .send(
                self.http
                    .get(self.url("/customers"))
                    .query(&[("cpfCnpj", cpf.as_str())]),
                "customer",
            )
            .await?;
        let found: Option<Customer> = list.data.into_iter().next().map(Customer::from);
        debug!(found = found.is_some(), "Gateway customer lookup");
        Ok(found)
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        let body: ChargeBody<'_> = ChargeBody {
            customer: &request.customer_id,
            billing_type: request.method.billing_type(),
            value: reais_from_money(request.amount)?,
            due_date: due_date(request.due_date),
            external_reference: &request.external_reference,
            description: &request.description,
        };
        let created: ChargeResource = self
            .send(self.http.post(self.url("/payments")).json(&body), "charge")
            .await?;
        let charge: Charge = created.into_charge()?;
        info!(
            payment_id = %charge.id,
            external_reference = %request.external_reference,
            "Gateway charge created"
        );
        Ok(charge)
    }

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value = self
            .send(
                self.http.delete(self.url(&format!("/payments/{charge_id}"))),
                charge_id,
            )
            .await?;
        info!(payment_id = %charge_id, "Gateway charge cancelled");
        Ok(())
    }

    async fn get_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
        let resource: ChargeResource = self
            .send(
                self.http.get(self.url(&format!("/payments/{charge_id}"))),
                charge_id,
            )
            .await?;
        resource.into_charge()
    }

    async fn get_pix_payload(&self, charge_id: &str) -> Result<PixPayload, GatewayError> {
        let resource: PixQrCodeResource = self
            .send(
                self.http
                    .get(self.url(&format!("/payments/{charge_id}/pixQrCode"))),
                charge_id,
            )
            .await?;
        Ok(resource.into())
    }
}
