// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! Asaas adapter for the payment gateway contract.
//!
//! Every request carries the account's API key in the `access_token`
//! header. A 404 from the gateway is reported as
//! [`GatewayError::NotFound`]; any other non-success status is reported as
//! [`GatewayError::Rejected`] with the gateway's own error descriptions.

mod client;
mod wire;

#[cfg(test)]
mod tests;

pub use client::{AsaasClient, AsaasConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};

pub use capela::GatewayError;
