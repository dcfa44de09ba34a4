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

//! Inscription lifecycle and payment reconciliation.
//!
//! Use cases are plain async functions over a [`Repositories`] bundle and,
//! where money is involved, a [`PaymentGateway`]. The caller supplies the
//! current instant so every rule that depends on time is testable.

mod accounts;
mod error;
mod events;
mod gateway;
mod inscriptions;
mod listing;
mod payments;
mod repository;
mod webhook;

#[cfg(test)]
mod tests;

pub use accounts::{RegisterAccount, register_account, update_profile};
pub use error::CoreError;
pub use events::{
    CLOSE_EXPIRED_JOB, ClosedEvents, NewCategory, NewEvent, close_expired_events, create_event,
    get_event, list_events, open_event,
};
pub use gateway::{
    Charge, ChargeRequest, Customer, CustomerRequest, GatewayError, PaymentGateway, PixPayload,
};
pub use inscriptions::{
    Authority, Cancellation, ConfirmInscriptionRequest, ConfirmedInscription,
    CreateGuestInscriptionRequest, CreateInscriptionRequest, ManualConfirmation,
    cancel_inscription, confirm_inscription_manually, create_guest_inscription,
    create_inscription,
};
pub use listing::{UserInscription, list_event_inscriptions, list_user_inscriptions};
pub use payments::{
    PAYMENT_DUE_DAYS, PaymentInstructions, PaymentRequest, PixInstructions, external_reference,
    request_inscription_payment,
};
pub use repository::{
    AuditLog, DEFAULT_LIMIT, EventFilter, EventRepository, InscriptionFilter,
    InscriptionRepository, MAX_LIMIT, Page, PaymentRepository, Repositories, RepositoryError,
    UserRepository,
};
pub use webhook::{
    FailurePolicy, GATEWAY_ACTOR, PaymentNotification, WebhookOutcome, process_payment_webhook,
};
