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

//! API boundary for the parish website.
//!
//! Authenticates bearer tokens, authorizes callers, turns raw request
//! fields into domain values and translates core errors into the small
//! set of API errors the HTTP layer maps to status codes.

mod auth;
mod error;
mod handlers;
mod request_response;
mod webhook;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, JwtTokenVerifier,
    TokenClaims, TokenError, TokenVerifier, verify_cron_secret, verify_webhook_token,
};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    cancel_inscription, close_expired_events, confirm_inscription, create_event,
    create_inscription, get_account, get_event, list_event_inscriptions, list_events,
    list_user_inscriptions, open_event, register_account, request_payment, update_account,
};
pub use request_response::{
    AccountResponse, CategoryInput, CloseExpiredEventsResponse, ConfirmInscriptionApiRequest,
    CreateEventApiRequest, CreateInscriptionApiRequest, EventResponse, GuestInput,
    InscriptionResponse, ListEventsResponse, ListInscriptionsResponse, ListQuery,
    ListUserInscriptionsResponse, RegisterAccountApiRequest, RequestPaymentApiRequest,
    UpdateProfileApiRequest,
};
pub use webhook::{
    WebhookAck, WebhookResponse, handle_payment_webhook, parse_payment_notification, webhook_ack,
};
