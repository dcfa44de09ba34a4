// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry raw strings; handlers parse them into domain values so
//! that every validation failure is reported against the offending field.

use capela::{ClosedEvents, UserInscription};
use capela_domain::{Event, InscriptionRecord, User};
use serde::{Deserialize, Serialize};

/// Guest contact data as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
}

/// API request to register for an event.
///
/// Authenticated callers register their account and must omit `guest`;
/// anonymous callers must supply it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInscriptionApiRequest {
    pub category_id: String,
    /// `pix`, `credit_card` or `boleto`.
    #[serde(default)]
    pub preferred_payment_method: Option<String>,
    #[serde(default)]
    pub guest: Option<GuestInput>,
}

/// API request for an administrator confirming a registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInscriptionApiRequest {
    pub event_id: String,
}

/// API request for payment instructions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPaymentApiRequest {
    pub event_id: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// A category as submitted with a new event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Decimal reais, e.g. `"180.00"`.
    pub price: String,
}

/// API request to create an event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventApiRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`.
    pub end_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub categories: Vec<CategoryInput>,
}

const fn default_visible() -> bool {
    true
}

/// API request to create the caller's account.
///
/// The account id and, unless given here, the email come from the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountApiRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// API request to edit the caller's profile. Absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileApiRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Query parameters for paged listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// API response carrying one inscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InscriptionResponse {
    pub success: bool,
    pub inscription: InscriptionRecord,
}

/// API response for listing an event's inscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListInscriptionsResponse {
    pub inscriptions: Vec<InscriptionRecord>,
    pub count: usize,
}

/// API response for listing an account's inscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUserInscriptionsResponse {
    pub inscriptions: Vec<UserInscription>,
    pub count: usize,
}

/// API response carrying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub event: Event,
}

/// API response for listing events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEventsResponse {
    pub events: Vec<Event>,
    pub count: usize,
}

/// API response carrying the caller's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountResponse {
    pub user: User,
}

/// API response for the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseExpiredEventsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub closed: ClosedEvents,
}
