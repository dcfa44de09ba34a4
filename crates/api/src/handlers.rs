// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Each handler authorizes the caller, parses raw request fields into
//! domain values, delegates to a core use case and translates its errors.

use capela::{
    Authority, Cancellation, ClosedEvents, ConfirmInscriptionRequest,
    CreateGuestInscriptionRequest, CreateInscriptionRequest, EventFilter, InscriptionFilter,
    ManualConfirmation, NewCategory, NewEvent, Page, PaymentGateway, PaymentInstructions,
    PaymentRequest, RegisterAccount, Repositories, UserInscription,
};
use capela_domain::{
    BirthDate, Cpf, DomainError, Email, Event, EventStatus, Gender, GuestData, InscriptionRecord,
    InscriptionStatus, Money, PaymentMethod, PersonName, Phone, ProfileUpdate, Registrant, Tz,
    User,
};
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    AccountResponse, CloseExpiredEventsResponse, ConfirmInscriptionApiRequest,
    CreateEventApiRequest, CreateInscriptionApiRequest, EventResponse, GuestInput,
    InscriptionResponse, ListEventsResponse, ListInscriptionsResponse, ListQuery,
    ListUserInscriptionsResponse, RegisterAccountApiRequest, RequestPaymentApiRequest,
    UpdateProfileApiRequest,
};

/// Lists events.
///
/// Administrators see drafts and hidden events; everyone else only sees
/// visible, non-draft events.
///
/// # Errors
///
/// Returns an error if the status filter is unknown or storage fails.
pub async fn list_events(
    repos: &Repositories,
    actor: Option<&AuthenticatedActor>,
    query: &ListQuery,
) -> Result<ListEventsResponse, ApiError> {
    let status: Option<EventStatus> = parse_optional(query.status.as_deref())?;
    let filter: EventFilter = EventFilter {
        status,
        visible_only: !actor.is_some_and(AuthenticatedActor::is_admin),
        page: Page::new(query.limit, query.offset),
    };
    let events: Vec<Event> = capela::list_events(repos, filter)
        .await
        .map_err(translate_core_error)?;
    Ok(ListEventsResponse {
        count: events.len(),
        events,
    })
}

/// Fetches one event.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the event does not exist or is not
/// visible to the caller.
pub async fn get_event(
    repos: &Repositories,
    actor: Option<&AuthenticatedActor>,
    event_id: &str,
) -> Result<EventResponse, ApiError> {
    let include_hidden: bool = actor.is_some_and(AuthenticatedActor::is_admin);
    let event: Event = capela::get_event(repos, event_id, include_hidden)
        .await
        .map_err(translate_core_error)?;
    Ok(EventResponse { event })
}

/// Creates a draft event.
///
/// # Arguments
///
/// * `repos` - The repositories
/// * `actor` - The authenticated actor, who must be an administrator
/// * `request` - The event and its categories
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, a field is
/// malformed or the event is inconsistent.
pub async fn create_event(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    request: CreateEventApiRequest,
    now: OffsetDateTime,
) -> Result<EventResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "create_event")?;

    let start_date: Date = parse_date("startDate", &request.start_date)?;
    let end_date: Date = parse_date("endDate", &request.end_date)?;
    let categories: Vec<NewCategory> = request
        .categories
        .into_iter()
        .map(|category| {
            let price: Money =
                Money::parse_decimal(&category.price).map_err(translate_domain_error)?;
            Ok(NewCategory {
                id: category.id,
                name: category.name,
                price,
            })
        })
        .collect::<Result<_, ApiError>>()?;

    let event: Event = capela::create_event(
        repos,
        NewEvent {
            title: request.title,
            description: request.description,
            start_date,
            end_date,
            location: request.location,
            visible: request.visible,
            categories,
        },
        &actor.subject,
        now,
    )
    .await
    .map_err(translate_core_error)?;
    Ok(EventResponse { event })
}

/// Opens a draft event for registration.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the event does
/// not exist or it is not a draft.
pub async fn open_event(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    event_id: &str,
    now: OffsetDateTime,
) -> Result<EventResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "open_event")?;
    let event: Event = capela::open_event(repos, event_id, &actor.subject, now)
        .await
        .map_err(translate_core_error)?;
    Ok(EventResponse { event })
}

/// Registers for an event.
///
/// An authenticated caller registers their own account and must not send
/// guest data. An anonymous caller must send guest data.
///
/// # Arguments
///
/// * `repos` - The repositories
/// * `actor` - The authenticated actor, if a bearer token was presented
/// * `event_id` - The event to register for
/// * `request` - Category, preferred payment method and optional guest data
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if the registrant is ambiguous or malformed, the event
/// or category does not exist, the event is not open or the registrant
/// already holds a live inscription.
pub async fn create_inscription(
    repos: &Repositories,
    actor: Option<&AuthenticatedActor>,
    event_id: &str,
    request: CreateInscriptionApiRequest,
    now: OffsetDateTime,
) -> Result<InscriptionResponse, ApiError> {
    let preferred_payment_method: Option<PaymentMethod> =
        parse_optional(request.preferred_payment_method.as_deref())?;
    let guest: Option<GuestData> = request.guest.as_ref().map(parse_guest).transpose()?;
    let account: Option<(String, Option<Cpf>)> = actor.map(|a| (a.subject.clone(), None));

    let inscription: InscriptionRecord =
        match Registrant::from_options(account, guest).map_err(translate_domain_error)? {
            Registrant::Account { user_id, .. } => capela::create_inscription(
                repos,
                CreateInscriptionRequest {
                    user_id,
                    event_id: event_id.to_string(),
                    category_id: request.category_id,
                    preferred_payment_method,
                },
                now,
            )
            .await
            .map_err(translate_core_error)?,
            Registrant::Guest(guest) => capela::create_guest_inscription(
                repos,
                CreateGuestInscriptionRequest {
                    event_id: event_id.to_string(),
                    category_id: request.category_id,
                    guest,
                    preferred_payment_method,
                },
                now,
            )
            .await
            .map_err(translate_core_error)?,
        };

    Ok(InscriptionResponse {
        success: true,
        inscription,
    })
}

/// Lists an event's inscriptions for staff.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the status filter
/// is unknown or the event does not exist.
pub async fn list_event_inscriptions(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    event_id: &str,
    query: &ListQuery,
) -> Result<ListInscriptionsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_event_inscriptions")?;
    let status: Option<InscriptionStatus> = parse_optional(query.status.as_deref())?;
    let inscriptions: Vec<InscriptionRecord> = capela::list_event_inscriptions(
        repos,
        event_id,
        InscriptionFilter {
            status,
            page: Page::new(query.limit, query.offset),
        },
    )
    .await
    .map_err(translate_core_error)?;
    Ok(ListInscriptionsResponse {
        count: inscriptions.len(),
        inscriptions,
    })
}

/// Lists one account's inscriptions across events.
///
/// # Errors
///
/// Returns an error if a non-admin targets another account, the status
/// filter is unknown or the account does not exist.
pub async fn list_user_inscriptions(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    user_id: &str,
    query: &ListQuery,
) -> Result<ListUserInscriptionsResponse, ApiError> {
    AuthorizationService::authorize_account_access(actor, user_id)?;
    let status: Option<InscriptionStatus> = parse_optional(query.status.as_deref())?;
    let inscriptions: Vec<UserInscription> = capela::list_user_inscriptions(repos, user_id, status)
        .await
        .map_err(translate_core_error)?;
    Ok(ListUserInscriptionsResponse {
        count: inscriptions.len(),
        inscriptions,
    })
}

/// Confirms an inscription on an administrator's word.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the inscription
/// does not exist in the event or it is cancelled.
pub async fn confirm_inscription(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    actor: &AuthenticatedActor,
    inscription_id: &str,
    request: ConfirmInscriptionApiRequest,
    now: OffsetDateTime,
) -> Result<ManualConfirmation, ApiError> {
    AuthorizationService::authorize_admin(actor, "confirm_inscription")?;
    let confirmation: ManualConfirmation = capela::confirm_inscription_manually(
        repos,
        gateway,
        ConfirmInscriptionRequest {
            event_id: request.event_id,
            inscription_id: inscription_id.to_string(),
            confirmed_by: actor.subject.clone(),
        },
        now,
    )
    .await
    .map_err(translate_core_error)?;

    info!(
        inscription_id,
        confirmed_by = %actor.subject,
        asaas_payment_cancelled = confirmation.asaas_payment_cancelled,
        "Manual confirmation handled"
    );
    Ok(confirmation)
}

/// Cancels an inscription. Owners may cancel their own; staff any.
///
/// # Errors
///
/// Returns an error if the inscription does not exist, belongs to someone
/// else or is already cancelled.
pub async fn cancel_inscription(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    actor: &AuthenticatedActor,
    inscription_id: &str,
    now: OffsetDateTime,
) -> Result<Cancellation, ApiError> {
    let authority: Authority = actor.authority();
    capela::cancel_inscription(repos, gateway, inscription_id, &authority, now)
        .await
        .map_err(translate_core_error)
}

/// Creates or returns the gateway charge for a pending inscription.
///
/// # Errors
///
/// Returns an error if the method is unknown, the inscription does not
/// exist, is not the caller's, is not pending, or the gateway fails.
pub async fn request_payment(
    repos: &Repositories,
    gateway: &dyn PaymentGateway,
    actor: &AuthenticatedActor,
    inscription_id: &str,
    request: RequestPaymentApiRequest,
    now: OffsetDateTime,
) -> Result<PaymentInstructions, ApiError> {
    let method: Option<PaymentMethod> = parse_optional(request.method.as_deref())?;
    capela::request_inscription_payment(
        repos,
        gateway,
        PaymentRequest {
            event_id: request.event_id,
            inscription_id: inscription_id.to_string(),
            authority: actor.authority(),
            method,
        },
        now,
    )
    .await
    .map_err(translate_core_error)
}

/// Creates the caller's local account from their verified identity.
///
/// # Errors
///
/// Returns an error if the email is missing or malformed, a profile field
/// is malformed, the account exists or the CPF is taken.
pub async fn register_account(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    request: RegisterAccountApiRequest,
    now: OffsetDateTime,
) -> Result<AccountResponse, ApiError> {
    let email_input: String = request
        .email
        .or_else(|| actor.email.clone())
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("email"),
            message: String::from("an email address is required"),
        })?;
    let name_input: String = request
        .name
        .or_else(|| actor.name.clone())
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("a name is required"),
        })?;

    let today: Date = now.date();
    let user: User = capela::register_account(
        repos,
        RegisterAccount {
            subject_id: actor.subject.clone(),
            email: Email::parse(&email_input).map_err(translate_domain_error)?,
            name: PersonName::parse(&name_input).map_err(translate_domain_error)?,
            cpf: request
                .cpf
                .as_deref()
                .map(Cpf::parse)
                .transpose()
                .map_err(translate_domain_error)?,
            phone: request
                .phone
                .as_deref()
                .map(Phone::parse)
                .transpose()
                .map_err(translate_domain_error)?,
            birth_date: request
                .birth_date
                .as_deref()
                .map(|d| BirthDate::parse(d, today))
                .transpose()
                .map_err(translate_domain_error)?,
            gender: parse_optional(request.gender.as_deref())?,
        },
        now,
    )
    .await
    .map_err(translate_core_error)?;
    Ok(AccountResponse { user })
}

/// Returns the caller's account.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the caller has not registered.
pub async fn get_account(
    repos: &Repositories,
    actor: &AuthenticatedActor,
) -> Result<AccountResponse, ApiError> {
    let user: User = repos
        .users
        .find_by_id(&actor.subject)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to load account: {e}"),
        })?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("No account registered for '{}'", actor.subject),
        })?;
    Ok(AccountResponse { user })
}

/// Edits the caller's profile.
///
/// # Errors
///
/// Returns an error if a field is malformed, the caller has not registered
/// or the new CPF belongs to someone else.
pub async fn update_account(
    repos: &Repositories,
    actor: &AuthenticatedActor,
    request: UpdateProfileApiRequest,
    now: OffsetDateTime,
) -> Result<AccountResponse, ApiError> {
    let today: Date = now.date();
    let update: ProfileUpdate = ProfileUpdate {
        name: request
            .name
            .as_deref()
            .map(PersonName::parse)
            .transpose()
            .map_err(translate_domain_error)?,
        cpf: request
            .cpf
            .as_deref()
            .map(Cpf::parse)
            .transpose()
            .map_err(translate_domain_error)?,
        phone: request
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(translate_domain_error)?,
        birth_date: request
            .birth_date
            .as_deref()
            .map(|d| BirthDate::parse(d, today))
            .transpose()
            .map_err(translate_domain_error)?,
        gender: parse_optional::<Gender>(request.gender.as_deref())?,
    };
    let user: User = capela::update_profile(repos, &actor.subject, update, now)
        .await
        .map_err(translate_core_error)?;
    Ok(AccountResponse { user })
}

/// Runs the expiry sweep. Callers authenticate with the cron secret
/// before reaching this.
///
/// # Errors
///
/// Returns `Internal` if storage fails.
pub async fn close_expired_events(
    repos: &Repositories,
    tz: Tz,
    now: OffsetDateTime,
) -> Result<CloseExpiredEventsResponse, ApiError> {
    let closed: ClosedEvents = capela::close_expired_events(repos, tz, now)
        .await
        .map_err(translate_core_error)?;
    Ok(CloseExpiredEventsResponse {
        success: true,
        closed,
    })
}

fn parse_guest(input: &GuestInput) -> Result<GuestData, ApiError> {
    Ok(GuestData {
        name: PersonName::parse(&input.name).map_err(translate_domain_error)?,
        email: Email::parse(&input.email).map_err(translate_domain_error)?,
        phone: Phone::parse(&input.phone).map_err(translate_domain_error)?,
        cpf: Cpf::parse(&input.cpf).map_err(translate_domain_error)?,
    })
}

fn parse_optional<T>(input: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()
        .map_err(translate_domain_error)
}

fn parse_date(field: &str, input: &str) -> Result<Date, ApiError> {
    Date::parse(
        input.trim(),
        &time::format_description::well_known::Iso8601::DATE,
    )
    .map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{input}' is not a YYYY-MM-DD date: {e}"),
    })
}
