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

mod config;
mod session;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use capela::{
    Cancellation, FailurePolicy, ManualConfirmation, PaymentGateway, PaymentInstructions,
    PaymentNotification, Repositories,
};
use capela_api::{
    AccountResponse, ApiError, AuthError, CloseExpiredEventsResponse, ConfirmInscriptionApiRequest,
    CreateEventApiRequest, CreateInscriptionApiRequest, EventResponse, InscriptionResponse,
    JwtTokenVerifier, ListEventsResponse, ListInscriptionsResponse, ListQuery,
    ListUserInscriptionsResponse, RegisterAccountApiRequest, RequestPaymentApiRequest,
    TokenVerifier, UpdateProfileApiRequest, WebhookAck, WebhookResponse, handle_payment_webhook,
    parse_payment_notification, verify_cron_secret, verify_webhook_token, webhook_ack,
};
use capela_domain::Tz;
use capela_gateway::{AsaasClient, AsaasConfig};
use capela_persistence::SqliteStore;
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::config::{AppConfig, Args};
use crate::session::{MaybeActor, SessionActor};

/// Header carrying the webhook token configured in the Asaas dashboard.
const WEBHOOK_TOKEN_HEADER: &str = "asaas-access-token";

/// Runtime settings handlers consult on every request.
#[derive(Debug, Clone)]
struct Settings {
    webhook_token: Option<String>,
    cron_secret: Option<String>,
    timezone: Tz,
    failure_policy: FailurePolicy,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    repos: Repositories,
    gateway: Arc<dyn PaymentGateway>,
    verifier: Arc<dyn TokenVerifier>,
    settings: Arc<Settings>,
}

/// Standard error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always true.
    error: bool,
    /// Error message.
    message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } | ApiError::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        Self::from(ApiError::from(err))
    }
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn handle_list_events(
    AxumState(app_state): AxumState<AppState>,
    MaybeActor(actor): MaybeActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListEventsResponse>, HttpError> {
    let response: ListEventsResponse =
        capela_api::list_events(&app_state.repos, actor.as_ref(), &query).await?;
    Ok(Json(response))
}

async fn handle_get_event(
    AxumState(app_state): AxumState<AppState>,
    MaybeActor(actor): MaybeActor,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>, HttpError> {
    let response: EventResponse =
        capela_api::get_event(&app_state.repos, actor.as_ref(), &event_id).await?;
    Ok(Json(response))
}

async fn handle_create_event(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateEventApiRequest>,
) -> Result<(StatusCode, Json<EventResponse>), HttpError> {
    info!(subject = %actor.subject, title = %req.title, "Handling create_event request");
    let response: EventResponse =
        capela_api::create_event(&app_state.repos, &actor, req, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_open_event(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>, HttpError> {
    info!(subject = %actor.subject, event_id = %event_id, "Handling open_event request");
    let response: EventResponse =
        capela_api::open_event(&app_state.repos, &actor, &event_id, OffsetDateTime::now_utc())
            .await?;
    Ok(Json(response))
}

async fn handle_create_inscription(
    AxumState(app_state): AxumState<AppState>,
    MaybeActor(actor): MaybeActor,
    Path(event_id): Path<String>,
    Json(req): Json<CreateInscriptionApiRequest>,
) -> Result<(StatusCode, Json<InscriptionResponse>), HttpError> {
    info!(
        event_id = %event_id,
        category_id = %req.category_id,
        guest = req.guest.is_some(),
        "Handling create_inscription request"
    );
    let response: InscriptionResponse = capela_api::create_inscription(
        &app_state.repos,
        actor.as_ref(),
        &event_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_list_event_inscriptions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(event_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListInscriptionsResponse>, HttpError> {
    let response: ListInscriptionsResponse =
        capela_api::list_event_inscriptions(&app_state.repos, &actor, &event_id, &query).await?;
    Ok(Json(response))
}

async fn handle_confirm_inscription(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(inscription_id): Path<String>,
    Json(req): Json<ConfirmInscriptionApiRequest>,
) -> Result<Json<ManualConfirmation>, HttpError> {
    info!(
        subject = %actor.subject,
        event_id = %req.event_id,
        inscription_id = %inscription_id,
        "Handling confirm_inscription request"
    );
    let response: ManualConfirmation = capela_api::confirm_inscription(
        &app_state.repos,
        app_state.gateway.as_ref(),
        &actor,
        &inscription_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

async fn handle_cancel_inscription(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(inscription_id): Path<String>,
) -> Result<Json<Cancellation>, HttpError> {
    info!(
        subject = %actor.subject,
        inscription_id = %inscription_id,
        "Handling cancel_inscription request"
    );
    let response: Cancellation = capela_api::cancel_inscription(
        &app_state.repos,
        app_state.gateway.as_ref(),
        &actor,
        &inscription_id,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

async fn handle_request_payment(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(inscription_id): Path<String>,
    Json(req): Json<RequestPaymentApiRequest>,
) -> Result<Json<PaymentInstructions>, HttpError> {
    let response: PaymentInstructions = capela_api::request_payment(
        &app_state.repos,
        app_state.gateway.as_ref(),
        &actor,
        &inscription_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

async fn handle_list_user_inscriptions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListUserInscriptionsResponse>, HttpError> {
    let response: ListUserInscriptionsResponse =
        capela_api::list_user_inscriptions(&app_state.repos, &actor, &user_id, &query).await?;
    Ok(Json(response))
}

async fn handle_register_account(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<RegisterAccountApiRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), HttpError> {
    let response: AccountResponse =
        capela_api::register_account(&app_state.repos, &actor, req, OffsetDateTime::now_utc())
            .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_get_account(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<AccountResponse>, HttpError> {
    let response: AccountResponse = capela_api::get_account(&app_state.repos, &actor).await?;
    Ok(Json(response))
}

async fn handle_update_account(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<UpdateProfileApiRequest>,
) -> Result<Json<AccountResponse>, HttpError> {
    let response: AccountResponse =
        capela_api::update_account(&app_state.repos, &actor, req, OffsetDateTime::now_utc())
            .await?;
    Ok(Json(response))
}

async fn handle_webhook_ack() -> Json<WebhookAck> {
    Json(webhook_ack())
}

async fn handle_asaas_webhook(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, HttpError> {
    let presented: Option<&str> = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    verify_webhook_token(app_state.settings.webhook_token.as_deref(), presented)?;

    let notification: PaymentNotification = parse_payment_notification(&body)?;
    info!(
        event = %notification.event,
        payment_id = %notification.payment_id,
        status = %notification.status,
        "Handling Asaas webhook"
    );

    let response: WebhookResponse = handle_payment_webhook(
        &app_state.repos,
        &notification,
        app_state.settings.failure_policy,
        OffsetDateTime::now_utc(),
    )
    .await;
    Ok(Json(response))
}

async fn handle_close_expired_events(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<CloseExpiredEventsResponse>, HttpError> {
    let presented: Option<&str> = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    verify_cron_secret(app_state.settings.cron_secret.as_deref(), presented)?;

    let response: CloseExpiredEventsResponse = capela_api::close_expired_events(
        &app_state.repos,
        app_state.settings.timezone,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(response))
}

/// Builds the application router with all routes.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/events", get(handle_list_events).post(handle_create_event))
        .route("/events/{event_id}", get(handle_get_event))
        .route("/events/{event_id}/open", post(handle_open_event))
        .route(
            "/events/{event_id}/inscriptions",
            get(handle_list_event_inscriptions).post(handle_create_inscription),
        )
        .route(
            "/inscriptions/{inscription_id}/confirm",
            post(handle_confirm_inscription),
        )
        .route(
            "/inscriptions/{inscription_id}/cancel",
            post(handle_cancel_inscription),
        )
        .route(
            "/inscriptions/{inscription_id}/payment",
            post(handle_request_payment),
        )
        .route(
            "/users/{user_id}/inscriptions",
            get(handle_list_user_inscriptions),
        )
        .route(
            "/account",
            get(handle_get_account)
                .post(handle_register_account)
                .patch(handle_update_account),
        )
        .route(
            "/webhooks/asaas",
            get(handle_webhook_ack).post(handle_asaas_webhook),
        )
        .route(
            "/cron/close-expired-events",
            post(handle_close_expired_events),
        )
        .with_state(app_state)
}

/// Builds every dependency named by the configuration.
fn build_app_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let store: SqliteStore = if let Some(db_path) = &config.database {
        info!("Using file-based database at: {}", db_path);
        SqliteStore::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqliteStore::new_in_memory()?
    };

    let gateway: AsaasClient = AsaasClient::new(AsaasConfig::with_base_url(
        &config.asaas_api_key,
        &config.asaas_base_url,
    ))?;
    info!(base_url = %gateway.base_url(), "Asaas client ready");

    if config.webhook_token.is_none() {
        warn!("No webhook token configured; webhook requests are not authenticated");
    }

    Ok(AppState {
        repos: Repositories::from_store(Arc::new(store)),
        gateway: Arc::new(gateway),
        verifier: Arc::new(JwtTokenVerifier::hs256(
            config.jwt_secret.as_bytes(),
            config.jwt_issuer.as_deref(),
        )),
        settings: Arc::new(Settings {
            webhook_token: config.webhook_token.clone(),
            cron_secret: config.cron_secret.clone(),
            timezone: config.timezone,
            failure_policy: config.failure_policy,
        }),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Capela Server");

    let config: AppConfig = AppConfig::from_args(args)?;
    info!(
        timezone = %config.timezone,
        failure_policy = config.failure_policy.as_str(),
        "Configuration loaded"
    );

    let app: Router = build_router(build_app_state(&config)?);

    info!("Server listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
