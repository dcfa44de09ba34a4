// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer token extraction and authentication for the server.
//!
//! This module provides Axum extractors for verifying identity-provider
//! tokens and resolving them to an [`AuthenticatedActor`].

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use capela_api::{AuthenticatedActor, AuthenticationService};
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated callers.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if the Authorization header is missing or
/// malformed, or the token is refused.
pub struct SessionActor(pub AuthenticatedActor);

/// Extractor for routes open to anonymous callers.
///
/// A missing Authorization header yields `None`; a present but invalid one
/// is still rejected.
pub struct MaybeActor(pub Option<AuthenticatedActor>);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?;
        authenticate(state, token).await.map(Self)
    }
}

impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => authenticate(state, token).await.map(|actor| Self(Some(actor))),
            None => Ok(Self(None)),
        }
    }
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedActor, SessionError> {
    let actor: AuthenticatedActor =
        AuthenticationService::authenticate(&state.repos, state.verifier.as_ref(), token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Token validation failed");
                SessionError::InvalidToken(e.to_string())
            })?;

    debug!(
        subject = %actor.subject,
        role = ?actor.role,
        registered = actor.registered,
        "Token validated successfully"
    );
    Ok(actor)
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, SessionError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value: &str = header.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        SessionError::InvalidAuthorizationHeader
    })?;
    value.strip_prefix("Bearer ").map(Some).ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })
}

/// Token extraction errors.
///
/// These errors are returned when authentication fails and are
/// automatically converted to HTTP responses.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Token verification failed.
    InvalidToken(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidToken(reason) => reason,
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
