// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is issued elsewhere. This module only verifies bearer tokens,
//! resolves the subject to a local account (if one exists yet) and decides
//! what that caller may do.

use capela::{Authority, Repositories};
use capela_domain::{Role, User};
use constant_time_eq::constant_time_eq;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Claims read from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity provider subject; becomes the account id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Reasons a bearer token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Verifies bearer tokens issued by the identity provider.
pub trait TokenVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `TokenError` if the signature, expiry or issuer is not acceptable.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// HS256 verifier for tokens signed with a shared secret.
pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Creates a verifier.
    ///
    /// # Arguments
    ///
    /// * `secret` - The shared signing secret
    /// * `issuer` - When set, tokens must carry this `iss`
    #[must_use]
    pub fn hs256(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation: Validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

/// A caller whose bearer token was verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// Identity provider subject.
    pub subject: String,
    /// Email claimed by the token.
    pub email: Option<String>,
    /// Display name claimed by the token.
    pub name: Option<String>,
    /// Role of the local account, `User` until one exists.
    pub role: Role,
    /// Whether a local account exists for the subject.
    pub registered: bool,
}

impl AuthenticatedActor {
    /// Creates an actor for a registered account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            subject: user.id.clone(),
            email: Some(user.email.as_str().to_string()),
            name: Some(user.name.as_str().to_string()),
            role: user.role,
            registered: true,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The authority this actor acts with on existing inscriptions.
    #[must_use]
    pub fn authority(&self) -> Authority {
        if self.is_admin() {
            Authority::Admin(self.subject.clone())
        } else {
            Authority::Owner(self.subject.clone())
        }
    }
}

/// Authentication service for bearer tokens.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies a token and resolves its subject to a local account.
    ///
    /// A valid token for a subject without an account still authenticates;
    /// the actor is then an unregistered `User`.
    ///
    /// # Arguments
    ///
    /// * `repos` - Storage handles
    /// * `verifier` - The token verifier
    /// * `token` - The raw bearer token
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the token is refused or
    /// the account lookup fails.
    pub async fn authenticate(
        repos: &Repositories,
        verifier: &dyn TokenVerifier,
        token: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let claims: TokenClaims = verifier.verify(token).map_err(|e| {
            debug!(error = %e, "Bearer token refused");
            AuthError::AuthenticationFailed {
                reason: e.to_string(),
            }
        })?;

        let user: Option<User> = repos.users.find_by_id(&claims.sub).await.map_err(|e| {
            AuthError::AuthenticationFailed {
                reason: format!("account lookup failed: {e}"),
            }
        })?;

        Ok(match user {
            Some(user) => AuthenticatedActor::from_user(&user),
            None => AuthenticatedActor {
                subject: claims.sub,
                email: claims.email,
                name: claims.name,
                role: Role::User,
                registered: false,
            },
        })
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an administrator.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action being attempted, for the error report
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks that the actor may read an account's data.
    ///
    /// Users may read their own; administrators may read anyone's.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-admin targets another account.
    pub fn authorize_account_access(
        actor: &AuthenticatedActor,
        user_id: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.subject == user_id {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("read_account"),
                required_role: String::from("Admin"),
            })
        }
    }
}

/// Compares a presented webhook token with the configured one.
///
/// When no token is configured every request is accepted.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` on a missing or different token.
pub fn verify_webhook_token(configured: Option<&str>, presented: Option<&str>) -> Result<(), AuthError> {
    let Some(expected) = configured else {
        return Ok(());
    };
    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(AuthError::AuthenticationFailed {
            reason: String::from("webhook token mismatch"),
        }),
        None => Err(AuthError::AuthenticationFailed {
            reason: String::from("missing webhook token"),
        }),
    }
}

/// Checks the bearer secret presented by the scheduler.
///
/// Unlike the webhook token, an unconfigured secret refuses every request.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` when no secret is configured,
/// none was presented, or they differ.
pub fn verify_cron_secret(configured: Option<&str>, presented: Option<&str>) -> Result<(), AuthError> {
    let Some(expected) = configured else {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("cron secret is not configured"),
        });
    };
    match presented {
        Some(secret) if constant_time_eq(secret.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(AuthError::AuthenticationFailed {
            reason: String::from("invalid cron secret"),
        }),
    }
}
