// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage contracts consumed by the use cases.
//!
//! Every method is async and object safe so the server can hold each
//! repository as an `Arc<dyn ...>` and tests can substitute in-memory fakes.

use async_trait::async_trait;
use capela_audit::AuditEvent;
use capela_domain::{
    Category, Cpf, Email, Event, EventStatus, Inscription, InscriptionStatus, Payment, Tz, User,
};
use std::sync::Arc;
use time::OffsetDateTime;

/// Default page size for listings.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors reported by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or the query failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A uniqueness constraint rejected the write.
    #[error("conflicting record: {0}")]
    Conflict(String),
    /// A stored row could not be turned back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// An update targeted a row that does not exist.
    #[error("record not found: {0}")]
    Missing(String),
}

/// Page window for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Builds a page, clamping `limit` to `1..=100` and defaulting it to 20.
    #[must_use]
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter for inscriptions of one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InscriptionFilter {
    pub status: Option<InscriptionStatus>,
    pub page: Page,
}

/// Filter for event listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    /// Only visible, non-draft events.
    pub visible_only: bool,
    pub page: Page,
}

#[async_trait]
pub trait InscriptionRepository: Send + Sync {
    /// Finds an inscription, optionally requiring it to belong to `event_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_id(
        &self,
        id: &str,
        event_id: Option<&str>,
    ) -> Result<Option<Inscription>, RepositoryError>;

    /// Finds the non-cancelled inscription of an account for an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_event_and_user(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<Inscription>, RepositoryError>;

    /// Finds the non-cancelled inscription carrying `cpf` for an event,
    /// whether it belongs to an account or a guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError>;

    /// Finds the non-cancelled guest inscription carrying `cpf` for an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_guest_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError>;

    /// Lists inscriptions of an event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_event(
        &self,
        event_id: &str,
        filter: InscriptionFilter,
    ) -> Result<Vec<Inscription>, RepositoryError>;

    /// Lists all inscriptions of an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_user(
        &self,
        user_id: &str,
        status: Option<InscriptionStatus>,
    ) -> Result<Vec<Inscription>, RepositoryError>;

    /// Inserts a new inscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a non-cancelled inscription for
    /// the same account or CPF already exists for the event.
    async fn save(&self, inscription: &Inscription) -> Result<(), RepositoryError>;

    /// Persists the mutable fields of an existing inscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Missing` if it was never saved.
    async fn update(&self, inscription: &Inscription) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, RepositoryError>;

    /// Lists events by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_all(&self, filter: EventFilter) -> Result<Vec<Event>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_category(
        &self,
        event_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_categories(&self, event_id: &str) -> Result<Vec<Category>, RepositoryError>;

    /// Finds open events whose parish-local end day is over at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_expired_open_events(
        &self,
        now: OffsetDateTime,
        tz: Tz,
    ) -> Result<Vec<Event>, RepositoryError>;

    /// Inserts an event together with its categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the id is taken.
    async fn save(&self, event: &Event) -> Result<(), RepositoryError>;

    /// Persists status and timestamps of an existing event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Missing` if it was never saved.
    async fn update(&self, event: &Event) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Finds the most recent charge for an inscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Option<Payment>, RepositoryError>;

    /// Lists every charge ever created for an inscription, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_all_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Vec<Payment>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Payment>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails or the external id is taken.
    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError>;

    /// # Errors
    ///
    /// Returns `RepositoryError::Missing` if it was never saved.
    async fn update(&self, payment: &Payment) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, RepositoryError>;

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id, email or CPF is taken.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new CPF is taken.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
}

/// Append-only sink for audit events.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Stores an event and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent, RepositoryError>;

    /// Lists audit events for one event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_event(&self, event_id: &str) -> Result<Vec<AuditEvent>, RepositoryError>;
}

/// The storage handles a use case needs.
#[derive(Clone)]
pub struct Repositories {
    pub inscriptions: Arc<dyn InscriptionRepository>,
    pub events: Arc<dyn EventRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub audit: Arc<dyn AuditLog>,
}

impl Repositories {
    /// Bundles one store that implements every contract.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: InscriptionRepository
            + EventRepository
            + PaymentRepository
            + UserRepository
            + AuditLog
            + 'static,
    {
        Self {
            inscriptions: store.clone(),
            events: store.clone(),
            payments: store.clone(),
            users: store.clone(),
            audit: store,
        }
    }

    /// Appends an audit event. Failures are logged and do not undo the
    /// already persisted transition.
    pub(crate) async fn record(&self, event: AuditEvent) {
        let action: String = event.action.name.clone();
        if let Err(err) = self.audit.append(event).await {
            tracing::error!(action = %action, error = %err, "Failed to append audit event");
        }
    }
}
