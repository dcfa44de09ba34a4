// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repository contract implementations.
//!
//! Each call takes the connection lock for the duration of one query or
//! one transaction.

use async_trait::async_trait;
use capela::{
    AuditLog, EventFilter, EventRepository, InscriptionFilter, InscriptionRepository,
    PaymentRepository, RepositoryError, UserRepository,
};
use capela_audit::AuditEvent;
use capela_domain::{
    Category, Cpf, Email, Event, Inscription, InscriptionStatus, Payment, Tz, User,
};
use time::OffsetDateTime;

use crate::SqliteStore;
use crate::{mutations, queries};

#[async_trait]
impl InscriptionRepository for SqliteStore {
    async fn find_by_id(
        &self,
        id: &str,
        event_id: Option<&str>,
    ) -> Result<Option<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::find_inscription(&mut conn, id, event_id)?)
    }

    async fn find_by_event_and_user(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::find_active_by_user(
            &mut conn, event_id, user_id,
        )?)
    }

    async fn find_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::find_active_by_cpf(
            &mut conn, event_id, cpf, false,
        )?)
    }

    async fn find_guest_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::find_active_by_cpf(
            &mut conn, event_id, cpf, true,
        )?)
    }

    async fn find_by_event(
        &self,
        event_id: &str,
        filter: InscriptionFilter,
    ) -> Result<Vec<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::list_by_event(
            &mut conn, event_id, filter,
        )?)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        status: Option<InscriptionStatus>,
    ) -> Result<Vec<Inscription>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::inscriptions::list_by_user(&mut conn, user_id, status)?)
    }

    async fn save(&self, inscription: &Inscription) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::inscriptions::insert_inscription(
            &mut conn,
            inscription,
        )?)
    }

    async fn update(&self, inscription: &Inscription) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::inscriptions::update_inscription(
            &mut conn,
            inscription,
        )?)
    }
}

#[async_trait]
impl EventRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::events::find_event(&mut conn, id)?)
    }

    async fn find_all(&self, filter: EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::events::list_events(&mut conn, filter)?)
    }

    async fn find_category(
        &self,
        event_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::events::find_category(
            &mut conn,
            event_id,
            category_id,
        )?)
    }

    async fn find_categories(&self, event_id: &str) -> Result<Vec<Category>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::events::list_categories(&mut conn, event_id)?)
    }

    async fn find_expired_open_events(
        &self,
        now: OffsetDateTime,
        tz: Tz,
    ) -> Result<Vec<Event>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::events::find_expired_open_events(
            &mut conn, now, tz,
        )?)
    }

    async fn save(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::events::insert_event(&mut conn, event)?)
    }

    async fn update(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::events::update_event(&mut conn, event)?)
    }
}

#[async_trait]
impl PaymentRepository for SqliteStore {
    async fn find_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::payments::find_latest_for_inscription(
            &mut conn,
            inscription_id,
            event_id,
        )?)
    }

    async fn find_all_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::payments::find_all_for_inscription(
            &mut conn,
            inscription_id,
            event_id,
        )?)
    }

    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::payments::find_by_external_id(
            &mut conn,
            external_payment_id,
        )?)
    }

    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::payments::insert_payment(&mut conn, payment)?)
    }

    async fn update(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::payments::update_payment(&mut conn, payment)?)
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::users::find_user(&mut conn, id)?)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::users::find_user_by_email(&mut conn, email)?)
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::users::find_user_by_cpf(&mut conn, cpf)?)
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::users::insert_user(&mut conn, user)?)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(mutations::users::update_user(&mut conn, user)?)
    }
}

#[async_trait]
impl AuditLog for SqliteStore {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent, RepositoryError> {
        let mut conn = self.conn.lock().await;
        let audit_id: i64 = mutations::audit::persist_audit_event(&mut conn, &event)?;
        Ok(event.with_id(audit_id))
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<AuditEvent>, RepositoryError> {
        let mut conn = self.conn.lock().await;
        Ok(queries::audit::get_audit_timeline(&mut conn, event_id)?)
    }
}
