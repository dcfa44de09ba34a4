// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AuditLog, Charge, ChargeRequest, Customer, CustomerRequest, EventFilter, EventRepository,
    GatewayError, InscriptionFilter, InscriptionRepository, PaymentGateway, PaymentRepository,
    PixPayload, Repositories, RepositoryError, UserRepository,
};
use async_trait::async_trait;
use capela_audit::AuditEvent;
use capela_domain::{
    Category, Cpf, Email, Event, EventParts, EventStatus, GuestData, Inscription,
    InscriptionStatus, Money, Payment, PaymentMethod, PaymentParts, PaymentStatus, PersonName,
    Phone, Role, Tz, User,
};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const EVENT_ID: &str = "evt-retiro";
pub const CATEGORY_ID: &str = "adulto";
pub const USER_ID: &str = "user-1";
pub const ADMIN_ID: &str = "admin-1";
pub const VALID_CPF: &str = "52998224725";
pub const OTHER_CPF: &str = "11144477735";

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn sao_paulo() -> Tz {
    capela_domain::parse_timezone("America/Sao_Paulo").unwrap()
}

#[derive(Default)]
struct StoreState {
    events: Vec<Event>,
    inscriptions: Vec<Inscription>,
    payments: Vec<Payment>,
    users: Vec<User>,
    audit: Vec<AuditEvent>,
}

/// In-memory implementation of every repository contract.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    /// Makes duplicate lookups miss, as a concurrent request would.
    blind_duplicate_checks: Mutex<bool>,
}

impl InMemoryStore {
    pub fn add_event(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn add_inscription(&self, inscription: Inscription) {
        self.state.lock().unwrap().inscriptions.push(inscription);
    }

    pub fn add_payment(&self, payment: Payment) {
        self.state.lock().unwrap().payments.push(payment);
    }

    pub fn inscriptions(&self) -> Vec<Inscription> {
        self.state.lock().unwrap().inscriptions.clone()
    }

    pub fn inscription(&self, id: &str) -> Inscription {
        self.inscriptions()
            .into_iter()
            .find(|i| i.id() == id)
            .unwrap()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state.lock().unwrap().payments.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().unwrap().audit.clone()
    }

    pub fn blind_duplicate_checks(&self) {
        *self.blind_duplicate_checks.lock().unwrap() = true;
    }

    fn blind(&self) -> bool {
        *self.blind_duplicate_checks.lock().unwrap()
    }
}

fn active_cpf(inscription: &Inscription) -> Option<&Cpf> {
    if inscription.is_cancelled() {
        None
    } else {
        inscription.registrant().cpf()
    }
}

#[async_trait]
impl InscriptionRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &str,
        event_id: Option<&str>,
    ) -> Result<Option<Inscription>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .find(|i| i.id() == id && event_id.is_none_or(|e| i.event_id() == e))
            .cloned())
    }

    async fn find_by_event_and_user(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<Inscription>, RepositoryError> {
        if self.blind() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .find(|i| i.event_id() == event_id && i.is_owned_by(user_id) && !i.is_cancelled())
            .cloned())
    }

    async fn find_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError> {
        if self.blind() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .find(|i| i.event_id() == event_id && active_cpf(i) == Some(cpf))
            .cloned())
    }

    async fn find_guest_by_event_and_cpf(
        &self,
        event_id: &str,
        cpf: &Cpf,
    ) -> Result<Option<Inscription>, RepositoryError> {
        if self.blind() {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .find(|i| {
                i.event_id() == event_id && i.registrant().is_guest() && active_cpf(i) == Some(cpf)
            })
            .cloned())
    }

    async fn find_by_event(
        &self,
        event_id: &str,
        filter: InscriptionFilter,
    ) -> Result<Vec<Inscription>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .filter(|i| i.event_id() == event_id && filter.status.is_none_or(|s| i.status() == s))
            .skip(filter.page.offset as usize)
            .take(filter.page.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        status: Option<InscriptionStatus>,
    ) -> Result<Vec<Inscription>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .inscriptions
            .iter()
            .filter(|i| i.is_owned_by(user_id) && status.is_none_or(|s| i.status() == s))
            .cloned()
            .collect())
    }

    async fn save(&self, inscription: &Inscription) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let clash: bool = state.inscriptions.iter().any(|existing| {
            existing.event_id() == inscription.event_id()
                && !existing.is_cancelled()
                && ((existing.registrant().user_id().is_some()
                    && existing.registrant().user_id() == inscription.registrant().user_id())
                    || (active_cpf(existing).is_some()
                        && active_cpf(existing) == inscription.registrant().cpf()))
        });
        if clash {
            return Err(RepositoryError::Conflict(String::from(
                "active inscription already exists",
            )));
        }
        state.inscriptions.push(inscription.clone());
        Ok(())
    }

    async fn update(&self, inscription: &Inscription) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .inscriptions
            .iter_mut()
            .find(|i| i.id() == inscription.id())
            .ok_or_else(|| RepositoryError::Missing(inscription.id().to_string()))?;
        *slot = inscription.clone();
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().find(|e| e.id() == id).cloned())
    }

    async fn find_all(&self, filter: EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .filter(|e| filter.status.is_none_or(|s| e.status() == s))
            .filter(|e| !filter.visible_only || (e.is_visible() && e.status() != EventStatus::Draft))
            .skip(filter.page.offset as usize)
            .take(filter.page.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_category(
        &self,
        event_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .find(|e| e.id() == event_id)
            .and_then(|e| e.category(category_id).cloned()))
    }

    async fn find_categories(&self, event_id: &str) -> Result<Vec<Category>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .find(|e| e.id() == event_id)
            .map(|e| e.categories().to_vec())
            .unwrap_or_default())
    }

    async fn find_expired_open_events(
        &self,
        now: OffsetDateTime,
        tz: Tz,
    ) -> Result<Vec<Event>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .filter(|e| e.is_open() && e.has_ended(now, tz).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn save(&self, event: &Event) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().events.push(event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .events
            .iter_mut()
            .find(|e| e.id() == event.id())
            .ok_or_else(|| RepositoryError::Missing(event.id().to_string()))?;
        *slot = event.clone();
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn find_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .iter()
            .rev()
            .find(|p| p.inscription_id() == inscription_id && p.event_id() == event_id)
            .cloned())
    }

    async fn find_all_by_inscription(
        &self,
        inscription_id: &str,
        event_id: &str,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .iter()
            .filter(|p| p.inscription_id() == inscription_id && p.event_id() == event_id)
            .cloned()
            .collect())
    }

    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .iter()
            .find(|p| p.external_payment_id() == external_payment_id)
            .cloned())
    }

    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().payments.push(payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .payments
            .iter_mut()
            .find(|p| p.id() == payment.id())
            .ok_or_else(|| RepositoryError::Missing(payment.id().to_string()))?;
        *slot = payment.clone();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.cpf.as_ref() == Some(cpf))
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| RepositoryError::Missing(user.id.clone()))?;
        *slot = user.clone();
        Ok(())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let stored: AuditEvent = event.with_id(i64::try_from(state.audit.len()).unwrap() + 1);
        state.audit.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<AuditEvent>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .audit
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// Payment gateway double that records calls.
#[derive(Default)]
pub struct FakeGateway {
    pub fail_cancel: bool,
    pub cancelled: Mutex<Vec<String>>,
    pub customers_created: Mutex<Vec<CustomerRequest>>,
    pub charges: Mutex<Vec<ChargeRequest>>,
}

impl FakeGateway {
    pub fn failing_cancellations() -> Self {
        Self {
            fail_cancel: true,
            ..Self::default()
        }
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError> {
        self.customers_created.lock().unwrap().push(request.clone());
        Ok(Customer {
            id: format!("cus_{}", request.cpf.as_str()),
            name: request.name.clone(),
        })
    }

    async fn find_customer_by_cpf(&self, _cpf: &Cpf) -> Result<Option<Customer>, GatewayError> {
        Ok(None)
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        let mut charges = self.charges.lock().unwrap();
        charges.push(request.clone());
        Ok(Charge {
            id: format!("pay_{}", charges.len()),
            status: PaymentStatus::Pending,
            amount: request.amount,
            method: request.method,
            invoice_url: Some(String::from("https://sandbox.asaas.com/i/abc")),
            external_reference: Some(request.external_reference.clone()),
        })
    }

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError> {
        if self.fail_cancel {
            return Err(GatewayError::Unavailable(String::from("connection reset")));
        }
        self.cancelled.lock().unwrap().push(charge_id.to_string());
        Ok(())
    }

    async fn get_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
        Err(GatewayError::NotFound(charge_id.to_string()))
    }

    async fn get_pix_payload(&self, _charge_id: &str) -> Result<PixPayload, GatewayError> {
        Ok(PixPayload {
            encoded_image: String::from("iVBORw0KGgo="),
            payload: String::from("00020126580014br.gov.bcb.pix"),
            expiration: Some(String::from("2026-03-04 23:59:59")),
        })
    }
}

pub fn create_store() -> (Arc<InMemoryStore>, Repositories) {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::default());
    let repos: Repositories = Repositories::from_store(store.clone());
    (store, repos)
}

pub fn create_test_event(id: &str, status: EventStatus, end_date: Date) -> Event {
    Event::from_parts(EventParts {
        id: id.to_string(),
        title: String::from("Retiro de Quaresma"),
        description: String::from("Retiro anual da paróquia"),
        start_date: date!(2026 - 02 - 20),
        end_date,
        location: String::from("Casa de Retiros"),
        visible: true,
        status,
        categories: vec![
            Category::new(CATEGORY_ID, "Adulto", Money::from_cents(18_000).unwrap()).unwrap(),
            Category::new("jovem", "Jovem", Money::from_cents(9_000).unwrap()).unwrap(),
        ],
        created_at: now(),
        updated_at: now(),
    })
    .unwrap()
}

pub fn create_open_event() -> Event {
    create_test_event(EVENT_ID, EventStatus::Open, date!(2026 - 03 - 10))
}

pub fn create_test_user(id: &str, cpf: Option<&str>) -> User {
    let mut user: User = User::register(
        id,
        Email::parse(&format!("{id}@example.com")).unwrap(),
        PersonName::parse("João Batista").unwrap(),
        now(),
    )
    .unwrap();
    user.cpf = cpf.map(|c| Cpf::parse(c).unwrap());
    user
}

pub fn create_admin() -> User {
    let mut admin: User = create_test_user(ADMIN_ID, None);
    admin.role = Role::Admin;
    admin
}

pub fn create_guest(cpf: &str) -> GuestData {
    GuestData {
        name: PersonName::parse("Maria das Dores").unwrap(),
        email: Email::parse("maria@example.com").unwrap(),
        phone: Phone::parse("11987654321").unwrap(),
        cpf: Cpf::parse(cpf).unwrap(),
    }
}

pub fn create_test_payment(inscription: &Inscription, external_id: &str, status: PaymentStatus) -> Payment {
    Payment::from_parts(PaymentParts {
        id: format!("payment-{external_id}"),
        event_id: inscription.event_id().to_string(),
        inscription_id: inscription.id().to_string(),
        external_payment_id: external_id.to_string(),
        status,
        amount: inscription.amount(),
        method: PaymentMethod::Pix,
        created_at: now(),
        updated_at: now(),
    })
}

/// Store with one open event and one account holder with a CPF.
pub fn create_seeded_store() -> (Arc<InMemoryStore>, Repositories) {
    let (store, repos) = create_store();
    store.add_event(create_open_event());
    store.add_user(create_test_user(USER_ID, Some(VALID_CPF)));
    store.add_user(create_admin());
    (store, repos)
}
