// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use async_trait::async_trait;
use capela::{
    Charge, ChargeRequest, Customer, CustomerRequest, GatewayError, PaymentGateway, PixPayload,
    Repositories,
};
use capela_domain::{
    Category, Cpf, Email, Event, EventParts, EventStatus, Money, PaymentStatus, PersonName, Role,
    User,
};
use capela_persistence::SqliteStore;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use time::macros::{date, datetime};

use crate::{AuthenticatedActor, GuestInput};

pub const EVENT_ID: &str = "evt-retiro";
pub const DRAFT_EVENT_ID: &str = "evt-draft";
pub const CATEGORY_ID: &str = "adulto";
pub const USER_ID: &str = "user-1";
pub const OTHER_USER_ID: &str = "user-2";
pub const ADMIN_ID: &str = "admin-1";
pub const VALID_CPF: &str = "52998224725";
pub const GUEST_CPF: &str = "11144477735";

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

#[derive(Default)]
pub struct FakeGateway {
    pub cancelled: Mutex<Vec<String>>,
    pub charges: Mutex<Vec<ChargeRequest>>,
}

impl FakeGateway {
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError> {
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
            expiration: None,
        })
    }
}

pub fn create_test_event(id: &str, status: EventStatus) -> Event {
    Event::from_parts(EventParts {
        id: id.to_string(),
        title: String::from("Retiro de Quaresma"),
        description: String::from("Retiro anual da paróquia"),
        start_date: date!(2026 - 03 - 08),
        end_date: date!(2026 - 03 - 10),
        location: String::from("Casa de Retiros"),
        visible: true,
        status,
        categories: vec![
            Category::new(CATEGORY_ID, "Adulto", Money::from_cents(18_000).unwrap()).unwrap(),
        ],
        created_at: now(),
        updated_at: now(),
    })
    .unwrap()
}

pub fn create_test_user(id: &str, cpf: Option<&str>, role: Role) -> User {
    let mut user: User = User::register(
        id,
        Email::parse(&format!("{id}@example.com")).unwrap(),
        PersonName::parse("João Batista").unwrap(),
        now(),
    )
    .unwrap();
    user.cpf = cpf.map(|c| Cpf::parse(c).unwrap());
    user.role = role;
    user
}

/// In-memory store holding an open event, a draft event, an account with a
/// CPF, a second account without one and an administrator.
pub async fn create_seeded_repos() -> Repositories {
    let store: Arc<SqliteStore> = Arc::new(SqliteStore::new_in_memory().unwrap());
    let repos: Repositories = Repositories::from_store(store);
    repos
        .events
        .save(&create_test_event(EVENT_ID, EventStatus::Open))
        .await
        .unwrap();
    repos
        .events
        .save(&create_test_event(DRAFT_EVENT_ID, EventStatus::Draft))
        .await
        .unwrap();
    for user in [
        create_test_user(USER_ID, Some(VALID_CPF), Role::User),
        create_test_user(OTHER_USER_ID, None, Role::User),
        create_test_user(ADMIN_ID, None, Role::Admin),
    ] {
        repos.users.save(&user).await.unwrap();
    }
    repos
}

pub fn create_user_actor(id: &str) -> AuthenticatedActor {
    AuthenticatedActor {
        subject: id.to_string(),
        email: Some(format!("{id}@example.com")),
        name: Some(String::from("João Batista")),
        role: Role::User,
        registered: true,
    }
}

pub fn create_admin_actor() -> AuthenticatedActor {
    AuthenticatedActor {
        role: Role::Admin,
        ..create_user_actor(ADMIN_ID)
    }
}

pub fn create_guest_input(cpf: &str) -> GuestInput {
    GuestInput {
        name: String::from("Maria das Dores"),
        email: String::from("maria@example.com"),
        phone: String::from("(11) 98765-4321"),
        cpf: cpf.to_string(),
    }
}
