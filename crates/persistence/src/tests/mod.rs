// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod use_case_tests;

use crate::SqliteStore;
use capela::Repositories;
use capela_domain::{
    Category, Cpf, Email, Event, EventParts, EventStatus, GuestData, Inscription, Money,
    NewInscription, PersonName, Phone, Registrant, User,
};
use std::sync::Arc;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const EVENT_ID: &str = "evt-retiro";
pub const USER_ID: &str = "user-1";
pub const VALID_CPF: &str = "52998224725";
pub const OTHER_CPF: &str = "11144477735";

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn create_test_store() -> (SqliteStore, Repositories) {
    let store: SqliteStore = SqliteStore::new_in_memory().unwrap();
    let repos: Repositories = Repositories::from_store(Arc::new(store.clone()));
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
            Category::new("adulto", "Adulto", Money::from_cents(18_000).unwrap()).unwrap(),
            Category::new("jovem", "Jovem", Money::from_cents(9_000).unwrap()).unwrap(),
        ],
        created_at: now(),
        updated_at: now(),
    })
    .unwrap()
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

pub fn create_guest(cpf: &str) -> GuestData {
    GuestData {
        name: PersonName::parse("Maria das Dores").unwrap(),
        email: Email::parse("maria@example.com").unwrap(),
        phone: Phone::parse("11987654321").unwrap(),
        cpf: Cpf::parse(cpf).unwrap(),
    }
}

pub fn create_test_inscription(id: &str, registrant: Registrant) -> Inscription {
    Inscription::create(
        id.to_string(),
        NewInscription {
            event_id: EVENT_ID.to_string(),
            category_id: String::from("adulto"),
            registrant,
            amount: Money::from_cents(18_000).unwrap(),
            preferred_payment_method: None,
        },
        now(),
    )
    .unwrap()
}

pub fn account(user_id: &str, cpf: Option<&str>) -> Registrant {
    Registrant::Account {
        user_id: user_id.to_string(),
        cpf: cpf.map(|c| Cpf::parse(c).unwrap()),
    }
}

/// Store with one open event and one account holder with a CPF.
pub async fn create_seeded_store() -> (SqliteStore, Repositories) {
    let (store, repos) = create_test_store();
    repos
        .events
        .save(&create_test_event(EVENT_ID, EventStatus::Open, date!(2026 - 03 - 10)))
        .await
        .unwrap();
    repos
        .users
        .save(&create_test_user(USER_ID, Some(VALID_CPF)))
        .await
        .unwrap();
    (store, repos)
}
