// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Category, Cpf, Email, Event, EventParts, EventStatus, GuestData, Inscription, Money,
    NewInscription, PersonName, Phone, Registrant,
};
use time::OffsetDateTime;
use time::macros::{date, datetime};

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn later() -> OffsetDateTime {
    datetime!(2026-03-02 09:30 UTC)
}

pub fn create_test_event(status: EventStatus) -> Event {
    Event::from_parts(EventParts {
        id: String::from("evt-retiro"),
        title: String::from("Retiro de Quaresma"),
        description: String::from("Retiro anual"),
        start_date: date!(2026 - 03 - 08),
        end_date: date!(2026 - 03 - 10),
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

pub fn create_guest() -> GuestData {
    GuestData {
        name: PersonName::parse("Maria das Dores").unwrap(),
        email: Email::parse("maria@example.com").unwrap(),
        phone: Phone::parse("(11) 98765-4321").unwrap(),
        cpf: Cpf::parse("529.982.247-25").unwrap(),
    }
}

pub fn create_pending_inscription() -> Inscription {
    Inscription::create(
        String::from("ins-1"),
        NewInscription {
            event_id: String::from("evt-retiro"),
            category_id: String::from("adulto"),
            registrant: Registrant::Account {
                user_id: String::from("user-1"),
                cpf: None,
            },
            amount: Money::from_cents(18_000).unwrap(),
            preferred_payment_method: None,
        },
        now(),
    )
    .unwrap()
}
