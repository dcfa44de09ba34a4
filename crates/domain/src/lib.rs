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

mod cpf;
mod dates;
mod error;
mod event;
mod inscription;
mod money;
mod payment;
mod person;
mod user;

#[cfg(test)]
mod tests;

pub use cpf::Cpf;
pub use error::DomainError;
pub use event::{Category, Event, EventParts, EventStatus, parse_timezone};
pub use inscription::{
    GuestData, GuestRecord, Inscription, InscriptionParts, InscriptionRecord, InscriptionStatus,
    NewInscription, PaymentConfirmation, PaymentMethod, Registrant,
};
pub use money::Money;
pub use payment::{Payment, PaymentParts, PaymentStatus};
pub use person::{BirthDate, Email, Gender, PersonName, Phone};
pub use user::{ProfileUpdate, Role, User};

// Timezone type used by `Event::has_ended`.
pub use chrono_tz::Tz;
