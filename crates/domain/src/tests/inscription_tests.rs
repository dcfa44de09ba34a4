// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_guest, create_pending_inscription, later, now};
use crate::{
    Cpf, DomainError, Inscription, InscriptionRecord, InscriptionStatus, Money, NewInscription,
    PaymentConfirmation, PaymentMethod, Registrant,
};

#[test]
fn test_new_inscription_is_pending() {
    let inscription: Inscription = create_pending_inscription();
    assert!(inscription.is_pending());
    assert_eq!(inscription.amount().cents(), 18_000);
    assert!(inscription.external_payment_id().is_none());
    assert!(inscription.confirmed_by().is_none());
    assert!(inscription.is_owned_by("user-1"));
    assert!(!inscription.is_owned_by("user-2"));
}

#[test]
fn test_cancel_round_trip() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.cancel(later()).unwrap();
    assert!(inscription.is_cancelled());
    assert_eq!(inscription.updated_at(), later());

    let second = inscription.cancel(later());
    assert!(matches!(
        second,
        Err(DomainError::InvalidInscriptionTransition {
            operation: "cancel",
            ..
        })
    ));
    assert!(inscription.is_cancelled());
}

#[test]
fn test_confirmed_inscription_cannot_be_cancelled() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.confirm_manually("admin-1", later()).unwrap();
    assert!(inscription.cancel(later()).is_err());
    assert!(inscription.is_confirmed());
}

#[test]
fn test_manual_confirmation_records_actor() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.confirm_manually("admin-1", later()).unwrap();
    assert!(inscription.is_confirmed());
    assert_eq!(inscription.confirmed_by(), Some("admin-1"));

    assert!(inscription.confirm_manually("admin-2", later()).is_err());
    assert_eq!(inscription.confirmed_by(), Some("admin-1"));
}

#[test]
fn test_payment_confirmation_is_idempotent() {
    let mut inscription: Inscription = create_pending_inscription();

    let first: PaymentConfirmation = inscription.confirm_from_payment("pay_123", later()).unwrap();
    assert_eq!(first, PaymentConfirmation::Applied);
    assert!(inscription.is_confirmed());
    assert_eq!(inscription.external_payment_id(), Some("pay_123"));
    let after_first: Inscription = inscription.clone();

    let second: PaymentConfirmation = inscription
        .confirm_from_payment("pay_123", datetime_after_later())
        .unwrap();
    assert_eq!(second, PaymentConfirmation::AlreadyConfirmed);
    assert_eq!(inscription, after_first);
}

fn datetime_after_later() -> time::OffsetDateTime {
    later() + time::Duration::hours(1)
}

#[test]
fn test_payment_confirmation_keeps_attached_charge_id() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.attach_payment("pay_original", now()).unwrap();
    inscription.confirm_from_payment("pay_other", later()).unwrap();
    assert_eq!(inscription.external_payment_id(), Some("pay_original"));
}

#[test]
fn test_cancelled_inscription_rejects_payment_confirmation() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.cancel(now()).unwrap();
    let result = inscription.confirm_from_payment("pay_123", later());
    assert!(result.is_err());
    assert!(inscription.is_cancelled());
}

#[test]
fn test_attach_payment_requires_pending() {
    let mut inscription: Inscription = create_pending_inscription();
    inscription.attach_payment("pay_1", now()).unwrap();
    assert_eq!(inscription.external_payment_id(), Some("pay_1"));

    inscription.confirm_manually("admin-1", later()).unwrap();
    assert!(inscription.attach_payment("pay_2", later()).is_err());
    assert_eq!(inscription.external_payment_id(), Some("pay_1"));
}

#[test]
fn test_record_has_display_fields() {
    let inscription: Inscription = create_pending_inscription();
    let record: InscriptionRecord = inscription.to_record();
    assert_eq!(record.amount, 18_000);
    assert_eq!(record.amount_formatted, "R$ 180,00");
    assert_eq!(record.status_label, "Pendente");
    assert_eq!(record.user_id.as_deref(), Some("user-1"));
    assert!(record.guest.is_none());

    let json: serde_json::Value = serde_json::to_value(&record).unwrap();
    assert_eq!(json["eventId"], "evt-retiro");
    assert_eq!(json["statusLabel"], "Pendente");
    assert_eq!(json["createdAt"], "2026-03-01T12:00:00Z");
    assert!(json.get("guest").is_none());
}

#[test]
fn test_status_labels() {
    assert_eq!(InscriptionStatus::Pending.label(), "Pendente");
    assert_eq!(InscriptionStatus::Confirmed.label(), "Confirmada");
    assert_eq!(InscriptionStatus::Cancelled.label(), "Cancelada");
    assert!(InscriptionStatus::Confirmed.is_terminal());
    assert!(!InscriptionStatus::Pending.is_terminal());
}

#[test]
fn test_guest_record_is_formatted() {
    let inscription: Inscription = Inscription::create(
        String::from("ins-guest"),
        NewInscription {
            event_id: String::from("evt-retiro"),
            category_id: String::from("jovem"),
            registrant: Registrant::Guest(create_guest()),
            amount: Money::from_cents(9_000).unwrap(),
            preferred_payment_method: Some(PaymentMethod::Pix),
        },
        now(),
    )
    .unwrap();

    let record: InscriptionRecord = inscription.to_record();
    let guest = record.guest.unwrap();
    assert_eq!(guest.cpf, "529.982.247-25");
    assert_eq!(guest.phone, "(11) 98765-4321");
    assert!(record.user_id.is_none());
    assert_eq!(record.preferred_payment_method, Some(PaymentMethod::Pix));
}

#[test]
fn test_registrant_requires_exactly_one_kind() {
    let both = Registrant::from_options(Some((String::from("user-1"), None)), Some(create_guest()));
    assert!(matches!(both, Err(DomainError::InvalidRegistrant(_))));

    let neither = Registrant::from_options(None, None);
    assert!(matches!(neither, Err(DomainError::InvalidRegistrant(_))));

    let account = Registrant::from_options(
        Some((String::from("user-1"), Some(Cpf::parse("52998224725").unwrap()))),
        None,
    )
    .unwrap();
    assert_eq!(account.user_id(), Some("user-1"));
    assert_eq!(account.cpf().map(Cpf::as_str), Some("52998224725"));

    let guest = Registrant::from_options(None, Some(create_guest())).unwrap();
    assert!(guest.is_guest());
    assert!(guest.user_id().is_none());
}

#[test]
fn test_payment_method_codes() {
    assert_eq!(PaymentMethod::CreditCard.billing_type(), "CREDIT_CARD");
    assert_eq!("CREDIT_CARD".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
    assert_eq!("boleto".parse::<PaymentMethod>().unwrap(), PaymentMethod::Boleto);
    assert!("cash".parse::<PaymentMethod>().is_err());
}
