// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Core use cases running against the SQLite store.

use super::{
    EVENT_ID, USER_ID, VALID_CPF, create_guest, create_seeded_store, create_test_event,
    create_test_inscription, now,
};
use capela::{
    ClosedEvents, CoreError, CreateGuestInscriptionRequest, CreateInscriptionRequest,
    FailurePolicy, PaymentNotification, WebhookOutcome, close_expired_events,
    create_guest_inscription, create_inscription, external_reference, process_payment_webhook,
};
use capela_audit::AuditEvent;
use capela_domain::{
    EventStatus, InscriptionRecord, InscriptionStatus, Money, Payment, PaymentStatus, Registrant,
    parse_timezone,
};
use time::Duration;
use time::macros::date;

fn account_request() -> CreateInscriptionRequest {
    CreateInscriptionRequest {
        user_id: USER_ID.to_string(),
        event_id: EVENT_ID.to_string(),
        category_id: String::from("adulto"),
        preferred_payment_method: None,
    }
}

#[tokio::test]
async fn test_create_then_duplicate_is_rejected() {
    let (_store, repos) = create_seeded_store().await;

    let record: InscriptionRecord = create_inscription(&repos, account_request(), now())
        .await
        .unwrap();
    assert_eq!(record.status, InscriptionStatus::Pending);
    assert_eq!(record.amount, 18_000);

    let second = create_inscription(&repos, account_request(), now()).await;
    assert!(matches!(
        second,
        Err(CoreError::DuplicateInscription { .. })
    ));

    let guest = create_guest_inscription(
        &repos,
        CreateGuestInscriptionRequest {
            event_id: EVENT_ID.to_string(),
            category_id: String::from("adulto"),
            guest: create_guest(VALID_CPF),
            preferred_payment_method: None,
        },
        now(),
    )
    .await;
    assert!(matches!(guest, Err(CoreError::DuplicateInscription { .. })));
}

#[tokio::test]
async fn test_guest_cpf_blocks_account_registration() {
    let (_store, repos) = create_seeded_store().await;
    repos
        .inscriptions
        .save(&create_test_inscription(
            "ins-g",
            Registrant::Guest(create_guest(VALID_CPF)),
        ))
        .await
        .unwrap();

    let result = create_inscription(&repos, account_request(), now()).await;
    assert!(matches!(result, Err(CoreError::DuplicateInscription { .. })));
}

#[tokio::test]
async fn test_webhook_confirms_and_records_payment() {
    let (_store, repos) = create_seeded_store().await;
    let record: InscriptionRecord = create_inscription(&repos, account_request(), now())
        .await
        .unwrap();

    let notification: PaymentNotification = PaymentNotification {
        event: String::from("PAYMENT_RECEIVED"),
        payment_id: String::from("pay_9"),
        status: String::from("RECEIVED"),
        external_reference: Some(external_reference(EVENT_ID, &record.id)),
        value: Some(Money::from_cents(18_000).unwrap()),
        billing_type: Some(String::from("PIX")),
    };
    let later = now() + Duration::minutes(10);

    let outcome = process_payment_webhook(&repos, &notification, FailurePolicy::KeepPending, later)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Confirmed {
            inscription_id: record.id.clone()
        }
    );

    let repeat = process_payment_webhook(&repos, &notification, FailurePolicy::KeepPending, later)
        .await
        .unwrap();
    assert!(matches!(repeat, WebhookOutcome::AlreadyConfirmed { .. }));

    let payment: Payment = repos
        .payments
        .find_by_external_id("pay_9")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status(), PaymentStatus::Received);
    assert_eq!(payment.inscription_id(), record.id);

    let actions: Vec<String> = repos
        .audit
        .find_by_event(EVENT_ID)
        .await
        .unwrap()
        .into_iter()
        .map(|e: AuditEvent| e.action.name)
        .collect();
    assert_eq!(actions, vec!["CreateInscription", "ConfirmInscription"]);
}

#[tokio::test]
async fn test_close_expired_events_over_sqlite() {
    let (_store, repos) = create_seeded_store().await;
    repos
        .events
        .save(&create_test_event(
            "evt-past",
            EventStatus::Open,
            date!(2026 - 02 - 25),
        ))
        .await
        .unwrap();
    let tz = parse_timezone("America/Sao_Paulo").unwrap();

    let closed: ClosedEvents = close_expired_events(&repos, tz, now()).await.unwrap();
    assert_eq!(closed.closed_events, vec![String::from("evt-past")]);

    let again: ClosedEvents = close_expired_events(&repos, tz, now()).await.unwrap();
    assert_eq!(again.closed_count, 0);

    let open = repos.events.find_by_id(EVENT_ID).await.unwrap().unwrap();
    assert_eq!(open.status(), EventStatus::Open);
}
