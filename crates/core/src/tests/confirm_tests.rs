// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    ADMIN_ID, CATEGORY_ID, EVENT_ID, FakeGateway, InMemoryStore, USER_ID, create_seeded_store,
    create_test_payment, now,
};
use crate::{
    ConfirmInscriptionRequest, CoreError, CreateInscriptionRequest, ManualConfirmation,
    Repositories, confirm_inscription_manually, create_inscription,
};
use capela_domain::{Inscription, InscriptionStatus, PaymentStatus};

async fn create_pending(store: &InMemoryStore, repos: &Repositories) -> Inscription {
    let record = create_inscription(
        repos,
        CreateInscriptionRequest {
            user_id: USER_ID.to_string(),
            event_id: EVENT_ID.to_string(),
            category_id: CATEGORY_ID.to_string(),
            preferred_payment_method: None,
        },
        now(),
    )
    .await
    .unwrap();
    store.inscription(&record.id)
}

fn confirm_request(event_id: &str, inscription_id: &str) -> ConfirmInscriptionRequest {
    ConfirmInscriptionRequest {
        event_id: event_id.to_string(),
        inscription_id: inscription_id.to_string(),
        confirmed_by: ADMIN_ID.to_string(),
    }
}

#[tokio::test]
async fn test_unknown_event_is_a_validation_error() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;

    let result = confirm_inscription_manually(
        &repos,
        &FakeGateway::default(),
        confirm_request("evt-missing", inscription.id()),
        now(),
    )
    .await;
    assert!(matches!(result, Err(CoreError::Validation { .. })));
    assert!(store.inscription(inscription.id()).is_pending());
}

#[tokio::test]
async fn test_inscription_must_belong_to_event() {
    let (_store, repos) = create_seeded_store();
    let result = confirm_inscription_manually(
        &repos,
        &FakeGateway::default(),
        confirm_request(EVENT_ID, "ins-missing"),
        now(),
    )
    .await;
    assert_eq!(
        result,
        Err(CoreError::InscriptionNotFound(String::from("ins-missing")))
    );
}

#[tokio::test]
async fn test_only_pending_can_be_confirmed() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;
    let gateway: FakeGateway = FakeGateway::default();

    confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();
    let again = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await;

    match again {
        Err(CoreError::Validation { message, .. }) => {
            assert_eq!(message, "only pending registrations can be confirmed");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_outstanding_charge_is_cancelled() {
    let (store, repos) = create_seeded_store();
    let mut inscription: Inscription = create_pending(&store, &repos).await;
    inscription.attach_payment("pay_42", now()).unwrap();
    repos.inscriptions.update(&inscription).await.unwrap();
    store.add_payment(create_test_payment(&inscription, "pay_42", PaymentStatus::Pending));
    let gateway: FakeGateway = FakeGateway::default();

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    assert!(result.asaas_payment_cancelled);
    assert_eq!(result.inscription.payment_id.as_deref(), Some("pay_42"));
    assert_eq!(gateway.cancelled(), vec![String::from("pay_42")]);
    assert_eq!(store.payments()[0].status(), PaymentStatus::Cancelled);
    assert_eq!(
        store.inscription(inscription.id()).status(),
        InscriptionStatus::Confirmed
    );
}

#[tokio::test]
async fn test_superseded_overdue_charge_is_cancelled_too() {
    let (store, repos) = create_seeded_store();
    let mut inscription: Inscription = create_pending(&store, &repos).await;
    store.add_payment(create_test_payment(&inscription, "pay_old", PaymentStatus::Overdue));
    inscription.attach_payment("pay_new", now()).unwrap();
    repos.inscriptions.update(&inscription).await.unwrap();
    store.add_payment(create_test_payment(&inscription, "pay_new", PaymentStatus::Pending));
    let gateway: FakeGateway = FakeGateway::default();

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    assert!(result.asaas_payment_cancelled);
    let mut cancelled: Vec<String> = gateway.cancelled();
    cancelled.sort();
    assert_eq!(cancelled, vec![String::from("pay_new"), String::from("pay_old")]);
    assert!(
        store
            .payments()
            .iter()
            .all(|p| p.status() == PaymentStatus::Cancelled)
    );
}

#[tokio::test]
async fn test_settled_and_refunding_charges_are_left_alone() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;
    store.add_payment(create_test_payment(&inscription, "pay_paid", PaymentStatus::Received));
    store.add_payment(create_test_payment(
        &inscription,
        "pay_refund",
        PaymentStatus::RefundRequested,
    ));
    let gateway: FakeGateway = FakeGateway::default();

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    assert!(!result.asaas_payment_cancelled);
    assert!(gateway.cancelled().is_empty());
}

#[tokio::test]
async fn test_failed_charge_cancellation_does_not_block_confirmation() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;
    store.add_payment(create_test_payment(&inscription, "pay_42", PaymentStatus::Pending));
    let gateway: FakeGateway = FakeGateway::failing_cancellations();

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    assert!(result.success);
    assert!(!result.asaas_payment_cancelled);
    assert_eq!(store.payments()[0].status(), PaymentStatus::Pending);
    assert!(store.inscription(inscription.id()).is_confirmed());
}

#[tokio::test]
async fn test_already_cancelled_charge_is_not_cancelled_again() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;
    store.add_payment(create_test_payment(&inscription, "pay_42", PaymentStatus::Cancelled));
    let gateway: FakeGateway = FakeGateway::default();

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    assert!(!result.asaas_payment_cancelled);
    assert!(gateway.cancelled().is_empty());
}

#[tokio::test]
async fn test_manual_confirmation_is_audited_as_admin() {
    let (store, repos) = create_seeded_store();
    let inscription: Inscription = create_pending(&store, &repos).await;

    confirm_inscription_manually(
        &repos,
        &FakeGateway::default(),
        confirm_request(EVENT_ID, inscription.id()),
        now(),
    )
    .await
    .unwrap();

    let last = store.audit_events().pop().unwrap();
    assert_eq!(last.action.name, "ConfirmInscription");
    assert_eq!(last.actor.id, ADMIN_ID);
    assert_eq!(last.before.data, "inscription:pending");
    assert_eq!(last.after.data, "inscription:confirmed");
}
