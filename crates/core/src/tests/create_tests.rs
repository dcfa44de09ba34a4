// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    ADMIN_ID, CATEGORY_ID, EVENT_ID, FakeGateway, OTHER_CPF, USER_ID, VALID_CPF, create_guest,
    create_seeded_store, create_store, create_test_event, create_test_user, now,
};
use crate::{
    ConfirmInscriptionRequest, CoreError, CreateGuestInscriptionRequest, CreateInscriptionRequest,
    ManualConfirmation, confirm_inscription_manually, create_guest_inscription,
    create_inscription,
};
use capela_domain::{EventStatus, InscriptionRecord, InscriptionStatus, PaymentMethod};
use time::macros::date;

fn request(user_id: &str, category_id: &str) -> CreateInscriptionRequest {
    CreateInscriptionRequest {
        user_id: user_id.to_string(),
        event_id: EVENT_ID.to_string(),
        category_id: category_id.to_string(),
        preferred_payment_method: None,
    }
}

#[tokio::test]
async fn test_create_then_confirm_without_payment() {
    let (store, repos) = create_seeded_store();
    let gateway: FakeGateway = FakeGateway::default();

    let record: InscriptionRecord = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();
    assert_eq!(record.status, InscriptionStatus::Pending);
    assert_eq!(record.amount, 18_000);
    assert_eq!(record.amount_formatted, "R$ 180,00");

    let result: ManualConfirmation = confirm_inscription_manually(
        &repos,
        &gateway,
        ConfirmInscriptionRequest {
            event_id: EVENT_ID.to_string(),
            inscription_id: record.id.clone(),
            confirmed_by: ADMIN_ID.to_string(),
        },
        now(),
    )
    .await
    .unwrap();

    assert!(result.success);
    assert_eq!(result.inscription.status, InscriptionStatus::Confirmed);
    assert_eq!(result.inscription.payment_id, None);
    assert!(!result.asaas_payment_cancelled);
    assert!(gateway.cancelled().is_empty());

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["asaasPaymentCancelled"], false);
    assert_eq!(json["inscription"]["status"], "confirmed");
    assert!(json["inscription"].get("paymentId").is_none());

    assert_eq!(store.inscription(&record.id).confirmed_by(), Some(ADMIN_ID));
}

#[tokio::test]
async fn test_amount_is_copied_from_category_price() {
    let (_store, repos) = create_seeded_store();
    let mut youth = request(USER_ID, "jovem");
    youth.preferred_payment_method = Some(PaymentMethod::Boleto);

    let record: InscriptionRecord = create_inscription(&repos, youth, now()).await.unwrap();
    assert_eq!(record.amount, 9_000);
    assert_eq!(record.preferred_payment_method, Some(PaymentMethod::Boleto));
}

#[tokio::test]
async fn test_closed_event_is_rejected_and_nothing_persisted() {
    let (store, repos) = create_store();
    store.add_event(create_test_event(EVENT_ID, EventStatus::Closed, date!(2026 - 03 - 10)));
    store.add_user(create_test_user(USER_ID, None));

    let result = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now()).await;
    assert!(matches!(result, Err(CoreError::EventNotOpen { .. })));
    assert!(store.inscriptions().is_empty());
    assert!(store.audit_events().is_empty());
}

#[tokio::test]
async fn test_draft_event_is_not_open() {
    let (store, repos) = create_store();
    store.add_event(create_test_event(EVENT_ID, EventStatus::Draft, date!(2026 - 03 - 10)));
    store.add_user(create_test_user(USER_ID, None));

    let result = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now()).await;
    assert_eq!(
        result,
        Err(CoreError::EventNotOpen {
            event_id: EVENT_ID.to_string(),
            status: String::from("draft"),
        })
    );
}

#[tokio::test]
async fn test_unknown_user_event_and_category() {
    let (_store, repos) = create_seeded_store();

    let missing_user = create_inscription(&repos, request("ghost", CATEGORY_ID), now()).await;
    assert_eq!(missing_user, Err(CoreError::UserNotFound(String::from("ghost"))));

    let mut other_event = request(USER_ID, CATEGORY_ID);
    other_event.event_id = String::from("evt-missing");
    let missing_event = create_inscription(&repos, other_event, now()).await;
    assert_eq!(
        missing_event,
        Err(CoreError::EventNotFound(String::from("evt-missing")))
    );

    let missing_category = create_inscription(&repos, request(USER_ID, "idoso"), now()).await;
    assert!(matches!(
        missing_category,
        Err(CoreError::CategoryNotFound { .. })
    ));
}

#[tokio::test]
async fn test_second_registration_by_same_account_is_duplicate() {
    let (store, repos) = create_seeded_store();
    create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();

    let second = create_inscription(&repos, request(USER_ID, "jovem"), now()).await;
    assert!(matches!(
        second,
        Err(CoreError::DuplicateInscription { .. })
    ));
    assert_eq!(store.inscriptions().len(), 1);
}

#[tokio::test]
async fn test_cancelled_registration_does_not_block_a_new_one() {
    let (store, repos) = create_seeded_store();
    let first: InscriptionRecord = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();
    let mut cancelled = store.inscription(&first.id);
    cancelled.cancel(now()).unwrap();
    crate::InscriptionRepository::update(store.as_ref(), &cancelled)
        .await
        .unwrap();

    let second = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now()).await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_account_blocked_by_guest_registration_with_same_cpf() {
    let (_store, repos) = create_seeded_store();
    create_guest_inscription(
        &repos,
        CreateGuestInscriptionRequest {
            event_id: EVENT_ID.to_string(),
            category_id: CATEGORY_ID.to_string(),
            guest: create_guest(VALID_CPF),
            preferred_payment_method: None,
        },
        now(),
    )
    .await
    .unwrap();

    let result = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now()).await;
    assert!(matches!(
        result,
        Err(CoreError::DuplicateInscription { .. })
    ));
}

#[tokio::test]
async fn test_guest_blocked_by_account_registration_with_same_cpf() {
    let (_store, repos) = create_seeded_store();
    create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();

    let guest = create_guest_inscription(
        &repos,
        CreateGuestInscriptionRequest {
            event_id: EVENT_ID.to_string(),
            category_id: CATEGORY_ID.to_string(),
            guest: create_guest(VALID_CPF),
            preferred_payment_method: None,
        },
        now(),
    )
    .await;
    assert!(matches!(guest, Err(CoreError::DuplicateInscription { .. })));

    let other_guest = create_guest_inscription(
        &repos,
        CreateGuestInscriptionRequest {
            event_id: EVENT_ID.to_string(),
            category_id: CATEGORY_ID.to_string(),
            guest: create_guest(OTHER_CPF),
            preferred_payment_method: Some(PaymentMethod::Pix),
        },
        now(),
    )
    .await
    .unwrap();
    assert!(other_guest.user_id.is_none());
    assert_eq!(other_guest.guest.unwrap().cpf, "111.444.777-35");
}

#[tokio::test]
async fn test_storage_conflict_is_reported_as_duplicate() {
    let (store, repos) = create_seeded_store();
    create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();

    // A racing request whose duplicate checks ran before the first write landed.
    store.blind_duplicate_checks();
    let raced = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now()).await;
    assert!(matches!(raced, Err(CoreError::DuplicateInscription { .. })));
    assert_eq!(store.inscriptions().len(), 1);
}

#[tokio::test]
async fn test_creation_is_audited() {
    let (store, repos) = create_seeded_store();
    let record: InscriptionRecord = create_inscription(&repos, request(USER_ID, CATEGORY_ID), now())
        .await
        .unwrap();

    let audit = store.audit_events();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action.name, "CreateInscription");
    assert_eq!(audit[0].inscription_id.as_deref(), Some(record.id.as_str()));
    assert_eq!(audit[0].before.data, "none");
    assert_eq!(audit[0].after.data, "inscription:pending");
}
