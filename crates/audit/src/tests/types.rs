// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, ActorKind, AuditEvent, Cause, StateSnapshot};
use capela_domain::{EventStatus, InscriptionStatus, PaymentStatus};
use time::macros::datetime;

fn create_confirmation_event() -> AuditEvent {
    AuditEvent::for_inscription(
        String::from("evt-retiro"),
        String::from("ins-1"),
        Actor::admin("admin-1"),
        Cause::new(String::from("req-1"), String::from("Manual confirmation")),
        Action::new(String::from("ConfirmInscription"), None),
        StateSnapshot::inscription(InscriptionStatus::Pending),
        StateSnapshot::inscription(InscriptionStatus::Confirmed),
        datetime!(2026-03-01 12:00 UTC),
    )
}

#[test]
fn test_actor_constructors_set_kind() {
    assert_eq!(Actor::user("u-1").kind, ActorKind::User);
    assert_eq!(Actor::admin("a-1").kind, ActorKind::Admin);
    assert_eq!(Actor::guest("52998224725").kind, ActorKind::Guest);
    assert_eq!(Actor::gateway("asaas").id, "asaas");
    assert_eq!(Actor::system("close-expired-events").kind, ActorKind::System);
}

#[test]
fn test_actor_kind_round_trips_through_str() {
    for kind in [
        ActorKind::User,
        ActorKind::Admin,
        ActorKind::Guest,
        ActorKind::Gateway,
        ActorKind::System,
    ] {
        assert_eq!(kind.as_str().parse::<ActorKind>().unwrap(), kind);
    }
    assert!("robot".parse::<ActorKind>().is_err());
}

#[test]
fn test_snapshots_name_the_entity() {
    assert_eq!(
        StateSnapshot::inscription(InscriptionStatus::Cancelled).data,
        "inscription:cancelled"
    );
    assert_eq!(StateSnapshot::event(EventStatus::Closed).data, "event:closed");
    assert_eq!(
        StateSnapshot::payment(PaymentStatus::ReceivedInCash).data,
        "payment:received_in_cash"
    );
    assert_eq!(StateSnapshot::absent().data, "none");
}

#[test]
fn test_inscription_audit_event_is_scoped() {
    let event: AuditEvent = create_confirmation_event();
    assert_eq!(event.id, None);
    assert_eq!(event.event_id, "evt-retiro");
    assert_eq!(event.inscription_id.as_deref(), Some("ins-1"));
    assert_eq!(event.before.data, "inscription:pending");
    assert_eq!(event.after.data, "inscription:confirmed");
}

#[test]
fn test_event_audit_event_has_no_inscription() {
    let event: AuditEvent = AuditEvent::for_event(
        String::from("evt-retiro"),
        Actor::system("close-expired-events"),
        Cause::new(String::from("cron"), String::from("Event end date passed")),
        Action::new(String::from("CloseEvent"), None),
        StateSnapshot::event(EventStatus::Open),
        StateSnapshot::event(EventStatus::Closed),
        datetime!(2026-03-11 03:00 UTC),
    );
    assert!(event.inscription_id.is_none());
}

#[test]
fn test_with_id_preserves_content() {
    let event: AuditEvent = create_confirmation_event();
    let stored: AuditEvent = event.clone().with_id(42);
    assert_eq!(stored.id, Some(42));
    assert_eq!(AuditEvent { id: None, ..stored }, event);
}

#[test]
fn test_audit_event_serializes_camel_case() {
    let json: serde_json::Value = serde_json::to_value(create_confirmation_event()).unwrap();
    assert_eq!(json["eventId"], "evt-retiro");
    assert_eq!(json["inscriptionId"], "ins-1");
    assert_eq!(json["actor"]["kind"], "admin");
    assert_eq!(json["occurredAt"], "2026-03-01T12:00:00Z");
}
