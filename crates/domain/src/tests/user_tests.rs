// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{later, now};
use crate::{Cpf, Email, PersonName, Phone, ProfileUpdate, Role, User};

fn create_test_user() -> User {
    User::register(
        "auth0|123",
        Email::parse("joao@example.com").unwrap(),
        PersonName::parse("João Batista").unwrap(),
        now(),
    )
    .unwrap()
}

#[test]
fn test_registered_user_defaults() {
    let user: User = create_test_user();
    assert_eq!(user.role, Role::User);
    assert!(!user.is_admin());
    assert!(user.cpf.is_none());
}

#[test]
fn test_blank_id_is_rejected() {
    let result = User::register(
        "  ",
        Email::parse("joao@example.com").unwrap(),
        PersonName::parse("João Batista").unwrap(),
        now(),
    );
    assert!(result.is_err());
}

#[test]
fn test_profile_update_only_touches_given_fields() {
    let mut user: User = create_test_user();
    user.apply_profile(
        ProfileUpdate {
            cpf: Some(Cpf::parse("52998224725").unwrap()),
            phone: Some(Phone::parse("11987654321").unwrap()),
            ..ProfileUpdate::default()
        },
        later(),
    );
    assert_eq!(user.name.as_str(), "João Batista");
    assert_eq!(user.cpf.as_ref().map(Cpf::as_str), Some("52998224725"));
    assert!(user.phone.is_some());
    assert_eq!(user.updated_at, later());
    assert_eq!(user.created_at, now());
}

#[test]
fn test_role_parsing() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert!("superuser".parse::<Role>().is_err());
}
