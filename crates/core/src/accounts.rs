// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account registration and profile edits.

use crate::error::CoreError;
use crate::repository::{Repositories, RepositoryError};
use capela_domain::{BirthDate, Cpf, Email, Gender, PersonName, Phone, ProfileUpdate, User};
use time::OffsetDateTime;
use tracing::info;

/// Input for creating an account after the identity provider signed the user in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAccount {
    /// Identity provider subject.
    pub subject_id: String,
    pub email: Email,
    pub name: PersonName,
    pub cpf: Option<Cpf>,
    pub phone: Option<Phone>,
    pub birth_date: Option<BirthDate>,
    pub gender: Option<Gender>,
}

/// Creates an account.
///
/// # Errors
///
/// Returns `UserAlreadyExists` if the subject or email is registered and
/// `CpfAlreadyInUse` if the CPF belongs to another account.
pub async fn register_account(
    repos: &Repositories,
    input: RegisterAccount,
    now: OffsetDateTime,
) -> Result<User, CoreError> {
    if repos.users.find_by_id(&input.subject_id).await?.is_some() {
        return Err(CoreError::UserAlreadyExists(input.subject_id));
    }
    if repos.users.find_by_email(&input.email).await?.is_some() {
        return Err(CoreError::UserAlreadyExists(input.email.to_string()));
    }
    if let Some(cpf) = &input.cpf {
        let holder: Option<User> = repos.users.find_by_cpf(cpf).await?;
        if holder.is_some() {
            return Err(CoreError::CpfAlreadyInUse);
        }
    }

    let mut user: User = User::register(&input.subject_id, input.email, input.name, now)?;
    user.apply_profile(
        ProfileUpdate {
            name: None,
            cpf: input.cpf,
            phone: input.phone,
            birth_date: input.birth_date,
            gender: input.gender,
        },
        now,
    );

    repos.users.save(&user).await.map_err(|err| match err {
        RepositoryError::Conflict(_) => CoreError::UserAlreadyExists(user.id.clone()),
        other => CoreError::Repository(other),
    })?;

    info!(user_id = %user.id, "Account registered");
    Ok(user)
}

/// Applies a profile edit.
///
/// # Errors
///
/// Returns `UserNotFound` if absent and `CpfAlreadyInUse` if the new CPF
/// belongs to someone else.
pub async fn update_profile(
    repos: &Repositories,
    user_id: &str,
    update: ProfileUpdate,
    now: OffsetDateTime,
) -> Result<User, CoreError> {
    let mut user: User = repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(user_id.to_string()))?;

    if let Some(cpf) = &update.cpf {
        let holder: Option<User> = repos.users.find_by_cpf(cpf).await?;
        if holder.is_some_and(|other| other.id != user.id) {
            return Err(CoreError::CpfAlreadyInUse);
        }
    }

    user.apply_profile(update, now);
    repos.users.update(&user).await.map_err(|err| match err {
        RepositoryError::Conflict(_) => CoreError::CpfAlreadyInUse,
        other => CoreError::Repository(other),
    })?;

    info!(user_id = %user.id, "Profile updated");
    Ok(user)
}
