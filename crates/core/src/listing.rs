// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::events::require_event;
use crate::repository::{InscriptionFilter, Repositories};
use capela_domain::{Event, Inscription, InscriptionRecord, InscriptionStatus};
use serde::Serialize;
use std::collections::HashMap;

/// An inscription as listed to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInscription {
    #[serde(flatten)]
    pub inscription: InscriptionRecord,
    /// `None` if the event has since been removed.
    pub event_title: Option<String>,
}

/// Lists the inscriptions of an event for administrators.
///
/// # Errors
///
/// Returns `EventNotFound` if the event does not exist.
pub async fn list_event_inscriptions(
    repos: &Repositories,
    event_id: &str,
    filter: InscriptionFilter,
) -> Result<Vec<InscriptionRecord>, CoreError> {
    require_event(repos, event_id).await?;
    let inscriptions: Vec<Inscription> = repos.inscriptions.find_by_event(event_id, filter).await?;
    Ok(inscriptions.iter().map(Inscription::to_record).collect())
}

/// Lists an account's own inscriptions, each with its event title.
///
/// # Errors
///
/// Returns `UserNotFound` if the account does not exist.
pub async fn list_user_inscriptions(
    repos: &Repositories,
    user_id: &str,
    status: Option<InscriptionStatus>,
) -> Result<Vec<UserInscription>, CoreError> {
    if repos.users.find_by_id(user_id).await?.is_none() {
        return Err(CoreError::UserNotFound(user_id.to_string()));
    }

    let inscriptions: Vec<Inscription> = repos.inscriptions.find_by_user(user_id, status).await?;
    let mut titles: HashMap<String, Option<String>> = HashMap::new();
    let mut listed: Vec<UserInscription> = Vec::with_capacity(inscriptions.len());

    for inscription in &inscriptions {
        if !titles.contains_key(inscription.event_id()) {
            let event: Option<Event> = repos.events.find_by_id(inscription.event_id()).await?;
            titles.insert(
                inscription.event_id().to_string(),
                event.map(|e| e.title().to_string()),
            );
        }
        listed.push(UserInscription {
            inscription: inscription.to_record(),
            event_title: titles.get(inscription.event_id()).cloned().flatten(),
        });
    }
    Ok(listed)
}
