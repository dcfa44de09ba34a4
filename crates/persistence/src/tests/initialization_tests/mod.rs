// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test goes through `SqliteStore::new_in_memory()`
//! and so exercises migrations and foreign key enforcement implicitly.

use super::{EVENT_ID, account, create_test_event, create_test_inscription, create_test_store};
use crate::{PersistenceError, SqliteStore};
use capela::RepositoryError;
use capela_domain::EventStatus;
use time::macros::date;

#[test]
fn test_persistence_initialization() {
    let result: Result<SqliteStore, PersistenceError> = SqliteStore::new_in_memory();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_multiple_in_memory_instances_are_isolated() {
    let (_db1, repos1) = create_test_store();
    let (_db2, repos2) = create_test_store();

    repos1
        .events
        .save(&create_test_event(EVENT_ID, EventStatus::Open, date!(2026 - 03 - 10)))
        .await
        .unwrap();

    assert!(repos1.events.find_by_id(EVENT_ID).await.unwrap().is_some());
    assert!(repos2.events.find_by_id(EVENT_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let (_store, repos) = create_test_store();
    // No such event or account.
    let orphan = create_test_inscription("ins-1", account("ghost", None));

    let result = repos.inscriptions.save(&orphan).await;
    assert!(matches!(result, Err(RepositoryError::Missing(_))));
}

#[test]
fn test_error_mapping() {
    assert_eq!(
        RepositoryError::from(PersistenceError::UniqueViolation(String::from("x"))),
        RepositoryError::Conflict(String::from("x"))
    );
    assert_eq!(
        RepositoryError::from(PersistenceError::ReconstructionError(String::from("bad"))),
        RepositoryError::Corrupt(String::from("bad"))
    );
    assert!(matches!(
        RepositoryError::from(PersistenceError::QueryFailed(String::from("locked"))),
        RepositoryError::Unavailable(_)
    ));
}

#[tokio::test]
async fn test_file_store_survives_reopening() {
    let path = std::env::temp_dir().join(format!(
        "capela-init-{}-{}.db",
        std::process::id(),
        time::OffsetDateTime::now_utc().unix_timestamp_nanos()
    ));

    {
        let store: SqliteStore = SqliteStore::new_with_file(&path).unwrap();
        let repos = capela::Repositories::from_store(std::sync::Arc::new(store));
        repos
            .events
            .save(&create_test_event(EVENT_ID, EventStatus::Open, date!(2026 - 03 - 10)))
            .await
            .unwrap();
    }

    // Migrations are already applied; reopening must not fail or wipe data.
    let reopened: SqliteStore = SqliteStore::new_with_file(&path).unwrap();
    let repos = capela::Repositories::from_store(std::sync::Arc::new(reopened));
    assert!(repos.events.find_by_id(EVENT_ID).await.unwrap().is_some());

    drop(repos);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
