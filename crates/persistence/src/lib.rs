// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for events, inscriptions, payments, accounts and
//! the audit trail.
//!
//! The store implements every repository contract from `capela`, so the
//! server builds its [`capela::Repositories`] from a single
//! [`SqliteStore`].
//!
//! ## Uniqueness
//!
//! The duplicate checks performed by the use cases are advisory. Two
//! partial unique indexes on `inscriptions` are what actually guarantee at
//! most one live inscription per account and per CPF in each event, so a
//! racing second insert fails with a conflict instead of slipping through.
//!
//! ## Testing
//!
//! Tests run against isolated shared-cache in-memory databases created by
//! [`SqliteStore::new_in_memory`].

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::backend::sqlite::Storage;

mod backend;
mod convert;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod repositories;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `SQLite`-backed implementation of the repository contracts.
///
/// Cloning is cheap; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) conn: Arc<Mutex<SqliteConnection>>,
}

impl SqliteStore {
    /// Creates a store over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:memdb_capela_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection =
            backend::sqlite::open_connection(&shared_memory_url, Storage::Memory)?;

        Ok(Self::from_connection(conn))
    }

    /// Opens (or creates) a file-based database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection = backend::sqlite::open_connection(path_str, Storage::File)?;

        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}
