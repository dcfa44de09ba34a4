// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opening `SQLite` connections.
//!
//! Diesel has no DSL for PRAGMA statements, so they are issued here as raw
//! SQL and nowhere else.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a writer waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where a store keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Shared-cache in-memory database, gone when the last connection closes.
    Memory,
    /// Database file on disk, journaled in WAL mode.
    File,
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

fn pragma(conn: &mut SqliteConnection, statement: &str) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("PRAGMA {statement}"))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("PRAGMA {statement}: {e}")))?;
    Ok(())
}

/// Opens a database, configures it and brings its schema up to date.
///
/// Foreign keys are switched on and then read back: a connection that
/// silently ignores them would let orphaned inscriptions and payments in.
///
/// # Arguments
///
/// * `database_url` - A file path or a `file:` URI
/// * `storage` - Whether the database lives in memory or on disk
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a PRAGMA
/// fails, foreign keys stay disabled, or a migration fails.
pub fn open_connection(
    database_url: &str,
    storage: Storage,
) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, ?storage, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;

    pragma(&mut conn, "foreign_keys = ON")?;
    // Webhook deliveries and the expiry job may write at the same time.
    pragma(&mut conn, &format!("busy_timeout = {BUSY_TIMEOUT_MS}"))?;
    if storage == Storage::File {
        pragma(&mut conn, "journal_mode = WAL")?;
    }

    let enforced: ForeignKeysPragma =
        diesel::sql_query("PRAGMA foreign_keys").get_result::<ForeignKeysPragma>(&mut conn)?;
    if enforced.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    info!("SQLite schema is up to date");

    Ok(conn)
}
