//! Database layout shared by [`SqliteContentStore`](crate::SqliteContentStore)
//! and [`SqliteLedger`](crate::SqliteLedger).
//!
//! One file holds both tables: `blobs` (snapshot bytes keyed by content hash,
//! with the pin label) and `registry` (append-only ledger rows). Each backend
//! opens its own connection, so every connection gets a busy timeout and the
//! migration step must be safe to run from either side first.

use std::time::Duration;

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// How long a connection waits on the other backend's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(include_str!(
        "migrations/001_initial_schema.sql"
    ))])
}

/// Opens `path`, creating the blob and registry tables if needed.
pub fn open_database(path: &str) -> Result<Connection, StorageError> {
    prepare(Connection::open(path)?)
}

/// In-memory database with the same tables, private to one connection.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(mut conn: Connection) -> Result<Connection, StorageError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    migrations()
        .to_latest(&mut conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(conn)
}
