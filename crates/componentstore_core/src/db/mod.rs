//! SQLite storage bootstrap, connection scoping and schema migrations.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the component store.
//! - Hand out one connection per call and guarantee its release.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A connection is owned by exactly one call and never reused.

use thiserror::Error;

pub mod migrations;
mod open;
pub mod provider;

pub use open::{open_db, DEFAULT_BUSY_TIMEOUT};
pub use provider::{ConnectionProvider, ScopedConnection, SqliteConnectionProvider};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
