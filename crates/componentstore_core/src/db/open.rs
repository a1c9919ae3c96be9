//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open one file-backed SQLite connection.
//! - Configure connection pragmas required by store behavior.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections wait at most `busy_timeout` on a locked database.

use super::DbResult;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Bounded wait applied to every connection unless configured otherwise.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens and configures one SQLite connection.
///
/// Does not migrate; schema bootstrap runs once during store start.
pub fn open_db(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}
