//! Per-call connection supply with guaranteed release.
//!
//! # Responsibility
//! - Hand out a fresh connection handle for every call.
//! - Return handles to the provider on every exit path, including unwinding.
//!
//! # Invariants
//! - Handles are never cached or shared across calls.
//! - Every successful `acquire` is paired with exactly one `release`.
//! - `release` never fails observably.

use super::open::{open_db, DEFAULT_BUSY_TIMEOUT};
use crate::error::{StoreError, StoreResult};
use log::{debug, error, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Supplier of connection handles to one backing store.
pub trait ConnectionProvider {
    type Connection;

    /// Opens a new handle.
    ///
    /// # Errors
    /// - `ConnectionUnavailable` when the backing store cannot be reached
    ///   within the provider's bounded wait.
    fn acquire(&self) -> StoreResult<Self::Connection>;

    /// Closes a handle obtained from [`ConnectionProvider::acquire`].
    fn release(&self, connection: Self::Connection);

    /// Acquires a handle wrapped in a guard that releases it on drop.
    fn scoped(&self) -> StoreResult<ScopedConnection<'_, Self>>
    where
        Self: Sized,
    {
        ScopedConnection::acquire(self)
    }
}

/// Connection handle owned by a single call.
///
/// Released on drop, so early returns, `?` propagation and panics all hand
/// the handle back. Explicit [`ScopedConnection::release`] is idempotent.
pub struct ScopedConnection<'p, P: ConnectionProvider> {
    provider: &'p P,
    connection: Option<P::Connection>,
}

impl<'p, P: ConnectionProvider> ScopedConnection<'p, P> {
    pub fn acquire(provider: &'p P) -> StoreResult<Self> {
        let connection = provider.acquire()?;
        Ok(Self {
            provider,
            connection: Some(connection),
        })
    }

    /// Borrows the live handle.
    ///
    /// # Errors
    /// - `ConnectionUnavailable` after the handle has been released.
    pub fn connection(&mut self) -> StoreResult<&mut P::Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| StoreError::ConnectionUnavailable("connection already released".into()))
    }

    /// Returns the handle to the provider. Later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.provider.release(connection);
        }
    }

    pub fn is_released(&self) -> bool {
        self.connection.is_none()
    }
}

impl<P: ConnectionProvider> Drop for ScopedConnection<'_, P> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens one SQLite connection per call against a database file.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteConnectionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn with_busy_timeout(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    type Connection = Connection;

    fn acquire(&self) -> StoreResult<Connection> {
        let started_at = Instant::now();
        match open_db(&self.path, self.busy_timeout) {
            Ok(conn) => {
                debug!(
                    "event=connection_acquire module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=connection_acquire module=db status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::ConnectionUnavailable(format!(
                    "{}: {err}",
                    self.path.display()
                )))
            }
        }
    }

    fn release(&self, connection: Connection) {
        match connection.close() {
            Ok(()) => debug!("event=connection_release module=db status=ok"),
            Err((conn, err)) => {
                warn!(
                    "event=connection_release module=db status=error error_code=db_close_failed error={}",
                    err
                );
                drop(conn);
            }
        }
    }
}
