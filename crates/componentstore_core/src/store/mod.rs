//! Lifecycle-guarded entity store.
//!
//! # Responsibility
//! - Expose the only entry points callers use to reach persisted entities.
//! - Compose phase guarding, per-call connection scoping and adapter
//!   delegation into one template shared by every operation.
//!
//! # Invariants
//! - No operation touches the connection provider unless the store is
//!   `Started`.
//! - Every acquired connection is released before the operation returns,
//!   whatever the outcome.
//! - Adapter results and failures are returned unchanged.

use crate::config::StoreConfig;
use crate::db::{ConnectionProvider, SqliteConnectionProvider};
use crate::error::StoreResult;
use crate::lifecycle::{Lifecycle, LifecyclePhase, StateGuard, STARTED};
use crate::model::entity_id::EntityId;
use crate::repo::component_adapter::SqliteComponentAdapter;
use crate::repo::entity_adapter::EntityAdapter;
use log::debug;
use std::path::PathBuf;
use std::time::Instant;

/// Entity store whose operations run only while it is started.
///
/// `P` supplies one connection per call; `A` translates entities over that
/// connection. Both are owned by the store. The store is `Sync` whenever
/// they are, and performs no cross-call locking.
pub struct GuardedStore<P, A> {
    guard: StateGuard,
    provider: P,
    adapter: A,
}

/// SQLite-backed store of repository components.
pub type ComponentStore = GuardedStore<SqliteConnectionProvider, SqliteComponentAdapter>;

impl<P, A> GuardedStore<P, A>
where
    P: ConnectionProvider,
    A: EntityAdapter<P::Connection>,
{
    /// Creates a store in phase `Created`.
    pub fn new(provider: P, adapter: A) -> Self {
        Self {
            guard: StateGuard::new("entity_store"),
            provider,
            adapter,
        }
    }

    /// Reads one entity.
    ///
    /// # Errors
    /// - `NotReady` / `ComponentFailed` outside `Started`.
    /// - `ConnectionUnavailable` when no connection can be acquired.
    /// - `NotFound` when no entity with `id` is stored.
    pub fn read(&self, id: EntityId) -> StoreResult<A::Entity> {
        self.with_connection("read", |adapter, conn| adapter.read(conn, id))
    }

    /// Persists a new entity and returns its id.
    pub fn create(&self, entity: &A::Entity) -> StoreResult<EntityId> {
        self.with_connection("create", |adapter, conn| adapter.add(conn, entity))
    }

    /// Replaces the stored entity `id`.
    pub fn update(&self, id: EntityId, entity: &A::Entity) -> StoreResult<()> {
        self.with_connection("update", |adapter, conn| adapter.edit(conn, id, entity))
    }

    pub fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.with_connection("delete", |adapter, conn| adapter.delete(conn, id))
    }

    pub fn browse(&self, query: &A::Query) -> StoreResult<Vec<A::Entity>> {
        self.with_connection("browse", |adapter, conn| adapter.browse(conn, query))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn with_connection<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&A, &mut P::Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.guard.guarded(STARTED, operation, || {
            let started_at = Instant::now();
            let mut scoped = self.provider.scoped()?;
            let result = body(&self.adapter, scoped.connection()?);
            scoped.release();

            debug!(
                "event=store_op module=store status={} operation={} duration_ms={}",
                if result.is_ok() { "ok" } else { "error" },
                operation,
                started_at.elapsed().as_millis()
            );
            result
        })
    }
}

impl<P, A> Lifecycle for GuardedStore<P, A>
where
    P: ConnectionProvider,
    A: EntityAdapter<P::Connection>,
{
    /// Registers the adapter's schema over one scoped connection.
    fn start(&self) -> StoreResult<()> {
        self.guard.start_with(|| {
            let mut scoped = self.provider.scoped()?;
            let conn = scoped.connection()?;
            self.adapter.register(conn)
        })
    }

    fn stop(&self) -> StoreResult<()> {
        self.guard.stop_with(|| Ok(()))
    }

    fn phase(&self) -> LifecyclePhase {
        self.guard.current()
    }
}

impl ComponentStore {
    /// Builds an unstarted store over the SQLite file at `path`.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::new(
            SqliteConnectionProvider::new(path),
            SqliteComponentAdapter::new(),
        )
    }

    /// Builds an unstarted store from resolved configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            SqliteConnectionProvider::with_busy_timeout(&config.db_path, config.busy_timeout),
            SqliteComponentAdapter::new(),
        )
    }
}
