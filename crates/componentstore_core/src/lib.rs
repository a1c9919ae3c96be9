//! Lifecycle-guarded component store.
//!
//! Every entity operation runs only while the store is started, on a
//! connection acquired for that call alone and released on every exit path.

pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use db::{ConnectionProvider, DbError, ScopedConnection, SqliteConnectionProvider};
pub use error::{StoreError, StoreResult};
pub use lifecycle::{Guard, Lifecycle, LifecyclePhase, StateGuard, STARTED};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::component::{Component, ComponentValidationError};
pub use model::entity_id::EntityId;
pub use repo::component_adapter::{ComponentQuery, SqliteComponentAdapter};
pub use repo::entity_adapter::EntityAdapter;
pub use store::{ComponentStore, GuardedStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
