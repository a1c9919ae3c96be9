//! Store error taxonomy.
//!
//! # Responsibility
//! - Define the single error type surfaced by guarded store operations.
//! - Keep expected outcomes (`NotFound`) distinguishable from faults.
//!
//! # Invariants
//! - Adapter failures pass through unchanged; the store only adds guard
//!   failures (`NotReady`, `ComponentFailed`) and `ConnectionUnavailable`.

use crate::db::DbError;
use crate::lifecycle::LifecyclePhase;
use crate::model::component::ComponentValidationError;
use crate::model::entity_id::EntityId;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Operation invoked outside its allowed phases. Callers may retry once
    /// the store finishes starting; the store never retries on its own.
    #[error("store is not ready for `{operation}`: current phase is {phase}")]
    NotReady {
        operation: &'static str,
        phase: LifecyclePhase,
    },
    /// The store reached the terminal `Failed` phase.
    #[error("store has failed and rejects `{operation}`")]
    ComponentFailed { operation: &'static str },
    #[error("backing store connection unavailable: {0}")]
    ConnectionUnavailable(String),
    #[error("entity not found: {0}")]
    NotFound(EntityId),
    /// Lifecycle sequencing error. The phase is left unchanged.
    #[error("illegal lifecycle transition from {from} to {to}")]
    IllegalTransition {
        from: LifecyclePhase,
        to: LifecyclePhase,
    },
    #[error(transparent)]
    Validation(#[from] ComponentValidationError),
    #[error("invalid persisted entity data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl StoreError {
    /// Returns `true` for outcomes that are part of normal operation rather
    /// than faults.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` when the failure came from the lifecycle guard.
    pub fn is_guard_rejection(&self) -> bool {
        matches!(self, Self::NotReady { .. } | Self::ComponentFailed { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::lifecycle::LifecyclePhase;
    use crate::model::entity_id::EntityId;

    #[test]
    fn not_found_is_expected_outcome() {
        assert!(StoreError::NotFound(EntityId::generate()).is_expected());
        assert!(!StoreError::ConnectionUnavailable("down".to_string()).is_expected());
        assert!(!StoreError::ComponentFailed { operation: "read" }.is_expected());
    }

    #[test]
    fn guard_rejections_are_classified() {
        let not_ready = StoreError::NotReady {
            operation: "read",
            phase: LifecyclePhase::Starting,
        };
        assert!(not_ready.is_guard_rejection());
        assert!(not_ready.to_string().contains("STARTING"));
        assert!(!StoreError::NotFound(EntityId::generate()).is_guard_rejection());
    }
}
