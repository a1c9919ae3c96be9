//! Domain model for persisted repository components.
//!
//! # Responsibility
//! - Define the entity identity shared by every store operation.
//! - Define the canonical component record returned to callers.
//!
//! # Invariants
//! - Every persisted component is identified by a stable `EntityId`.
//! - Returned components are owned by the caller; the store keeps no reference.

pub mod component;
pub mod entity_id;
