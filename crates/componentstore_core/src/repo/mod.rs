//! Entity adapter contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the row <-> domain translation contract consumed by the store.
//! - Isolate SQLite query details from lifecycle and connection handling.
//!
//! # Invariants
//! - Adapters operate only on the connection they are handed; they never
//!   open, cache or close connections themselves.
//! - Adapter APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod component_adapter;
pub mod entity_adapter;
