//! Entity adapter contract.

use crate::error::StoreResult;
use crate::model::entity_id::EntityId;

/// Translates between stored rows and domain entities over one connection.
///
/// `C` is the connection type handed out by the store's provider. The adapter
/// owns all encoding and decoding; callers never inspect row shapes.
pub trait EntityAdapter<C> {
    type Entity;
    /// Filter accepted by [`EntityAdapter::browse`].
    type Query;

    /// Prepares storage for this entity type (schema bootstrap).
    ///
    /// Runs once while the owning store is starting.
    fn register(&self, conn: &mut C) -> StoreResult<()>;

    /// # Errors
    /// - `NotFound` when no entity with `id` is stored.
    fn read(&self, conn: &mut C, id: EntityId) -> StoreResult<Self::Entity>;

    /// Persists a new entity and returns its id.
    fn add(&self, conn: &mut C, entity: &Self::Entity) -> StoreResult<EntityId>;

    /// Replaces the stored entity `id`.
    ///
    /// # Errors
    /// - `NotFound` when no entity with `id` is stored.
    fn edit(&self, conn: &mut C, id: EntityId, entity: &Self::Entity) -> StoreResult<()>;

    /// # Errors
    /// - `NotFound` when no entity with `id` is stored.
    fn delete(&self, conn: &mut C, id: EntityId) -> StoreResult<()>;

    fn browse(&self, conn: &mut C, query: &Self::Query) -> StoreResult<Vec<Self::Entity>>;
}
