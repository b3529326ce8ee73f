//! Capability surface of the remote entity service
//!
//! The aggregation code only needs two operations from ShotGrid: list the
//! entities matching a filter, and fetch one entity matching a filter. Both
//! are expressed by [`EntityService`] so that the aggregator can be driven by
//! the REST client in production and by an in-memory double in tests.

use crate::error::Result;
use crate::models::{Entity, Filter};
use async_trait::async_trait;

/// Read access to a ShotGrid-like entity store
///
/// Implementations must be `Send + Sync` to be shared by HTTP handlers.
#[async_trait]
pub trait EntityService: Send + Sync {
    /// Returns every entity of `entity_type` matching all `filters`, with the
    /// requested `fields`, in the service's listing order.
    async fn find(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Vec<Entity>>;

    /// Returns the first entity of `entity_type` matching all `filters`, or
    /// `None` when nothing matches.
    async fn find_one(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Option<Entity>>;
}
