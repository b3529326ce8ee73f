//! Per-entity evaluation of query fields
//!
//! Query fields are computed by ShotGrid on read, so they are resolved with
//! one id lookup per entity instead of being requested on the list call.

use crate::error::Result;
use crate::models::{Filter, QueryFields};
use crate::service::EntityService;
use serde_json::Value;
use tracing::debug;

/// Evaluates `field_names` on the entity `entity_type`/`entity_id`
///
/// Plain attributes and query fields are requested the same way.
///
/// # Returns
///
/// - the entity exists: one entry per requested name, in request order, with
///   `null` for any field the service did not return
/// - the entity does not exist: an empty mapping
///
/// # Errors
///
/// Service errors are returned unchanged.
pub async fn evaluate_query_fields<S>(
    service: &S,
    entity_type: &str,
    entity_id: i64,
    field_names: &[&str],
) -> Result<QueryFields>
where
    S: EntityService + ?Sized,
{
    debug!(entity_type, entity_id, ?field_names, "Evaluating query fields");

    let entity = service
        .find_one(entity_type, &[Filter::id_is(entity_id)], field_names)
        .await?;

    let Some(entity) = entity else {
        debug!(entity_type, entity_id, "Entity not found, no fields to report");
        return Ok(QueryFields::new());
    };

    Ok(field_names
        .iter()
        .map(|name| (name.to_string(), entity.get(name).unwrap_or(Value::Null)))
        .collect())
}
