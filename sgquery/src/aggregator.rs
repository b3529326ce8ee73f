//! Sequence/shot aggregation for a project
//!
//! Builds the nested `sequences -> shots` structure in two stages:
//!
//! 1. list the project's sequences and evaluate their query fields
//! 2. for every sequence, list its shots and evaluate their query fields
//!
//! All remote calls are issued one after the other, in listing order.

use crate::error::Result;
use crate::evaluator::evaluate_query_fields;
use crate::models::{
    EntityRef, Filter, PROJECT_LINK_FIELD, QueryFieldSet, QueryFields, SEQUENCE,
    SEQUENCE_LINK_FIELD, SHOT, SequenceRecord, ShotRecord,
};
use crate::service::EntityService;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Fields requested on the list calls
const LIST_FIELDS: &[&str] = &["id", "code"];

/// Aggregates sequences and shots of a project through an [`EntityService`]
///
/// The service is borrowed, so one connection handle can serve any number of
/// aggregations.
///
/// # Example
///
/// ```rust,no_run
/// use sgquery::{SequenceAggregator, ShotGridConnector};
///
/// # async fn example(connector: ShotGridConnector) -> sgquery::Result<()> {
/// let client = connector.get_connection().await?;
/// let sequences = SequenceAggregator::new(client.as_ref())
///     .get_sequence_query_results(85)
///     .await?;
/// for sequence in &sequences {
///     println!("{}: {} shots", sequence.name, sequence.shots.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SequenceAggregator<'a, S: ?Sized> {
    service: &'a S,
    query_fields: QueryFieldSet,
}

impl<'a, S> SequenceAggregator<'a, S>
where
    S: EntityService + ?Sized,
{
    /// Aggregator using the default query fields
    pub fn new(service: &'a S) -> Self {
        Self::with_query_fields(service, QueryFieldSet::default())
    }

    pub fn with_query_fields(service: &'a S, query_fields: QueryFieldSet) -> Self {
        Self {
            service,
            query_fields,
        }
    }

    pub fn query_fields(&self) -> &QueryFieldSet {
        &self.query_fields
    }

    /// Retrieves all sequences of `project_id` with their shots, each
    /// carrying the evaluated query fields
    pub async fn get_sequence_query_results(&self, project_id: i64) -> Result<Vec<SequenceRecord>> {
        info!(project_id, "Aggregating sequences");

        let mut sequences = self.collect_sequences(project_id).await?;
        for sequence in &mut sequences {
            sequence.shots = self.collect_shots(sequence.id).await?;
        }

        info!(
            project_id,
            sequences = sequences.len(),
            shots = sequences.iter().map(|s| s.shots.len()).sum::<usize>(),
            "Aggregation done"
        );
        Ok(sequences)
    }

    async fn collect_sequences(&self, project_id: i64) -> Result<Vec<SequenceRecord>> {
        let filters = [Filter::is(PROJECT_LINK_FIELD, EntityRef::project(project_id))];
        let entities = self.service.find(SEQUENCE, &filters, LIST_FIELDS).await?;
        debug!(project_id, count = entities.len(), "Sequences listed");

        let mut records = Vec::with_capacity(entities.len());
        for entity in entities {
            let query_fields = self.evaluate(SEQUENCE, entity.id).await?;
            records.push(SequenceRecord {
                id: entity.id,
                name: entity.display_name(),
                query_fields,
                shots: Vec::new(),
            });
        }
        Ok(records)
    }

    async fn collect_shots(&self, sequence_id: i64) -> Result<Vec<ShotRecord>> {
        let filters = [Filter::is(SEQUENCE_LINK_FIELD, EntityRef::sequence(sequence_id))];
        let entities = self.service.find(SHOT, &filters, LIST_FIELDS).await?;
        debug!(sequence_id, count = entities.len(), "Shots listed");

        let mut records = Vec::with_capacity(entities.len());
        for entity in entities {
            let query_fields = self.evaluate(SHOT, entity.id).await?;
            records.push(ShotRecord {
                name: entity.display_name(),
                query_fields,
            });
        }
        Ok(records)
    }

    /// Evaluates the query fields of one entity; an entity that vanished
    /// since the list call gets `null` for every declared field.
    async fn evaluate(&self, entity_type: &str, entity_id: i64) -> Result<QueryFields> {
        let names = self.query_fields.names();
        let fields = evaluate_query_fields(self.service, entity_type, entity_id, &names).await?;
        if fields.is_empty() && !names.is_empty() {
            warn!(entity_type, entity_id, "Entity not found on lookup, reporting null fields");
            return Ok(names.iter().map(|n| (n.to_string(), Value::Null)).collect());
        }
        Ok(fields)
    }
}

/// Aggregates `project_id` with the default query fields
pub async fn get_sequence_query_results<S>(service: &S, project_id: i64) -> Result<Vec<SequenceRecord>>
where
    S: EntityService + ?Sized,
{
    SequenceAggregator::new(service)
        .get_sequence_query_results(project_id)
        .await
}
