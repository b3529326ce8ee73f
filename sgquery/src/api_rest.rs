//! HTTP endpoints serving the sequence aggregation as JSON
//!
//! - `GET /info`: service name and version
//! - `GET /sequences`: sequences of the configured project
//! - `GET /projects/{project_id}/sequences`: sequences of any project

use crate::aggregator::SequenceAggregator;
use crate::error::ShotGridError;
use crate::models::{QueryFieldSet, SequenceRecord};
use crate::service::EntityService;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Shared state of the router
#[derive(Clone)]
pub struct SequencesState {
    pub service: Arc<dyn EntityService>,
    pub query_fields: QueryFieldSet,
    /// Project served by `GET /sequences`
    pub default_project_id: i64,
}

impl SequencesState {
    pub fn new(service: Arc<dyn EntityService>, default_project_id: i64) -> Self {
        Self {
            service,
            query_fields: QueryFieldSet::default(),
            default_project_id,
        }
    }

    pub fn with_query_fields(mut self, query_fields: QueryFieldSet) -> Self {
        self.query_fields = query_fields;
        self
    }

    async fn aggregate(&self, project_id: i64) -> Result<Vec<SequenceRecord>, AppError> {
        let aggregator =
            SequenceAggregator::with_query_fields(self.service.as_ref(), self.query_fields.clone());
        Ok(aggregator.get_sequence_query_results(project_id).await?)
    }
}

#[derive(Debug, Serialize)]
struct InfoResponse {
    name: &'static str,
    version: &'static str,
    default_project_id: i64,
    query_fields: Vec<String>,
}

/// Builds the router over `state`
pub fn create_router(state: SequencesState) -> Router {
    Router::new()
        .route("/info", get(get_info))
        .route("/sequences", get(get_default_sequences))
        .route("/projects/{project_id}/sequences", get(get_project_sequences))
        .with_state(state)
}

async fn get_info(State(state): State<SequencesState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "sgsequences",
        version: env!("CARGO_PKG_VERSION"),
        default_project_id: state.default_project_id,
        query_fields: state.query_fields.names().iter().map(|s| s.to_string()).collect(),
    })
}

async fn get_default_sequences(
    State(state): State<SequencesState>,
) -> Result<Json<Vec<SequenceRecord>>, AppError> {
    let records = state.aggregate(state.default_project_id).await?;
    Ok(Json(records))
}

async fn get_project_sequences(
    State(state): State<SequencesState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<SequenceRecord>>, AppError> {
    let records = state.aggregate(project_id).await?;
    Ok(Json(records))
}

// ============ Error handling ============

struct AppError(ShotGridError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ShotGridError::Unauthorized(_)
            | ShotGridError::NotFound(_)
            | ShotGridError::Http(_)
            | ShotGridError::JsonParse(_)
            | ShotGridError::ApiError { .. }
            | ShotGridError::ConnectionFailed(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed ({}): {}", status, self.0);

        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ShotGridError>,
{
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}
