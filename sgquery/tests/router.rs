//! HTTP router tests over an empty entity store

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sgquery::api_rest::{SequencesState, create_router};
use sgquery::{Entity, EntityService, Filter, Result};
use std::sync::Arc;
use tower::ServiceExt;

struct EmptyStore;

#[async_trait]
impl EntityService for EmptyStore {
    async fn find(&self, _: &str, _: &[Filter], _: &[&str]) -> Result<Vec<Entity>> {
        Ok(Vec::new())
    }

    async fn find_one(&self, _: &str, _: &[Filter], _: &[&str]) -> Result<Option<Entity>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_router_is_built_by_default() {
    let router = create_router(SequencesState::new(Arc::new(EmptyStore), 85));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/projects/85/sequences")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!([]));
}
