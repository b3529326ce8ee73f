//! Entity search through `/entity/{collection}/_search`

use super::{ARRAY_FILTER_CONTENT_TYPE, ShotGridApi};
use crate::error::Result;
use crate::models::{Entity, Filter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Body of a search request
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    filters: &'a [Filter],
    fields: &'a [&'a str],
    page: Page,
}

/// Requested result page (1-based)
#[derive(Debug, Clone, Copy, Serialize)]
struct Page {
    number: u32,
    size: u32,
}

/// Answer of a search request
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<EntityResponse>,
}

/// One entity record of the REST API
#[derive(Debug, Deserialize)]
struct EntityResponse {
    #[serde(rename = "type")]
    entity_type: String,
    id: i64,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    relationships: IndexMap<String, RelationshipResponse>,
}

/// Entity link field: `{"data": {"type": ..., "id": ...}}` or a list of those
#[derive(Debug, Deserialize)]
struct RelationshipResponse {
    #[serde(default)]
    data: Value,
}

impl EntityResponse {
    fn into_entity(self) -> Entity {
        let mut entity = Entity::new(self.entity_type, self.id);
        entity.fields = self.attributes;
        for (name, relationship) in self.relationships {
            entity.fields.insert(name, relationship.data);
        }
        entity
    }
}

/// REST collection name of an entity type: `Sequence` -> `sequences`,
/// `CustomEntity01` -> `custom_entity01s`
pub fn collection_name(entity_type: &str) -> String {
    let mut name = String::with_capacity(entity_type.len() + 2);
    for (i, c) in entity_type.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name.push('s');
    name
}

impl ShotGridApi {
    async fn search_page(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
        page: Page,
    ) -> Result<Vec<Entity>> {
        let endpoint = format!("/entity/{}/_search", collection_name(entity_type));
        let request = SearchRequest {
            filters,
            fields,
            page,
        };

        let response: SearchResponse = self
            .post_json(&endpoint, ARRAY_FILTER_CONTENT_TYPE, &request)
            .await?;

        Ok(response
            .data
            .into_iter()
            .map(EntityResponse::into_entity)
            .collect())
    }

    /// Lists every entity of `entity_type` matching `filters`
    ///
    /// Result pages are requested until a short page comes back, so the
    /// caller always gets the complete listing.
    pub async fn find(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();
        let mut number = 1;

        loop {
            let page = Page {
                number,
                size: self.page_size,
            };
            let batch = self.search_page(entity_type, filters, fields, page).await?;
            let done = batch.len() < self.page_size as usize;
            entities.extend(batch);

            if done {
                break;
            }
            number += 1;
        }

        debug!("Found {} {} entities in {} page(s)", entities.len(), entity_type, number);
        Ok(entities)
    }

    /// Returns the first entity of `entity_type` matching `filters`
    pub async fn find_one(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[&str],
    ) -> Result<Option<Entity>> {
        let page = Page { number: 1, size: 1 };
        let batch = self.search_page(entity_type, filters, fields, page).await?;
        Ok(batch.into_iter().next())
    }
}
