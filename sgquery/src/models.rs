//! Data structures for ShotGrid entities, filters and aggregated records

use indexmap::IndexMap;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// ShotGrid entity type of a project
pub const PROJECT: &str = "Project";
/// ShotGrid entity type of a sequence
pub const SEQUENCE: &str = "Sequence";
/// ShotGrid entity type of a shot
pub const SHOT: &str = "Shot";

/// Display-name field of sequences and shots
pub const DISPLAY_NAME_FIELD: &str = "code";
/// Entity-link field from a sequence to its project
pub const PROJECT_LINK_FIELD: &str = "project";
/// Entity-link field from a shot to its sequence
pub const SEQUENCE_LINK_FIELD: &str = "sg_sequence";

/// Query fields requested for both sequences and shots unless configured otherwise
pub const DEFAULT_QUERY_FIELDS: &[&str] = &["sg_cut_duration", "sg_ip_versions"];

/// Values of the query fields of one entity, in request order
pub type QueryFields = IndexMap<String, Value>;

/// Reference to a remote entity, as used in filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: i64,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }

    pub fn project(id: i64) -> Self {
        Self::new(PROJECT, id)
    }

    pub fn sequence(id: i64) -> Self {
        Self::new(SEQUENCE, id)
    }
}

impl From<EntityRef> for Value {
    fn from(entity: EntityRef) -> Self {
        serde_json::json!({ "type": entity.entity_type, "id": entity.id })
    }
}

/// Equality filter, serialized the way ShotGrid expects it: `[field, "is", value]`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    value: Value,
}

impl Filter {
    /// `field is value`
    pub fn is(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `id is <id>`
    pub fn id_is(id: i64) -> Self {
        Self::is("id", id)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element("is")?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// An entity as returned by the remote service
///
/// `fields` only holds the fields that were returned; `id` and `type` are
/// always known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: i64,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Value of a field, `id` and `type` included. `None` when the service
    /// did not return the field at all.
    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::from(self.id)),
            "type" => Some(Value::String(self.entity_type.clone())),
            _ => self.fields.get(field).cloned(),
        }
    }

    /// The `code` field as a string, empty when missing or not a string
    pub fn display_name(&self) -> String {
        self.fields
            .get(DISPLAY_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Ordered list of field names evaluated for each sequence and shot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFieldSet(Vec<String>);

impl QueryFieldSet {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for QueryFieldSet {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_FIELDS.iter().copied())
    }
}

/// One shot of a sequence, with its evaluated query fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub name: String,
    #[serde(flatten)]
    pub query_fields: QueryFields,
}

impl ShotRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.query_fields.get(name)
    }
}

/// One sequence of a project, with its evaluated query fields and its shots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub query_fields: QueryFields,
    #[serde(default)]
    pub shots: Vec<ShotRecord>,
}

impl SequenceRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.query_fields.get(name)
    }
}
