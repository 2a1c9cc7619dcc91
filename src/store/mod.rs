use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Field map of a stored document, without identifier or timestamps.
pub type Fields = Map<String, Value>;

/// Errors from document store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Not found")]
    NotFound,

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A stored record: store-assigned id, caller fields and automatic timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub fields: Fields,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Document {
    pub fn new(fields: Fields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            fields,
            created: now,
            updated: now,
        }
    }

    /// Render as the JSON object returned to clients, leaving out `hidden` fields.
    pub fn to_json(&self, hidden: &[&str]) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 3);
        out.insert("_id".to_string(), Value::String(self.id.to_string()));
        for (key, value) in &self.fields {
            if hidden.contains(&key.as_str()) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        out.insert("created".to_string(), Value::String(format_timestamp(&self.created)));
        out.insert("updated".to_string(), Value::String(format_timestamp(&self.updated)));
        Value::Object(out)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a caller-supplied identifier.
pub fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id.trim()).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Persistence capability for the resource collections.
///
/// Every operation is atomic for a single document. Nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, assigning its id and timestamps.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// All documents of a collection, oldest first.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// First document whose `field` equals `value` exactly.
    async fn find_one(&self, collection: &str, field: &str, value: &Value) -> Result<Option<Document>, StoreError>;

    /// Replace the fields of a document and bump its `updated` timestamp.
    async fn replace_by_id(&self, collection: &str, id: &str, fields: Fields) -> Result<Option<Document>, StoreError>;

    /// Remove a document, returning it when it existed.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Remove every document in the collection, returning how many were removed.
    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError>;

    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
