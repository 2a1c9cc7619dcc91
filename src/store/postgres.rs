use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{parse_id, Document, DocumentStore, Fields, StoreError};
use crate::config::DatabaseConfig;

/// PostgreSQL-backed store. Each collection is a table holding the document
/// fields as JSONB next to the id and timestamp columns.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Fields>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            fields: row.data.0,
            created: row.created,
            updated: row.updated,
        }
    }
}

impl PgStore {
    /// Connect using the configured URL and pool settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to database: {}", redact_url(url));
        Ok(Self::new(pool))
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing tables for `collections` if they do not exist yet.
    pub async fn ensure_collections(&self, collections: &[&str]) -> Result<(), StoreError> {
        for collection in collections {
            let table = table_name(collection)?;
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id UUID PRIMARY KEY,
                    data JSONB NOT NULL,
                    created TIMESTAMPTZ NOT NULL,
                    updated TIMESTAMPTZ NOT NULL
                )"
            );
            sqlx::query(&sql).execute(&self.pool).await?;
            info!("Ensured collection table: {}", collection);
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let table = table_name(collection)?;
        let doc = Document::new(fields);
        let sql = format!(
            "INSERT INTO {table} (id, data, created, updated) VALUES ($1, $2, $3, $4)
             RETURNING id, data, created, updated"
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(doc.id)
            .bind(Json(&doc.fields))
            .bind(doc.created)
            .bind(doc.updated)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let table = table_name(collection)?;
        let sql = format!("SELECT id, data, created, updated FROM {table} ORDER BY created, id");

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let id = parse_id(id)?;
        let sql = format!("SELECT id, data, created, updated FROM {table} WHERE id = $1");

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn find_one(&self, collection: &str, field: &str, value: &Value) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let sql = format!(
            "SELECT id, data, created, updated FROM {table}
             WHERE data -> $1 = $2 ORDER BY created, id LIMIT 1"
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(field)
            .bind(Json(value))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn replace_by_id(&self, collection: &str, id: &str, fields: Fields) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let id = parse_id(id)?;
        let sql = format!(
            "UPDATE {table} SET data = $2, updated = $3 WHERE id = $1
             RETURNING id, data, created, updated"
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(Json(&fields))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let id = parse_id(id)?;
        let sql = format!("DELETE FROM {table} WHERE id = $1 RETURNING id, data, created, updated");

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let table = table_name(collection)?;
        let result = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Validate a collection name and quote it as a table identifier.
fn table_name(collection: &str) -> Result<String, StoreError> {
    if !is_valid_collection_name(collection) {
        return Err(StoreError::InvalidCollection(collection.to_string()));
    }
    Ok(quote_identifier(collection))
}

/// Collection names are lowercase ASCII letters, digits and underscores,
/// starting with a letter.
fn is_valid_collection_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Strip the password from a connection string before logging it.
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
