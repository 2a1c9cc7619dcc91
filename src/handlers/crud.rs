// handlers/crud.rs - generic CRUD controller shared by every resource
//
// A resource only supplies its model (`impl Resource`); the controller and
// the six axum handlers below are instantiated per model in the router.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::extract::{rejection::PathRejection, Path, State};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{record_to_api_value, records_to_api_values, ApiJson};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{normalize, strip_reserved, Resource};
use crate::state::AppState;
use crate::store::{Document, DocumentStore, Fields, StoreError};

/// CRUD operations for one resource type over the shared document store
pub struct CrudController<R: Resource> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<R>,
}

impl<R: Resource> CrudController<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Every record in the collection, oldest first
    pub async fn get_all(&self) -> Result<Vec<Document>, ApiError> {
        self.store.find_all(R::COLLECTION).await.map_err(store_error::<R>)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Document, ApiError> {
        self.store
            .find_by_id(R::COLLECTION, id)
            .await
            .map_err(store_error::<R>)?
            .ok_or_else(not_found::<R>)
    }

    pub async fn create(&self, body: Value) -> Result<Document, ApiError> {
        let supplied = strip_reserved(into_fields(body)?);
        let fields = normalize::<R>(supplied.clone(), &supplied)?;
        self.ensure_unique(&fields, None).await?;

        let doc = self
            .store
            .insert(R::COLLECTION, fields)
            .await
            .map_err(store_error::<R>)?;
        info!(collection = R::COLLECTION, id = %doc.id, "{} created", R::NAME);
        Ok(doc)
    }

    /// Partial merge: supplied fields overwrite, everything else is kept. The
    /// merged record is validated as if it were new.
    pub async fn update(&self, id: &str, body: Value) -> Result<Document, ApiError> {
        let supplied = strip_reserved(into_fields(body)?);
        let existing = self.get_by_id(id).await?;

        let mut merged = existing.fields;
        merged.extend(supplied.clone());
        let fields = normalize::<R>(merged, &supplied)?;
        self.ensure_unique(&fields, Some(existing.id)).await?;

        let doc = self
            .store
            .replace_by_id(R::COLLECTION, id, fields)
            .await
            .map_err(store_error::<R>)?
            .ok_or_else(not_found::<R>)?;
        info!(collection = R::COLLECTION, id = %doc.id, "{} updated", R::NAME);
        Ok(doc)
    }

    pub async fn remove(&self, id: &str) -> Result<Document, ApiError> {
        let doc = self
            .store
            .delete_by_id(R::COLLECTION, id)
            .await
            .map_err(store_error::<R>)?
            .ok_or_else(not_found::<R>)?;
        info!(collection = R::COLLECTION, id = %doc.id, "{} deleted", R::NAME);
        Ok(doc)
    }

    /// Unconditional bulk delete. Returns the number of removed records.
    pub async fn remove_all(&self) -> Result<u64, ApiError> {
        let count = self
            .store
            .delete_all(R::COLLECTION)
            .await
            .map_err(store_error::<R>)?;
        info!(collection = R::COLLECTION, count, "All {}s deleted", R::NAME);
        Ok(count)
    }

    /// Reject writes that would duplicate a unique field of another record.
    async fn ensure_unique(&self, fields: &Fields, own_id: Option<uuid::Uuid>) -> Result<(), ApiError> {
        for field in R::UNIQUE {
            let Some(value) = fields.get(*field) else {
                continue;
            };
            let existing = self
                .store
                .find_one(R::COLLECTION, field, value)
                .await
                .map_err(store_error::<R>)?;

            if let Some(other) = existing {
                if Some(other.id) != own_id {
                    return Err(ApiError::conflict(format!(
                        "{} with this {} already exists",
                        R::NAME,
                        field
                    )));
                }
            }
        }
        Ok(())
    }
}

fn into_fields(body: Value) -> Result<Fields, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(format!("{} not found", R::NAME))
}

/// Map store failures using the resource's display name
fn store_error<R: Resource>(err: StoreError) -> ApiError {
    match err {
        StoreError::InvalidId(_) => ApiError::bad_request(format!("Invalid {} ID", R::NAME)),
        StoreError::NotFound => not_found::<R>(),
        other => other.into(),
    }
}

/// Path ids that axum cannot decode get the same answer as malformed ones
fn record_id<R: Resource>(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(collection = R::COLLECTION, "Rejected path: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid {} ID", R::NAME))
    })
}

// HTTP handlers

/// GET /api/:resource
pub async fn get_all<R: Resource>(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let docs = CrudController::<R>::new(state.store).get_all().await?;
    Ok(ApiResponse::success(records_to_api_values::<R>(&docs)))
}

/// GET /api/:resource/:id
pub async fn get_by_id<R: Resource>(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let id = record_id::<R>(path)?;
    let doc = CrudController::<R>::new(state.store).get_by_id(&id).await?;
    Ok(ApiResponse::success(record_to_api_value::<R>(&doc)))
}

/// POST /api/:resource
pub async fn create<R: Resource>(State(state): State<AppState>, ApiJson(body): ApiJson<Value>) -> ApiResult<Value> {
    let doc = CrudController::<R>::new(state.store).create(body).await?;
    Ok(ApiResponse::created(record_to_api_value::<R>(&doc)))
}

/// PUT /api/:resource/:id
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let id = record_id::<R>(path)?;
    let doc = CrudController::<R>::new(state.store).update(&id, body).await?;
    Ok(ApiResponse::success(record_to_api_value::<R>(&doc)))
}

/// DELETE /api/:resource/:id
pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let id = record_id::<R>(path)?;
    CrudController::<R>::new(state.store).remove(&id).await?;
    Ok(ApiResponse::success(json!({ "message": format!("{} deleted", R::NAME) })))
}

/// DELETE /api/:resource
pub async fn remove_all<R: Resource>(State(state): State<AppState>) -> ApiResult<Value> {
    let count = CrudController::<R>::new(state.store).remove_all().await?;
    Ok(ApiResponse::success(json!({
        "message": format!("All {}s deleted", R::NAME),
        "deleted_count": count
    })))
}
