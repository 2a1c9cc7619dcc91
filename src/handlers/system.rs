use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - welcome message and quick check
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Portfolio API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "contacts": "/api/contacts[/:id]",
            "projects": "/api/projects[/:id]",
            "services": "/api/services[/:id]",
            "users": "/api/users[/:id]",
            "signin": "/api/auth/signin"
        }
    }))
}

/// GET /health - liveness plus store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "store": "ok",
                "timestamp": now
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "store": "unavailable",
                    "timestamp": now
                })),
            )
        }
    }
}

/// Fallback for unmatched paths
pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
