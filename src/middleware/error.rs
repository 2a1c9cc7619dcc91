use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, ErrorDetail};
use crate::state::AppState;

/// Terminal error stage. Every error response passes through here on its way
/// out: details are logged outside production, and bare framework errors are
/// rewritten into the JSON error envelope.
pub async fn error_handler(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let response = match response.extensions().get::<ErrorDetail>() {
        Some(_) => response,
        None if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            ApiError::method_not_allowed("Method not allowed").into_response()
        }
        None => return response,
    };

    if !state.config.is_production() {
        if let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>() {
            let status = response.status().as_u16();
            if response.status().is_server_error() {
                tracing::error!(%method, %path, status, "{}", detail);
            } else {
                tracing::debug!(%method, %path, status, "{}", detail);
            }
        }
    }

    response
}
