use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;

/// `Json` extractor whose rejections become [`ApiError`] envelopes instead of
/// axum's plain-text bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body too large"),
                StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                    ApiError::unsupported_media_type("Expected request with `Content-Type: application/json`")
                }
                _ => ApiError::invalid_json(rejection.body_text()),
            }),
        }
    }
}
