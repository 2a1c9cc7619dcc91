// handlers/auth.rs - POST /api/auth/signin
//
// Exchanges email + password for a signed bearer token. Sign-out is a client
// concern (discard the token); the server keeps no session state.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiJson;
use crate::auth::{generate_jwt, verify_dummy_password, verify_password, AuthError, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Resource, User};
use crate::state::AppState;
use crate::store::Document;

#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// User summary returned with a token. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: UserSummary,
}

impl UserSummary {
    fn from_document(doc: &Document) -> Self {
        let text = |field: &str| {
            doc.fields
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: doc.id.to_string(),
            firstname: text("firstname"),
            lastname: text("lastname"),
            email: text("email"),
        }
    }
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignInRequest>,
) -> ApiResult<SignInResponse> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => (email, password),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let user = state
        .store
        .find_one(User::COLLECTION, "email", &Value::String(email.clone()))
        .await?;

    // Unknown email and wrong password produce the same error
    let Some(user) = user else {
        verify_dummy_password(&password);
        warn!("Sign-in failed: unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    let stored_hash = user.fields.get("password").and_then(Value::as_str).unwrap_or_default();
    if !verify_password(&password, stored_hash) {
        warn!(user_id = %user.id, "Sign-in failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let summary = UserSummary::from_document(&user);
    let expiry_hours = state.config.security.jwt_expiry_hours;
    let claims = Claims::new(
        summary.id.clone(),
        summary.email.clone(),
        summary.firstname.clone(),
        summary.lastname.clone(),
        expiry_hours,
    )?;
    let expires_in = expiry_hours
        .checked_mul(3600)
        .ok_or_else(|| AuthError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours)))?;
    let token = generate_jwt(&claims, state.jwt_secret())?;

    info!(user_id = %summary.id, "User signed in");
    Ok(ApiResponse::success(SignInResponse {
        token,
        token_type: "Bearer",
        expires_in,
        user: summary,
    }))
}
