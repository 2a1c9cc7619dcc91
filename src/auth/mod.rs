use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

pub use password::{hash_password, verify_dummy_password, verify_password};

/// Claims embedded in every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        expiry_hours: u64,
    ) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: user_id.into(),
            email: email.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hash(String),
}

/// Sign `claims` with HS256.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::TokenGeneration("signing secret is empty".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims() -> Claims {
        Claims::new("user-1", "ada@example.com", "Ada", "Lovelace", 24).unwrap()
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let result = Claims::new("user-1", "ada@example.com", "Ada", "Lovelace", 10_000_000_000);
        assert!(matches!(result, Err(AuthError::TokenGeneration(_))));

        let result = Claims::new("user-1", "ada@example.com", "Ada", "Lovelace", u64::MAX);
        assert!(matches!(result, Err(AuthError::TokenGeneration(_))));
    }

    #[test]
    fn round_trips_claims() {
        let claims = claims();
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert_eq!(validate_jwt(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn expiry_is_24_hours_out() {
        let claims = claims();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let mut claims = claims();
        claims.iat -= 48 * 3600;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims, SECRET).unwrap();

        assert!(matches!(validate_jwt(&token, SECRET), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn wrong_key_is_invalid() {
        let token = generate_jwt(&claims(), SECRET).unwrap();
        assert!(matches!(validate_jwt(&token, "another-secret"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let token = generate_jwt(&claims(), SECRET).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = "eyJzdWIiOiJzb21lb25lLWVsc2UifQ";
        let tampered = parts.join(".");

        assert!(matches!(validate_jwt(&tampered, SECRET), Err(AuthError::InvalidToken)));
        assert!(matches!(validate_jwt("garbage", SECRET), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(matches!(generate_jwt(&claims(), ""), Err(AuthError::TokenGeneration(_))));
    }
}
