use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

use super::AuthError;

/// Hash checked when the account does not exist, so unknown emails cost the
/// same Argon2 work as wrong passwords.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("no-such-account").ok());

/// Hash a plain-text password into an Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check a plain-text password against a stored hash.
///
/// A stored value that is not a parseable hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password is not a valid hash: {}", e);
            false
        }
    }
}

/// Run a verification that can never succeed against the dummy hash.
pub fn verify_dummy_password(password: &str) -> bool {
    match DUMMY_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
            false
        }
        None => false,
    }
}
