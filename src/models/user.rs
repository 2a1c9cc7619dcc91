use serde::{Deserialize, Serialize};

use super::{check_email, FieldErrors, ModelError, Resource};
use crate::auth::hash_password;
use crate::store::Fields;

/// Admin account. `password` holds an Argon2 hash once stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Resource for User {
    const NAME: &'static str = "User";
    const COLLECTION: &'static str = "users";
    const HIDDEN: &'static [&'static str] = &["password"];
    const UNIQUE: &'static [&'static str] = &["email"];

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("firstname", &self.firstname);
        errors.require("lastname", &self.lastname);
        check_email(&mut errors, "email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "password is required");
        }
        errors.into_result()
    }

    /// Hash the password whenever the request supplied a new one. Otherwise
    /// the merged model already carries the stored hash.
    fn prepare(&mut self, supplied: &Fields) -> Result<(), ModelError> {
        if supplied.contains_key("password") {
            self.password = hash_password(&self.password).map_err(|e| ModelError::Hash(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::models::normalize;
    use serde_json::json;

    #[test]
    fn password_is_required() {
        let user = User {
            firstname: "Api".into(),
            lastname: "User".into(),
            email: "api.user@example.com".into(),
            password: String::new(),
        };
        let errors = user.validate().unwrap_err();
        assert_eq!(errors.get("password"), Some("password is required"));
    }

    #[test]
    fn supplied_password_is_hashed() {
        let body = json!({
            "firstname": "Api",
            "lastname": "User",
            "email": "api.user@example.com",
            "password": "pass"
        });
        let fields = body.as_object().cloned().unwrap();
        let stored = normalize::<User>(fields.clone(), &fields).unwrap();

        let hash = stored["password"].as_str().unwrap();
        assert_ne!(hash, "pass");
        assert!(verify_password("pass", hash));
    }

    #[test]
    fn stored_hash_is_kept_when_password_not_supplied() {
        let merged = json!({
            "firstname": "Api",
            "lastname": "Renamed",
            "email": "api.user@example.com",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
        });
        let supplied = json!({"lastname": "Renamed"});
        let stored = normalize::<User>(
            merged.as_object().cloned().unwrap(),
            supplied.as_object().unwrap(),
        )
        .unwrap();

        assert_eq!(stored["password"], merged["password"]);
    }
}
