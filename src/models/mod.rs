use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::store::Fields;

pub mod contact;
pub mod project;
pub mod service;
pub mod user;

pub use contact::Contact;
pub use project::Project;
pub use service::Service;
pub use user::User;

/// Keys that belong to the store, never to the caller.
pub const RESERVED_FIELDS: &[&str] = &["_id", "id", "created", "updated"];

/// Field name to message, reported back to the client on validation failure
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record a "required" error when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", field));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Validation failed: {0}")]
    Malformed(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// A CRUD-managed record type.
///
/// The typed struct is the schema: unknown fields are dropped on
/// deserialization and `validate` enforces the remaining constraints.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Display name used in messages, e.g. "Contact"
    const NAME: &'static str;
    /// Store collection, also the route segment under `/api`
    const COLLECTION: &'static str;
    /// Stored fields that are never rendered
    const HIDDEN: &'static [&'static str] = &[];
    /// Fields whose values may appear at most once in the collection
    const UNIQUE: &'static [&'static str] = &[];

    fn validate(&self) -> Result<(), FieldErrors>;

    /// Adjust the validated model before it is written. `supplied` holds
    /// only the fields present in the request body.
    fn prepare(&mut self, _supplied: &Fields) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Build and validate a model from a field map, then convert it back into the
/// normalized field map that is stored.
pub fn normalize<R: Resource>(fields: Fields, supplied: &Fields) -> Result<Fields, ModelError> {
    let mut model: R = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ModelError::Malformed(e.to_string()))?;
    model.validate().map_err(ModelError::Validation)?;
    model.prepare(supplied)?;

    match serde_json::to_value(&model) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ModelError::Malformed(format!("expected an object, got {}", other))),
        Err(e) => Err(ModelError::Malformed(e.to_string())),
    }
}

/// Drop store-owned keys from a request body.
pub fn strip_reserved(mut fields: Fields) -> Fields {
    for key in RESERVED_FIELDS {
        fields.remove(*key);
    }
    fields
}

/// Basic `local@domain.tld` check: no whitespace, something before an `@`,
/// and a dot inside what follows it.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    value
        .char_indices()
        .filter(|&(_, c)| c == '@')
        .any(|(at, _)| {
            let domain = &value[at + 1..];
            at > 0
                && domain
                    .char_indices()
                    .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
        })
}

pub(crate) fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.require(field, value);
    } else if !is_valid_email(value) {
        errors.add(field, "Please enter a valid email address");
    }
}
