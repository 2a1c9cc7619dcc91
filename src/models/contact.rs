use serde::{Deserialize, Serialize};

use super::{check_email, FieldErrors, Resource};

/// Inbound contact message from the portfolio site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
}

impl Resource for Contact {
    const NAME: &'static str = "Contact";
    const COLLECTION: &'static str = "contacts";

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("firstname", &self.firstname);
        errors.require("lastname", &self.lastname);
        check_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}
