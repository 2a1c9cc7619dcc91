use serde::{Deserialize, Serialize};

use super::{FieldErrors, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Service {
    const NAME: &'static str = "Service";
    const COLLECTION: &'static str = "services";

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required() {
        let errors = Service::default().validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("title is required"));

        let service = Service {
            title: "Web development".into(),
            description: None,
        };
        assert!(service.validate().is_ok());
    }

    #[test]
    fn absent_description_is_not_serialized() {
        let service = Service {
            title: "Hosting".into(),
            description: None,
        };
        let value = serde_json::to_value(&service).unwrap();
        assert!(value.get("description").is_none());
    }
}
