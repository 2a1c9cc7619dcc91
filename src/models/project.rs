use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{FieldErrors, Resource};

/// Portfolio project entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "deserialize_completion",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Public URL of the project (repository, demo, write-up)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_technologies",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub technologies: Vec<String>,
}

impl Resource for Project {
    const NAME: &'static str = "Project";
    const COLLECTION: &'static str = "projects";

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);

        if let Some(link) = &self.link {
            match url::Url::parse(link) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => errors.add("link", "link must be an absolute http(s) URL"),
            }
        }

        if self.technologies.iter().any(|t| t.trim().is_empty()) {
            errors.add("technologies", "technologies must not contain empty tags");
        }

        errors.into_result()
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn deserialize_completion<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid completion date: {}", raw)))
}

/// `null` clears the tag list like it clears the other optional fields.
fn deserialize_technologies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
