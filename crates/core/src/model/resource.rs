use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, ResourceId};

//
// ─── RESOURCE TYPES ────────────────────────────────────────────────────────────
//

/// Kind of downloadable or linked material attached to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Pdf,
    Link,
    File,
    Template,
}

impl ResourceType {
    /// Wire representation used by the backend.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Pdf => "pdf",
            ResourceType::Link => "link",
            ResourceType::File => "file",
            ResourceType::Template => "template",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown resource type: {0}")]
pub struct ResourceTypeError(pub String);

impl FromStr for ResourceType {
    type Err = ResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ResourceType::Pdf),
            "link" => Ok(ResourceType::Link),
            "file" => Ok(ResourceType::File),
            "template" => Ok(ResourceType::Template),
            other => Err(ResourceTypeError(other.to_owned())),
        }
    }
}

/// Supplementary material attached to a course (worksheets, links, templates).
#[derive(Debug, Clone, PartialEq)]
pub struct CourseResource {
    pub id: ResourceId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: ResourceType,
    pub file_url: Option<Url>,
    pub file_name: Option<String>,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!("pdf".parse::<ResourceType>().unwrap(), ResourceType::Pdf);
        assert_eq!(
            "template".parse::<ResourceType>().unwrap(),
            ResourceType::Template
        );
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "zip".parse::<ResourceType>().unwrap_err();
        assert_eq!(err, ResourceTypeError("zip".into()));
    }

    #[test]
    fn round_trips_wire_form() {
        for kind in [
            ResourceType::Pdf,
            ResourceType::Link,
            ResourceType::File,
            ResourceType::Template,
        ] {
            assert_eq!(kind.as_str().parse::<ResourceType>().unwrap(), kind);
        }
    }
}
