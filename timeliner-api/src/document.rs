//! Timeline documents and the payloads exchanged with the persistence backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::Grid;

/// Server-assigned document identifier.
///
/// The backend hands these out as numbers, older local blobs store them as
/// strings; both deserialize to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TimelineId(pub String);

impl TimelineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimelineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for TimelineId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// A timeline document.
///
/// Every field but `data` is optional: a document that only ever lived in
/// the local offline store has no id, name or timestamps. Responses that
/// echo raw database rows use snake_case timestamp keys, accepted here as
/// aliases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TimelineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Grid,
}

impl Timeline {
    /// An unsaved document holding `data`.
    pub fn local(data: Grid) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// The same document carrying a different grid.
    pub fn with_data(&self, data: Grid) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            data,
        }
    }

    /// Name used for exported files.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "timeline",
        }
    }

    pub fn summary(&self) -> Option<TimelineSummary> {
        Some(TimelineSummary {
            id: self.id.clone()?,
            name: self.name.clone().unwrap_or_default(),
            created_at: self.created_at?,
            updated_at: self.updated_at,
        })
    }
}

/// A document listing entry (no grid data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub id: TimelineId,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimeline {
    pub name: String,
    pub data: Grid,
}

/// Body of an update request. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Grid>,
}

impl TimelinePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data: None,
        }
    }

    /// The `{name, data}` pair a save sends.
    pub fn from_document(doc: &Timeline) -> Self {
        Self {
            name: doc.name.clone(),
            data: Some(doc.data.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_id_accepts_numbers_and_strings() {
        let a: TimelineId = serde_json::from_str("42").unwrap();
        let b: TimelineId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn raw_database_rows_deserialize() {
        let json = r#"{
            "id": 3,
            "user_email": "someone@example.com",
            "name": "plan",
            "data": [{"title": "", "columns": [[]]}],
            "created_at": "2020-01-02T03:04:05.000Z",
            "updated_at": "2020-01-02T03:04:06.000Z"
        }"#;
        let doc: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, Some(TimelineId::from("3")));
        assert_eq!(doc.name.as_deref(), Some("plan"));
        assert!(doc.created_at.is_some());
        assert_eq!(doc.data, Grid::new());
    }

    #[test]
    fn local_blob_needs_only_data() {
        let doc: Timeline = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(doc.id, None);
        assert_eq!(doc.data.row_count(), 0);
        assert_eq!(doc.display_name(), "timeline");
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"data":[]}"#);
    }

    #[test]
    fn patch_skips_absent_fields() {
        let json = serde_json::to_string(&TimelinePatch::rename("x")).unwrap();
        assert_eq!(json, r#"{"name":"x"}"#);
    }
}
