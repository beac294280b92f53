use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version written into every new metadata record.
pub const METADATA_SCHEMA_VERSION: u32 = 1;

/// One catalog entity as resolved from the upstream detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub id: u32,
    pub name: String,
    /// Image URLs, most preferred first. Never contains duplicates.
    pub source_candidates: Vec<String>,
    /// Type names in slot order (e.g. `["grass", "poison"]`).
    pub types: Vec<String>,
}

/// Raw bytes downloaded for an entity, with the MIME type sniffed from content.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub size_bytes: u64,
}

impl FetchedAsset {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        let size_bytes = bytes.len() as u64;
        Self {
            bytes,
            mime: mime.into(),
            size_bytes,
        }
    }
}

/// Thumbnail derived from a fetched asset.
#[derive(Debug, Clone)]
pub struct DerivedArtifact {
    pub thumbnail_bytes: Vec<u8>,
    pub thumbnail_mime: String,
    /// File extension without the dot (`webp`, `jpg`).
    pub extension: &'static str,
}

/// Durable per-entity descriptor written by the fetch pass.
///
/// This is the only contract between the fetch pass and the load pass. Fields
/// this version does not know about are kept in `extra` and written back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    pub id: u32,
    pub name: String,
    pub source_url: String,
    /// Relative to the output root (`originals/001_bulbasaur.png`).
    #[serde(default)]
    pub saved_original: Option<PathBuf>,
    #[serde(default)]
    pub saved_thumb: Option<PathBuf>,
    pub image_mime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_mime: Option<String>,
    /// Lowercase hex SHA-256 of the original bytes.
    pub checksum: String,
    /// Size of the original in bytes.
    pub bytes: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn legacy_schema_version() -> u32 {
    1
}

/// Why a metadata document could not be turned into a [`MetadataRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("record has no usable id or name")]
    MissingIdOrName,

    #[error("malformed record: {0}")]
    Malformed(serde_json::Error),

    #[error("unsupported metadata schema version {0}")]
    UnsupportedVersion(u32),
}

impl MetadataRecord {
    /// Parse and validate a metadata document.
    ///
    /// The id/name check runs before schema validation so a record that lost
    /// its identity is reported as such rather than as a generic shape error.
    pub fn from_json_str(text: &str) -> Result<Self, RecordError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(RecordError::InvalidJson)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        let id_ok = value
            .get("id")
            .and_then(|v| v.as_u64())
            .is_some_and(|id| id > 0 && id <= u32::MAX as u64);
        let name_ok = value
            .get("name")
            .and_then(|v| v.as_str())
            .is_some_and(|n| !n.trim().is_empty());
        if !id_ok || !name_ok {
            return Err(RecordError::MissingIdOrName);
        }

        let record: MetadataRecord =
            serde_json::from_value(value).map_err(RecordError::Malformed)?;
        if record.schema_version > METADATA_SCHEMA_VERSION {
            return Err(RecordError::UnsupportedVersion(record.schema_version));
        }
        Ok(record)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Result of one entity's fetch pipeline, as listed in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityOutcome {
    Saved(MetadataRecord),
    Failed { id: u32, error: String },
}

impl EntityOutcome {
    pub fn id(&self) -> u32 {
        match self {
            Self::Saved(record) => record.id,
            Self::Failed { id, .. } => *id,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// One summary per fetch run. Results are in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub created_at: DateTime<Utc>,
    pub results: Vec<EntityOutcome>,
}

impl RunSummary {
    pub fn new(results: Vec<EntityOutcome>) -> Self {
        Self {
            created_at: Utc::now(),
            results,
        }
    }

    pub fn saved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_saved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.saved_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "name": "bulbasaur",
            "source_url": "https://example.test/1.png",
            "saved_original": "/data/originals/001_bulbasaur.png",
            "saved_thumb": "/data/thumbs/001_bulbasaur.webp",
            "image_mime": "image/png",
            "checksum": "ab12",
            "bytes": 4,
            "timestamp": "2024-05-01T12:00:00.000Z"
        })
    }

    #[test]
    fn legacy_record_defaults_to_version_one() {
        let record = MetadataRecord::from_value(sample_json()).unwrap();
        assert_eq!(record.schema_version, 1);
        assert!(record.types.is_empty());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let mut value = sample_json();
        value["collector"] = serde_json::json!({"host": "box-1"});
        let record = MetadataRecord::from_value(value).unwrap();
        assert!(record.extra.contains_key("collector"));

        let text = record.to_json_pretty().unwrap();
        let again = MetadataRecord::from_json_str(&text).unwrap();
        assert_eq!(again.extra["collector"]["host"], "box-1");
    }

    #[test]
    fn missing_name_is_reported_before_shape_errors() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("name");
        value.as_object_mut().unwrap().remove("checksum");
        assert!(matches!(
            MetadataRecord::from_value(value),
            Err(RecordError::MissingIdOrName)
        ));
    }

    #[test]
    fn zero_id_is_rejected() {
        let mut value = sample_json();
        value["id"] = serde_json::json!(0);
        assert!(matches!(
            MetadataRecord::from_value(value),
            Err(RecordError::MissingIdOrName)
        ));
    }

    #[test]
    fn missing_checksum_is_malformed() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("checksum");
        assert!(matches!(
            MetadataRecord::from_value(value),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let mut value = sample_json();
        value["schema_version"] = serde_json::json!(99);
        assert!(matches!(
            MetadataRecord::from_value(value),
            Err(RecordError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn garbage_is_invalid_json() {
        assert!(matches!(
            MetadataRecord::from_json_str("{\"id\": 1, \"name\": "),
            Err(RecordError::InvalidJson(_))
        ));
    }

    #[test]
    fn summary_serializes_failures_inline() {
        let record = MetadataRecord::from_value(sample_json()).unwrap();
        let summary = RunSummary::new(vec![
            EntityOutcome::Saved(record),
            EntityOutcome::Failed {
                id: 2,
                error: "All image candidates failed".to_string(),
            },
        ]);
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["results"][1]["id"], 2);
        assert_eq!(value["results"][0]["name"], "bulbasaur");

        let back: RunSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.saved_count(), 1);
        assert_eq!(back.failed_count(), 1);
        assert_eq!(back.results[1].id(), 2);
    }
}
