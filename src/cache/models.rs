//! Gallery data model: generated artifacts and the entries that hold them.

// Author: kelexine (https://github.com/kelexine)

use crate::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What kind of artifact a result holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    #[default]
    Image,
    Video,
}

impl ArtifactKind {
    /// Key of the artifact object inside a gateway success envelope.
    pub fn envelope_key(self) -> &'static str {
        match self {
            ArtifactKind::Image => "image",
            ArtifactKind::Video => "video",
        }
    }
}

/// A generated artifact as returned by a successful generation call.
///
/// Fields the gateway knows about are typed; anything else the processing
/// service sent (cost, seed, status, ...) is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub uuid: String,
    /// Artifact URL or embedded data. Absent for placeholder video results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Parameters echoed by the processing service.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    /// Server-side processing duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationResult {
    /// Extract the artifact from a gateway success envelope such as
    /// `{"success": true, "image": {...}, "metadata": {"timestamp": ...}}`.
    ///
    /// Results without a uuid get a locally generated one so that gallery
    /// identifiers stay unique.
    pub fn from_envelope(kind: ArtifactKind, body: &Value) -> Result<Self> {
        let key = kind.envelope_key();
        let mut fields = body
            .get(key)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| GatewayError::Internal(format!("Response has no '{}' object", key)))?;

        let created_at = body
            .pointer("/metadata/timestamp")
            .and_then(Value::as_f64)
            .and_then(|secs| DateTime::<Utc>::from_timestamp_millis((secs * 1000.0) as i64))
            .unwrap_or_else(Utc::now);

        if !matches!(fields.get("uuid"), Some(Value::String(s)) if !s.is_empty()) {
            fields.insert(
                "uuid".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        fields.insert("kind".to_string(), serde_json::to_value(kind)?);
        fields
            .entry("createdAt".to_string())
            .or_insert(serde_json::to_value(created_at)?);

        let mut result: Self = serde_json::from_value(Value::Object(fields))?;
        result.rename_reserved_extras();
        Ok(result)
    }

    /// Move extra fields whose names collide with the entry's own persisted
    /// fields to an `upstream`-prefixed name, so they survive storage.
    /// `timestamp` becomes `upstreamTimestamp`.
    pub fn rename_reserved_extras(&mut self) {
        for key in CacheEntry::RESERVED_KEYS {
            if let Some(value) = self.extra.remove(key) {
                let mut renamed = String::from("upstream");
                let mut chars = key.chars();
                if let Some(first) = chars.next() {
                    renamed.extend(first.to_uppercase());
                    renamed.push_str(chars.as_str());
                }
                self.extra.insert(renamed, value);
            }
        }
    }

    /// Processing duration, clamped to be non-negative.
    pub fn processing_seconds(&self) -> Option<f64> {
        self.generation_time.map(|t| t.max(0.0))
    }
}

/// One gallery entry: the artifact plus what the client observed.
///
/// Persisted flat, the artifact's fields next to `timestamp` and
/// `frontendGenerationTime`. Entries are never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub result: GenerationResult,
    /// Insertion time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Client-observed round trip in seconds.
    #[serde(rename = "frontendGenerationTime")]
    pub round_trip_seconds: f64,
}

impl CacheEntry {
    /// Keys the entry itself writes next to the flattened artifact.
    pub const RESERVED_KEYS: [&'static str; 2] = ["timestamp", "frontendGenerationTime"];

    pub fn uuid(&self) -> &str {
        &self.result.uuid
    }

    pub fn inserted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }
}
