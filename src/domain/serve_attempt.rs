use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::types::{GeoPoint, sanitize_text};

/// Outcome of a physical service attempt.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServeStatus {
    Completed,
    Failed,
    /// Remote documents occasionally carry no status at all.
    #[default]
    Unknown,
}

impl Display for ServeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeStatus::Completed => write!(f, "completed"),
            ServeStatus::Failed => write!(f, "failed"),
            ServeStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for ServeStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" | "served" => ServeStatus::Completed,
            "failed" => ServeStatus::Failed,
            _ => ServeStatus::Unknown,
        }
    }
}

/// A logged, timestamped, optionally photo/GPS-evidenced record of an attempt
/// to deliver papers to a person.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ServeAttempt {
    pub id: String,
    pub client_id: String,
    pub case_number: String,
    /// Human-readable ordinal within the client+case pair.
    pub attempt_number: i32,
    pub status: ServeStatus,
    pub notes: Option<String>,
    pub coordinates: Option<GeoPoint>,
    /// Base64 photo evidence, without any data-URI prefix.
    pub image_data: Option<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewServeAttempt {
    pub client_id: String,
    pub case_number: String,
    pub attempt_number: i32,
    pub status: ServeStatus,
    pub notes: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub image_data: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl NewServeAttempt {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_id: String,
        case_number: String,
        attempt_number: i32,
        status: ServeStatus,
        notes: Option<String>,
        coordinates: Option<GeoPoint>,
        image_data: Option<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            client_id,
            case_number: case_number.trim().to_string(),
            attempt_number,
            status,
            notes: notes.and_then(sanitize_text),
            coordinates,
            image_data: image_data.filter(|s| !s.trim().is_empty()),
            timestamp,
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "clientId": self.client_id,
            "caseNumber": self.case_number,
            "attemptNumber": self.attempt_number,
            "status": self.status.to_string(),
            "notes": self.notes,
            "coordinates": self.coordinates,
            "imageData": self.image_data,
            "timestamp": self.timestamp.and_utc().to_rfc3339(),
        })
    }
}

/// Partial update; status and notes are the only editable fields after the
/// fact, evidence is immutable.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateServeAttempt {
    pub status: Option<ServeStatus>,
    pub notes: Option<String>,
}

impl UpdateServeAttempt {
    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        if let Some(status) = self.status {
            fields.insert("status".to_string(), json!(status.to_string()));
        }
        if let Some(notes) = &self.notes {
            fields.insert("notes".to_string(), json!(sanitize_text(notes)));
        }
        Value::Object(fields)
    }
}
