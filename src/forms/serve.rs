use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::domain::serve_attempt::{NewServeAttempt, ServeStatus, UpdateServeAttempt};
use crate::domain::types::GeoPoint;

#[derive(Deserialize, Validate)]
/// Form data for logging a serve attempt.
pub struct AddServeAttemptForm {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub case_number: String,
    /// "completed" or "failed".
    #[validate(length(min = 1))]
    pub status: String,
    pub notes: Option<String>,
    /// Either a `{latitude, longitude}` object or a `"lat,lon"` string;
    /// malformed input is treated as no fix.
    pub coordinates: Option<Value>,
    /// Base64 photo evidence, with or without a data-URI prefix.
    pub image_data: Option<String>,
}

impl AddServeAttemptForm {
    /// Converts into the domain record once the ordinal has been assigned.
    pub fn to_new_attempt(&self, attempt_number: i32) -> NewServeAttempt {
        NewServeAttempt::new(
            self.client_id.clone(),
            self.case_number.clone(),
            attempt_number,
            ServeStatus::from(self.status.as_str()),
            self.notes.clone(),
            self.coordinates.as_ref().and_then(GeoPoint::parse),
            self.image_data.clone(),
            Utc::now().naive_utc(),
        )
    }
}

#[derive(Deserialize, Validate)]
/// Form data for editing a recorded attempt; only status and notes move.
pub struct UpdateServeAttemptForm {
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<&UpdateServeAttemptForm> for UpdateServeAttempt {
    fn from(form: &UpdateServeAttemptForm) -> Self {
        UpdateServeAttempt {
            status: form.status.as_deref().map(ServeStatus::from),
            notes: form.notes.clone(),
        }
    }
}
