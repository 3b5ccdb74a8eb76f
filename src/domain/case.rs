use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::serve_attempt::ServeStatus;
use crate::domain::types::sanitize_text;

/// Lifecycle of a case. Advanced automatically when serve attempts are
/// recorded: a completed serve closes the case, a failed one keeps it pending.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CaseStatus {
    Active,
    #[default]
    Pending,
    Closed,
}

impl CaseStatus {
    /// The status a case should carry after a serve attempt with the given
    /// outcome, or `None` when no transition applies.
    pub fn after_serve(self, outcome: ServeStatus) -> Option<CaseStatus> {
        match outcome {
            ServeStatus::Completed => Some(CaseStatus::Closed),
            // A closed case is never reopened by a later failed attempt.
            ServeStatus::Failed if self != CaseStatus::Closed => Some(CaseStatus::Pending),
            _ => None,
        }
    }
}

impl Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Active => write!(f, "Active"),
            CaseStatus::Pending => write!(f, "Pending"),
            CaseStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl From<&str> for CaseStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "active" => CaseStatus::Active,
            "closed" => CaseStatus::Closed,
            _ => CaseStatus::Pending,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Case {
    pub id: String,
    pub case_number: String,
    pub case_name: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCase {
    pub client_id: String,
    pub case_number: String,
    pub case_name: Option<String>,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
}

impl NewCase {
    #[must_use]
    pub fn new(
        client_id: String,
        case_number: String,
        case_name: Option<String>,
        description: Option<String>,
        status: CaseStatus,
        home_address: Option<String>,
        work_address: Option<String>,
    ) -> Self {
        Self {
            client_id,
            case_number: case_number.trim().to_string(),
            case_name: case_name
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            description: description.and_then(sanitize_text),
            status,
            home_address: home_address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            work_address: work_address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "clientId": self.client_id,
            "caseNumber": self.case_number,
            "caseName": self.case_name,
            "description": self.description,
            "status": self.status.to_string(),
            "homeAddress": self.home_address,
            "workAddress": self.work_address,
        })
    }
}

/// Partial update: only fields that are present are written back.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCase {
    pub case_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CaseStatus>,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
}

impl UpdateCase {
    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        if let Some(case_name) = &self.case_name {
            fields.insert("caseName".to_string(), json!(case_name.trim()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".to_string(), json!(sanitize_text(description)));
        }
        if let Some(status) = self.status {
            fields.insert("status".to_string(), json!(status.to_string()));
        }
        if let Some(home_address) = &self.home_address {
            fields.insert("homeAddress".to_string(), json!(home_address.trim()));
        }
        if let Some(work_address) = &self.work_address {
            fields.insert("workAddress".to_string(), json!(work_address.trim()));
        }
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_on_serve_outcomes() {
        assert_eq!(
            CaseStatus::Pending.after_serve(ServeStatus::Completed),
            Some(CaseStatus::Closed)
        );
        assert_eq!(
            CaseStatus::Active.after_serve(ServeStatus::Failed),
            Some(CaseStatus::Pending)
        );
        assert_eq!(CaseStatus::Closed.after_serve(ServeStatus::Failed), None);
        assert_eq!(CaseStatus::Pending.after_serve(ServeStatus::Unknown), None);
    }

    #[test]
    fn update_document_skips_absent_fields() {
        let update = UpdateCase {
            status: Some(CaseStatus::Closed),
            ..UpdateCase::default()
        };
        let doc = update.to_document();
        assert_eq!(doc["status"], "Closed");
        assert!(doc.get("caseName").is_none());
    }
}
