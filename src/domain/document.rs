use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::types::sanitize_text;

/// Metadata record for a stored file belonging to a client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientDocument {
    pub id: String,
    pub client_id: String,
    pub case_number: Option<String>,
    /// Reference into the backend file store.
    pub file_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClientDocument {
    pub client_id: String,
    pub case_number: Option<String>,
    pub file_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub description: Option<String>,
}

impl NewClientDocument {
    #[must_use]
    pub fn new(
        client_id: String,
        case_number: Option<String>,
        file_id: String,
        file_name: String,
        file_type: String,
        file_size: i64,
        description: Option<String>,
    ) -> Self {
        Self {
            client_id,
            case_number: case_number
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            file_id,
            file_name,
            file_type,
            file_size,
            description: description.and_then(sanitize_text),
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "clientId": self.client_id,
            "caseNumber": self.case_number,
            "fileId": self.file_id,
            "fileName": self.file_name,
            "fileType": self.file_type,
            "fileSize": self.file_size,
            "description": self.description,
        })
    }
}
