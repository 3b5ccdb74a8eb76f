//! Document-shape normalization.
//!
//! Remote documents arrive in more than one shape: field names may be
//! camelCase or snake_case, and the identifier may live under `id`, the
//! backend's `$id`, or a legacy `_id`. For each canonical field the candidate
//! source names are probed in priority order (canonical name first, then the
//! snake_case alias, then the backend-specific one) and the first defined
//! value wins. A document with no resolvable identifier is dropped with a
//! warning; the rest of the batch is unaffected.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde_json::{Map, Value};

use crate::domain::case::{Case, CaseStatus};
use crate::domain::client::Client;
use crate::domain::document::ClientDocument;
use crate::domain::serve_attempt::{ServeAttempt, ServeStatus};
use crate::domain::types::GeoPoint;

const ID_KEYS: &[&str] = &["id", "$id", "_id"];

pub fn normalize_client(doc: &Value) -> Option<Client> {
    let map = doc.as_object()?;
    let Some(id) = resolve_id(map) else {
        warn!("Dropping client document with no resolvable id");
        return None;
    };

    Some(Client {
        id,
        name: string_field(map, &["name", "client_name", "clientName"]).unwrap_or_default(),
        email: string_field(map, &["email", "primary_email", "primaryEmail"]),
        additional_emails: string_list_field(map, &["additionalEmails", "additional_emails"]),
        phone: string_field(map, &["phone", "phone_number", "phoneNumber"]),
        address: string_field(map, &["address"]),
        notes: string_field(map, &["notes"]),
        created_at: timestamp_field(map, &["createdAt", "created_at", "$createdAt"])
            .unwrap_or_else(|| Utc::now().naive_utc()),
    })
}

pub fn normalize_case(doc: &Value) -> Option<Case> {
    let map = doc.as_object()?;
    let Some(id) = resolve_id(map) else {
        warn!("Dropping case document with no resolvable id");
        return None;
    };

    let created_at = timestamp_field(map, &["createdAt", "created_at", "$createdAt"])
        .unwrap_or_else(|| Utc::now().naive_utc());

    Some(Case {
        id,
        case_number: string_field(map, &["caseNumber", "case_number"]).unwrap_or_default(),
        case_name: string_field(map, &["caseName", "case_name"]),
        client_id: string_field(map, &["clientId", "client_id"]).unwrap_or_default(),
        description: string_field(map, &["description"]),
        status: string_field(map, &["status"])
            .map(|s| CaseStatus::from(s.as_str()))
            .unwrap_or_default(),
        home_address: string_field(map, &["homeAddress", "home_address"]),
        work_address: string_field(map, &["workAddress", "work_address"]),
        created_at,
        updated_at: timestamp_field(map, &["updatedAt", "updated_at", "$updatedAt"])
            .unwrap_or(created_at),
    })
}

pub fn normalize_serve_attempt(doc: &Value) -> Option<ServeAttempt> {
    let map = doc.as_object()?;
    let Some(id) = resolve_id(map) else {
        warn!("Dropping serve attempt document with no resolvable id");
        return None;
    };

    Some(ServeAttempt {
        id,
        client_id: string_field(map, &["clientId", "client_id"]).unwrap_or_default(),
        case_number: string_field(map, &["caseNumber", "case_number"]).unwrap_or_default(),
        attempt_number: int_field(map, &["attemptNumber", "attempt_number"]).unwrap_or(0) as i32,
        status: string_field(map, &["status"])
            .map(|s| ServeStatus::from(s.as_str()))
            .unwrap_or_default(),
        notes: string_field(map, &["notes"]),
        coordinates: coordinates_field(map, &["coordinates", "coords", "gps"]),
        image_data: string_field(map, &["imageData", "image_data", "photo"]),
        timestamp: timestamp_field(map, &["timestamp", "created_at", "$createdAt"])
            .unwrap_or_else(|| Utc::now().naive_utc()),
    })
}

pub fn normalize_document(doc: &Value) -> Option<ClientDocument> {
    let map = doc.as_object()?;
    let Some(id) = resolve_id(map) else {
        warn!("Dropping document record with no resolvable id");
        return None;
    };

    Some(ClientDocument {
        id,
        client_id: string_field(map, &["clientId", "client_id"]).unwrap_or_default(),
        case_number: string_field(map, &["caseNumber", "case_number"]),
        file_id: string_field(map, &["fileId", "file_id", "filePath", "file_path"])
            .unwrap_or_default(),
        file_name: string_field(map, &["fileName", "file_name"]).unwrap_or_default(),
        file_type: string_field(map, &["fileType", "file_type", "mimeType", "mime_type"])
            .unwrap_or_default(),
        file_size: int_field(map, &["fileSize", "file_size"]).unwrap_or(0),
        description: string_field(map, &["description"]),
    })
}

/// Batch variants: bad documents are dropped, the rest survive.
pub fn normalize_clients(docs: &[Value]) -> Vec<Client> {
    docs.iter().filter_map(normalize_client).collect()
}

pub fn normalize_cases(docs: &[Value]) -> Vec<Case> {
    docs.iter().filter_map(normalize_case).collect()
}

pub fn normalize_serve_attempts(docs: &[Value]) -> Vec<ServeAttempt> {
    docs.iter().filter_map(normalize_serve_attempt).collect()
}

pub fn normalize_documents(docs: &[Value]) -> Vec<ClientDocument> {
    docs.iter().filter_map(normalize_document).collect()
}

fn resolve_id(map: &Map<String, Value>) -> Option<String> {
    string_field(map, ID_KEYS)
}

/// First defined value among the candidate keys, in priority order.
fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn string_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first(map, keys).and_then(string_of)
}

fn int_field(map: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    match first(map, keys)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn string_list_field(map: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match first(map, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(string_of).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn coordinates_field(map: &Map<String, Value>, keys: &[&str]) -> Option<GeoPoint> {
    GeoPoint::parse(first(map, keys)?)
}

fn timestamp_field(map: &Map<String, Value>, keys: &[&str]) -> Option<NaiveDateTime> {
    let raw = string_field(map, keys)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Some(parsed.naive_utc());
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn client_without_any_id_alias_is_dropped() {
        let docs = vec![
            json!({"name": "No Id", "email": "x@example.com"}),
            json!({"$id": "c2", "name": "Has Id"}),
        ];
        let clients = normalize_clients(&docs);
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id, "c2");
    }

    #[test]
    fn canonical_name_wins_over_aliases() {
        let doc = json!({
            "id": "canonical",
            "$id": "backend",
            "_id": "legacy",
            "name": "Acme",
        });
        assert_eq!(normalize_client(&doc).unwrap().id, "canonical");
    }

    #[test]
    fn snake_case_fields_are_picked_up() {
        let doc = json!({
            "_id": "a1",
            "client_id": "c1",
            "case_number": "CV-2023-0001",
            "attempt_number": 3,
            "status": "Completed",
            "image_data": "abc123",
            "timestamp": "2023-05-01T12:00:00+00:00",
        });
        let attempt = normalize_serve_attempt(&doc).unwrap();
        assert_eq!(attempt.client_id, "c1");
        assert_eq!(attempt.case_number, "CV-2023-0001");
        assert_eq!(attempt.attempt_number, 3);
        assert_eq!(attempt.status, ServeStatus::Completed);
        assert_eq!(attempt.image_data.as_deref(), Some("abc123"));
    }

    #[test]
    fn serve_defaults_apply_to_missing_fields() {
        let attempt = normalize_serve_attempt(&json!({"$id": "a1"})).unwrap();
        assert_eq!(attempt.status, ServeStatus::Unknown);
        assert_eq!(attempt.attempt_number, 0);
        assert_eq!(attempt.coordinates, None);
    }

    #[test]
    fn malformed_coordinates_become_none() {
        let doc = json!({"$id": "a1", "coordinates": "out back, by the garage"});
        assert_eq!(normalize_serve_attempt(&doc).unwrap().coordinates, None);

        let doc = json!({"$id": "a2", "coordinates": "36.15,-95.99"});
        let point = normalize_serve_attempt(&doc).unwrap().coordinates.unwrap();
        assert_eq!(point.latitude, 36.15);
    }

    #[test]
    fn case_status_defaults_to_pending() {
        let case = normalize_case(&json!({"$id": "k1", "caseNumber": "CV-1"})).unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
    }

    #[test]
    fn additional_emails_accept_array_and_scalar() {
        let doc = json!({"$id": "c1", "additional_emails": ["a@x.com", "b@x.com"]});
        assert_eq!(normalize_client(&doc).unwrap().additional_emails.len(), 2);

        let doc = json!({"$id": "c2", "additionalEmails": "only@x.com"});
        assert_eq!(
            normalize_client(&doc).unwrap().additional_emails,
            vec!["only@x.com".to_string()]
        );
    }
}
