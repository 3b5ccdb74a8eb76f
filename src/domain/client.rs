use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::types::{normalize_email, normalize_phone, sanitize_text};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    /// Extra notification recipients beyond the primary address.
    pub additional_emails: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Client {
    /// All addresses notifications for this client go to, primary first.
    pub fn notification_emails(&self) -> Vec<String> {
        let mut emails = Vec::new();
        if let Some(email) = &self.email {
            emails.push(email.clone());
        }
        for extra in &self.additional_emails {
            if !emails.contains(extra) {
                emails.push(extra.clone());
            }
        }
        emails
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub additional_emails: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        name: String,
        email: Option<String>,
        additional_emails: Vec<String>,
        phone: Option<String>,
        address: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.and_then(|s| normalize_email(s).ok()),
            additional_emails: additional_emails
                .into_iter()
                .filter_map(|s| normalize_email(s).ok())
                .collect(),
            phone: phone.and_then(normalize_phone),
            address: address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            notes: notes.and_then(sanitize_text),
        }
    }

    /// Remote document payload for this client.
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "additionalEmails": self.additional_emails,
            "phone": self.phone,
            "address": self.address,
            "notes": self.notes,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateClient {
    pub name: String,
    pub email: Option<String>,
    pub additional_emails: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl UpdateClient {
    #[must_use]
    pub fn new(
        name: String,
        email: Option<String>,
        additional_emails: Vec<String>,
        phone: Option<String>,
        address: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let normalized = NewClient::new(name, email, additional_emails, phone, address, notes);
        Self {
            name: normalized.name,
            email: normalized.email,
            additional_emails: normalized.additional_emails,
            phone: normalized.phone,
            address: normalized.address,
            notes: normalized.notes,
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "additionalEmails": self.additional_emails,
            "phone": self.phone,
            "address": self.address,
            "notes": self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_normalizes_contact_fields() {
        let client = NewClient::new(
            "  Acme Process LLC ".to_string(),
            Some(" Billing@Acme.COM ".to_string()),
            vec!["ops@acme.com".to_string(), "bogus".to_string()],
            Some("  ".to_string()),
            Some("".to_string()),
            Some("<b>priority</b> client".to_string()),
        );
        assert_eq!(client.name, "Acme Process LLC");
        assert_eq!(client.email.as_deref(), Some("billing@acme.com"));
        assert_eq!(client.additional_emails, vec!["ops@acme.com".to_string()]);
        assert_eq!(client.phone, None);
        assert_eq!(client.address, None);
        assert_eq!(client.notes.as_deref(), Some("<b>priority</b> client"));
    }

    #[test]
    fn notification_emails_deduplicate() {
        let client = Client {
            email: Some("a@example.com".to_string()),
            additional_emails: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            ..Client::default()
        };
        assert_eq!(
            client.notification_emails(),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }
}
