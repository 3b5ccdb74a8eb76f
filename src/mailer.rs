//! Email dispatch.
//!
//! Notification bodies are rendered from fixed templates per event type and
//! relayed through the backend's server-side email function. The business
//! address is always appended to the recipient list when the caller did not
//! include it. Email failure is never a reason to fail the surrounding data
//! mutation; callers log the error and continue.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tera::{Context, Tera};

use crate::backend::{FunctionEnvelope, RemoteBackend};
use crate::domain::client::Client;
use crate::domain::serve_attempt::ServeAttempt;
use crate::services::{ServiceError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServeEvent {
    Created,
    Updated,
    Deleted,
}

impl ServeEvent {
    fn template(self) -> &'static str {
        match self {
            ServeEvent::Created => "emails/serve_created.html",
            ServeEvent::Updated => "emails/serve_updated.html",
            ServeEvent::Deleted => "emails/serve_deleted.html",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ServeEvent::Created => "logged",
            ServeEvent::Updated => "updated",
            ServeEvent::Deleted => "deleted",
        }
    }
}

/// Payload handed to the email relay function.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Base64 photo attachment, data-URI prefix already stripped.
    pub image_data: Option<String>,
    pub coordinates: Option<String>,
    pub notes: Option<String>,
}

impl EmailMessage {
    pub fn payload(&self) -> Value {
        json!({
            "to": self.to,
            "subject": self.subject,
            "html": self.body,
            "imageData": self.image_data,
            "coordinates": self.coordinates,
            "notes": self.notes,
        })
    }
}

/// Deduplicates the caller's recipients and appends the business address
/// exactly once.
pub fn collect_recipients(primary: &[String], business_address: &str) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for address in primary {
        if !recipients.contains(address) {
            recipients.push(address.clone());
        }
    }
    if !recipients.iter().any(|a| a == business_address) {
        recipients.push(business_address.to_string());
    }
    recipients
}

/// Drops a `data:image/...;base64,` prefix when present.
pub fn strip_data_uri(data: &str) -> &str {
    match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    }
}

#[derive(Clone)]
pub struct Mailer {
    tera: Arc<Tera>,
    notify_address: String,
}

impl Mailer {
    pub fn new(tera: Arc<Tera>, notify_address: String) -> Self {
        Self {
            tera,
            notify_address,
        }
    }

    /// Renders the notification for a serve event. The client is optional:
    /// an attempt whose owner is unknown still notifies the business address.
    pub fn build_serve_message(
        &self,
        event: ServeEvent,
        attempt: &ServeAttempt,
        client: Option<&Client>,
    ) -> ServiceResult<EmailMessage> {
        let client_emails = client.map(Client::notification_emails).unwrap_or_default();
        let to = collect_recipients(&client_emails, &self.notify_address);

        let mut context = Context::new();
        context.insert("attempt", attempt);
        context.insert(
            "client_name",
            &client.map_or("Unknown client", |c| c.name.as_str()),
        );
        let body = self.tera.render(event.template(), &context)?;

        let subject = format!(
            "Serve attempt {} for case {} (attempt #{})",
            event.verb(),
            attempt.case_number,
            attempt.attempt_number
        );

        Ok(EmailMessage {
            to,
            subject,
            body,
            image_data: attempt
                .image_data
                .as_deref()
                .map(|data| strip_data_uri(data).to_string()),
            coordinates: attempt.coordinates.map(|point| point.to_string()),
            notes: attempt.notes.clone(),
        })
    }

    /// Invokes the relay function. A relay-side failure is reported in the
    /// envelope, not as an error.
    pub async fn send<B>(&self, backend: &B, message: &EmailMessage) -> ServiceResult<FunctionEnvelope>
    where
        B: RemoteBackend + ?Sized,
    {
        let envelope = backend.invoke_function(&message.payload()).await?;
        if !envelope.success {
            log::warn!("Email relay reported failure: {}", envelope.message);
        }
        Ok(envelope)
    }

    /// Build-and-send convenience used by the serve orchestration.
    pub async fn notify_serve_event<B>(
        &self,
        backend: &B,
        event: ServeEvent,
        attempt: &ServeAttempt,
        client: Option<&Client>,
    ) -> ServiceResult<FunctionEnvelope>
    where
        B: RemoteBackend + ?Sized,
    {
        let message = self.build_serve_message(event, attempt, client)?;
        self.send(backend, &message).await
    }
}

impl From<tera::Error> for ServiceError {
    fn from(err: tera::Error) -> Self {
        ServiceError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::serve_attempt::ServeStatus;
    use crate::domain::types::GeoPoint;

    const BUSINESS: &str = "info@justlegalsolutions.org";

    fn mailer() -> Mailer {
        let tera = Tera::new("templates/**/*.html").unwrap();
        Mailer::new(Arc::new(tera), BUSINESS.to_string())
    }

    fn attempt() -> ServeAttempt {
        ServeAttempt {
            id: "a1".to_string(),
            client_id: "c1".to_string(),
            case_number: "CV-2023-0001".to_string(),
            attempt_number: 2,
            status: ServeStatus::Completed,
            notes: Some("served at front door".to_string()),
            coordinates: Some(GeoPoint::new(36.15, -95.99).unwrap()),
            image_data: Some("data:image/jpeg;base64,QUJD".to_string()),
            timestamp: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn business_address_is_appended_exactly_once() {
        let recipients = collect_recipients(&["a@example.com".to_string()], BUSINESS);
        assert_eq!(recipients, vec!["a@example.com".to_string(), BUSINESS.to_string()]);

        let recipients = collect_recipients(
            &[
                "a@example.com".to_string(),
                BUSINESS.to_string(),
                "a@example.com".to_string(),
            ],
            BUSINESS,
        );
        assert_eq!(recipients, vec!["a@example.com".to_string(), BUSINESS.to_string()]);
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
    }

    #[test]
    fn serve_message_carries_evidence_and_subject() {
        let message = mailer()
            .build_serve_message(ServeEvent::Created, &attempt(), None)
            .unwrap();
        assert_eq!(message.to, vec![BUSINESS.to_string()]);
        assert_eq!(
            message.subject,
            "Serve attempt logged for case CV-2023-0001 (attempt #2)"
        );
        assert_eq!(message.image_data.as_deref(), Some("QUJD"));
        assert_eq!(message.coordinates.as_deref(), Some("36.15,-95.99"));
        assert!(message.body.contains("CV-2023-0001"));
    }
}
