use std::sync::Arc;

use serde_json::json;
use tera::Tera;

use servetracker::backend::Collection;
use servetracker::domain::case::CaseStatus;
use servetracker::domain::client::Client;
use servetracker::domain::serve_attempt::ServeStatus;
use servetracker::forms::serve::AddServeAttemptForm;
use servetracker::mailer::Mailer;
use servetracker::mirror::MirrorStore;
use servetracker::services::client as client_service;
use servetracker::services::serve as serve_service;
use servetracker::state::LocalState;

mod common;

use common::{FakeBackend, TestDb};

const BUSINESS: &str = "info@justlegalsolutions.org";

fn test_state(test_db: &TestDb) -> LocalState {
    LocalState::new(MirrorStore::new(test_db.pool()))
}

fn test_mailer() -> Mailer {
    let tera = Tera::new("templates/**/*.html").expect("templates parse");
    Mailer::new(Arc::new(tera), BUSINESS.to_string())
}

fn seed_client(backend: &FakeBackend, state: &LocalState, id: &str, email: &str) {
    backend.seed(
        Collection::Clients,
        json!({"$id": id, "name": "Jane Roe", "email": email}),
    );
    state.upsert_client(Client {
        id: id.to_string(),
        name: "Jane Roe".to_string(),
        email: Some(email.to_string()),
        ..Client::default()
    });
}

#[tokio::test]
async fn test_completed_serve_closes_case_and_notifies() {
    let test_db = TestDb::new("test_serve_closes_case.db");
    let state = test_state(&test_db);
    let backend = FakeBackend::new();
    seed_client(&backend, &state, "c1", "jane@acmeprocess.com");
    backend.seed(
        Collection::Cases,
        json!({
            "$id": "k1",
            "clientId": "c1",
            "caseNumber": "CV-2023-0001",
            "status": "Pending",
        }),
    );

    let form = AddServeAttemptForm {
        client_id: "c1".to_string(),
        case_number: "CV-2023-0001".to_string(),
        status: "completed".to_string(),
        notes: Some("served at front door".to_string()),
        coordinates: Some(json!("36.15,-95.99")),
        image_data: Some("data:image/jpeg;base64,QUJD".to_string()),
    };
    let attempt = serve_service::create_serve_attempt(&backend, &state, &test_mailer(), form)
        .await
        .unwrap();

    assert_eq!(attempt.attempt_number, 1);
    assert_eq!(attempt.status, ServeStatus::Completed);
    assert_eq!(state.serve_attempts().len(), 1);

    // The owning case advanced to Closed.
    let cases = backend.documents(Collection::Cases);
    assert_eq!(cases[0]["status"], CaseStatus::Closed.to_string());

    // One notification, client address first, business address appended once,
    // photo evidence without its data-URI prefix.
    let emails = backend.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["to"], json!(["jane@acmeprocess.com", BUSINESS]));
    assert_eq!(emails[0]["imageData"], "QUJD");
    assert_eq!(emails[0]["coordinates"], "36.15,-95.99");
}

#[tokio::test]
async fn test_failed_serve_keeps_case_pending() {
    let test_db = TestDb::new("test_serve_keeps_pending.db");
    let state = test_state(&test_db);
    let backend = FakeBackend::new();
    seed_client(&backend, &state, "c1", "jane@acmeprocess.com");
    backend.seed(
        Collection::Cases,
        json!({
            "$id": "k1",
            "clientId": "c1",
            "caseNumber": "CV-2023-0001",
            "status": "Pending",
        }),
    );

    let form = AddServeAttemptForm {
        client_id: "c1".to_string(),
        case_number: "CV-2023-0001".to_string(),
        status: "failed".to_string(),
        notes: None,
        coordinates: None,
        image_data: None,
    };
    serve_service::create_serve_attempt(&backend, &state, &test_mailer(), form)
        .await
        .unwrap();

    let cases = backend.documents(Collection::Cases);
    assert_eq!(cases[0]["status"], "Pending");
}

#[tokio::test]
async fn test_attempt_ordinals_continue_per_case() {
    let test_db = TestDb::new("test_serve_ordinals.db");
    let state = test_state(&test_db);
    let backend = FakeBackend::new();
    seed_client(&backend, &state, "c1", "jane@acmeprocess.com");
    backend.seed(
        Collection::ServeAttempts,
        json!({
            "$id": "a1",
            "clientId": "c1",
            "caseNumber": "CV-2023-0001",
            "attemptNumber": 2,
            "status": "failed",
        }),
    );

    let form = AddServeAttemptForm {
        client_id: "c1".to_string(),
        case_number: "CV-2023-0001".to_string(),
        status: "failed".to_string(),
        notes: None,
        coordinates: None,
        image_data: None,
    };
    let attempt = serve_service::create_serve_attempt(&backend, &state, &test_mailer(), form)
        .await
        .unwrap();
    assert_eq!(attempt.attempt_number, 3);

    // A different case under the same client starts over at 1.
    let form = AddServeAttemptForm {
        client_id: "c1".to_string(),
        case_number: "CV-2023-0002".to_string(),
        status: "failed".to_string(),
        notes: None,
        coordinates: None,
        image_data: None,
    };
    let attempt = serve_service::create_serve_attempt(&backend, &state, &test_mailer(), form)
        .await
        .unwrap();
    assert_eq!(attempt.attempt_number, 1);
}

#[tokio::test]
async fn test_cascade_delete_survives_a_failing_file_delete() {
    let test_db = TestDb::new("test_cascade_delete.db");
    let state = test_state(&test_db);
    let backend = FakeBackend::new();
    seed_client(&backend, &state, "c1", "jane@acmeprocess.com");
    backend.seed(
        Collection::ServeAttempts,
        json!({"$id": "a1", "clientId": "c1", "caseNumber": "CV-1", "attemptNumber": 1}),
    );
    backend.seed(
        Collection::ServeAttempts,
        json!({"$id": "a2", "clientId": "c1", "caseNumber": "CV-1", "attemptNumber": 2}),
    );
    backend.seed(
        Collection::Documents,
        json!({
            "$id": "d1",
            "clientId": "c1",
            "fileId": "file-9",
            "fileName": "summons.pdf",
            "fileType": "application/pdf",
            "fileSize": 1024,
        }),
    );
    backend.fail_file_deletes();

    let report = client_service::delete_client(&backend, &state, "c1")
        .await
        .unwrap();

    // Every dependent record is gone even though the stored file survived.
    assert_eq!(report.deleted_serve_attempts, 2);
    assert_eq!(report.deleted_cases, 0);
    assert_eq!(report.deleted_documents, 1);
    assert_eq!(report.orphans.len(), 1);
    assert_eq!(report.orphans[0].kind, "document_file");
    assert_eq!(report.orphans[0].id, "file-9");

    assert!(backend.documents(Collection::Clients).is_empty());
    assert!(backend.documents(Collection::ServeAttempts).is_empty());
    assert!(backend.documents(Collection::Documents).is_empty());
    assert_eq!(state.find_client("c1"), None);
    assert!(state.serve_attempts().is_empty());
}

#[tokio::test]
async fn test_deleting_a_serve_attempt_notifies_with_its_snapshot() {
    let test_db = TestDb::new("test_serve_delete_notifies.db");
    let state = test_state(&test_db);
    let backend = FakeBackend::new();
    seed_client(&backend, &state, "c1", "jane@acmeprocess.com");

    let form = AddServeAttemptForm {
        client_id: "c1".to_string(),
        case_number: "CV-2023-0001".to_string(),
        status: "failed".to_string(),
        notes: None,
        coordinates: None,
        image_data: None,
    };
    let attempt = serve_service::create_serve_attempt(&backend, &state, &test_mailer(), form)
        .await
        .unwrap();

    serve_service::delete_serve_attempt(&backend, &state, &test_mailer(), &attempt.id)
        .await
        .unwrap();

    assert!(backend.documents(Collection::ServeAttempts).is_empty());
    assert!(state.serve_attempts().is_empty());

    let emails = backend.sent_emails();
    assert_eq!(emails.len(), 2);
    assert!(
        emails[1]["subject"]
            .as_str()
            .unwrap()
            .contains("deleted for case CV-2023-0001")
    );
}
