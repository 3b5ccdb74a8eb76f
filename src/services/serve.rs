use log::{error, warn};
use uuid::Uuid;
use validator::Validate;

use crate::backend::{Collection, ListQuery, RemoteBackend};
use crate::domain::serve_attempt::{ServeAttempt, UpdateServeAttempt};
use crate::dto::serve::ServesQuery;
use crate::forms::serve::{AddServeAttemptForm, UpdateServeAttemptForm};
use crate::mailer::{Mailer, ServeEvent};
use crate::normalize;
use crate::services::case as case_service;
use crate::services::{ServiceError, ServiceResult};
use crate::state::LocalState;

/// Serves the list from the in-memory snapshot, filtered by client and case.
pub fn list_serve_attempts(state: &LocalState, query: ServesQuery) -> Vec<ServeAttempt> {
    let mut attempts = state.serve_attempts();
    if let Some(client_id) = &query.client_id {
        attempts.retain(|a| &a.client_id == client_id);
    }
    if let Some(case_number) = &query.case_number {
        attempts.retain(|a| &a.case_number == case_number);
    }
    attempts
}

/// Next ordinal for the client+case pair, read from the live remote list at
/// creation time rather than from the cached snapshot.
async fn next_attempt_number<B>(
    backend: &B,
    client_id: &str,
    case_number: &str,
) -> ServiceResult<i32>
where
    B: RemoteBackend + ?Sized,
{
    let docs = backend
        .list_documents(
            Collection::ServeAttempts,
            ListQuery::new()
                .filter("clientId", client_id)
                .filter("caseNumber", case_number),
        )
        .await?;
    let highest = normalize::normalize_serve_attempts(&docs)
        .iter()
        .map(|a| a.attempt_number)
        .max()
        .unwrap_or(0);
    Ok(highest + 1)
}

/// Logs a serve attempt: remote create, optimistic local merge, case status
/// cascade, then a best-effort notification email.
pub async fn create_serve_attempt<B>(
    backend: &B,
    state: &LocalState,
    mailer: &Mailer,
    form: AddServeAttemptForm,
) -> ServiceResult<ServeAttempt>
where
    B: RemoteBackend + ?Sized,
{
    form.validate().map_err(|e| {
        error!("Failed to validate form: {e}");
        ServiceError::Form(e.to_string())
    })?;

    let attempt_number = next_attempt_number(backend, &form.client_id, &form.case_number).await?;
    let new_attempt = form.to_new_attempt(attempt_number);
    let id = Uuid::new_v4().to_string();
    let doc = backend
        .create_document(Collection::ServeAttempts, &id, &new_attempt.to_document())
        .await?;

    let attempt = normalize::normalize_serve_attempt(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable serve attempt".to_string())
    })?;
    state.upsert_attempt(attempt.clone());

    if let Err(e) =
        case_service::apply_serve_outcome(backend, &attempt.client_id, &attempt.case_number, attempt.status)
            .await
    {
        error!(
            "Failed to advance case status for {}: {e}",
            attempt.case_number
        );
    }

    notify(backend, state, mailer, ServeEvent::Created, &attempt).await;
    Ok(attempt)
}

pub async fn update_serve_attempt<B>(
    backend: &B,
    state: &LocalState,
    mailer: &Mailer,
    id: &str,
    form: UpdateServeAttemptForm,
) -> ServiceResult<ServeAttempt>
where
    B: RemoteBackend + ?Sized,
{
    let updates = UpdateServeAttempt::from(&form);
    let doc = backend
        .update_document(Collection::ServeAttempts, id, &updates.to_document())
        .await?;

    let attempt = normalize::normalize_serve_attempt(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable serve attempt".to_string())
    })?;
    state.upsert_attempt(attempt.clone());

    // An edited status can still move the case.
    if updates.status.is_some() {
        if let Err(e) = case_service::apply_serve_outcome(
            backend,
            &attempt.client_id,
            &attempt.case_number,
            attempt.status,
        )
        .await
        {
            error!(
                "Failed to advance case status for {}: {e}",
                attempt.case_number
            );
        }
    }

    notify(backend, state, mailer, ServeEvent::Updated, &attempt).await;
    Ok(attempt)
}

pub async fn delete_serve_attempt<B>(
    backend: &B,
    state: &LocalState,
    mailer: &Mailer,
    id: &str,
) -> ServiceResult<()>
where
    B: RemoteBackend + ?Sized,
{
    // Captured before the delete so the notification can describe it.
    let existing = state.find_attempt(id);

    backend
        .delete_document(Collection::ServeAttempts, id)
        .await?;
    state.remove_attempt(id);

    match existing {
        Some(attempt) => notify(backend, state, mailer, ServeEvent::Deleted, &attempt).await,
        None => warn!("Deleted serve attempt {id} was not in the local snapshot"),
    }
    Ok(())
}

/// Email failure is logged and swallowed; the data mutation stands.
async fn notify<B>(
    backend: &B,
    state: &LocalState,
    mailer: &Mailer,
    event: ServeEvent,
    attempt: &ServeAttempt,
) where
    B: RemoteBackend + ?Sized,
{
    let client = state.find_client(&attempt.client_id);
    if let Err(e) = mailer
        .notify_serve_event(backend, event, attempt, client.as_ref())
        .await
    {
        error!("Failed to send serve notification email: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::tempdir;
    use tera::Tera;

    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::{BackendError, FunctionEnvelope};
    use crate::db::establish_connection_pool;
    use crate::domain::serve_attempt::ServeStatus;
    use crate::mirror::{self, MirrorStore};

    fn test_state(dir: &tempfile::TempDir) -> LocalState {
        let db_path = dir.path().join("mirror.db");
        let pool = establish_connection_pool(db_path.to_str().unwrap()).unwrap();
        mirror::run_migrations(&pool).unwrap();
        LocalState::new(MirrorStore::new(pool))
    }

    fn test_mailer() -> Mailer {
        let tera = Tera::new("templates/**/*.html").unwrap();
        Mailer::new(Arc::new(tera), "info@justlegalsolutions.org".to_string())
    }

    fn add_form(status: &str) -> AddServeAttemptForm {
        AddServeAttemptForm {
            client_id: "c1".to_string(),
            case_number: "CV-2023-0001".to_string(),
            status: status.to_string(),
            notes: None,
            coordinates: None,
            image_data: None,
        }
    }

    #[tokio::test]
    async fn ordinal_continues_from_the_live_remote_count() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir);

        let mut backend = MockBackend::new();
        backend
            .expect_list_documents()
            .returning(|collection, query| {
                Ok(match collection {
                    Collection::ServeAttempts if !query.filters.is_empty() => vec![
                        json!({"$id": "a1", "attemptNumber": 1}),
                        json!({"$id": "a2", "attemptNumber": 4}),
                    ],
                    // The case lookup for the status cascade.
                    _ => vec![],
                })
            });
        backend
            .expect_create_document()
            .withf(|_, _, data| data["attemptNumber"] == 5)
            .times(1)
            .returning(|_, id, data| {
                let mut doc = data.clone();
                doc["$id"] = json!(id);
                Ok(doc)
            });
        backend
            .expect_invoke_function()
            .returning(|_| Ok(FunctionEnvelope {
                success: true,
                message: String::new(),
            }));

        let attempt = create_serve_attempt(&backend, &state, &test_mailer(), add_form("failed"))
            .await
            .unwrap();
        assert_eq!(attempt.attempt_number, 5);
        assert_eq!(attempt.status, ServeStatus::Failed);
        assert_eq!(state.serve_attempts().len(), 1);
    }

    #[tokio::test]
    async fn email_failure_does_not_roll_back_the_attempt() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir);

        let mut backend = MockBackend::new();
        backend.expect_list_documents().returning(|_, _| Ok(vec![]));
        backend.expect_create_document().returning(|_, id, data| {
            let mut doc = data.clone();
            doc["$id"] = json!(id);
            Ok(doc)
        });
        backend
            .expect_invoke_function()
            .returning(|_| Err(BackendError::Unreachable("relay down".to_string())));

        let attempt = create_serve_attempt(&backend, &state, &test_mailer(), add_form("completed"))
            .await
            .unwrap();
        assert_eq!(attempt.attempt_number, 1);
        assert_eq!(state.serve_attempts().len(), 1);
    }
}
