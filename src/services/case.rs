use log::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::backend::{Collection, ListQuery, RemoteBackend};
use crate::domain::case::{Case, UpdateCase};
use crate::domain::serve_attempt::ServeStatus;
use crate::forms::case::{AddCaseForm, UpdateCaseForm};
use crate::normalize;
use crate::services::{ServiceError, ServiceResult};

/// Cases are not mirrored; the list always comes from the backend.
pub async fn list_cases<B>(backend: &B, client_id: &str) -> ServiceResult<Vec<Case>>
where
    B: RemoteBackend + ?Sized,
{
    let docs = backend
        .list_documents(
            Collection::Cases,
            ListQuery::new().filter("clientId", client_id),
        )
        .await?;
    Ok(normalize::normalize_cases(&docs))
}

pub async fn create_case<B>(backend: &B, form: AddCaseForm) -> ServiceResult<Case>
where
    B: RemoteBackend + ?Sized,
{
    form.validate().map_err(|e| {
        error!("Failed to validate form: {e}");
        ServiceError::Form(e.to_string())
    })?;

    let new_case = form.to_new_case();
    let id = Uuid::new_v4().to_string();
    let doc = backend
        .create_document(Collection::Cases, &id, &new_case.to_document())
        .await?;
    normalize::normalize_case(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable case document".to_string())
    })
}

pub async fn update_case<B>(backend: &B, id: &str, form: UpdateCaseForm) -> ServiceResult<Case>
where
    B: RemoteBackend + ?Sized,
{
    let updates = UpdateCase::from(&form);
    let doc = backend
        .update_document(Collection::Cases, id, &updates.to_document())
        .await?;
    normalize::normalize_case(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable case document".to_string())
    })
}

pub async fn delete_case<B>(backend: &B, id: &str) -> ServiceResult<()>
where
    B: RemoteBackend + ?Sized,
{
    backend
        .delete_document(Collection::Cases, id)
        .await
        .map_err(ServiceError::from)
}

/// Advances the owning case after a serve attempt: a completed serve closes
/// it, a failed one keeps it pending. Returns the case as it stands
/// afterwards, or `None` when no case matches the client+number pair.
pub async fn apply_serve_outcome<B>(
    backend: &B,
    client_id: &str,
    case_number: &str,
    outcome: ServeStatus,
) -> ServiceResult<Option<Case>>
where
    B: RemoteBackend + ?Sized,
{
    let docs = backend
        .list_documents(
            Collection::Cases,
            ListQuery::new()
                .filter("clientId", client_id)
                .filter("caseNumber", case_number),
        )
        .await?;

    let Some(case) = normalize::normalize_cases(&docs).into_iter().next() else {
        return Ok(None);
    };

    let Some(next) = case.status.after_serve(outcome) else {
        return Ok(Some(case));
    };
    if next == case.status {
        return Ok(Some(case));
    }

    info!(
        "Case {case_number} moves from {} to {next} after {outcome} serve",
        case.status
    );
    let updates = UpdateCase {
        status: Some(next),
        ..UpdateCase::default()
    };
    let doc = backend
        .update_document(Collection::Cases, &case.id, &updates.to_document())
        .await?;
    Ok(Some(normalize::normalize_case(&doc).unwrap_or(Case {
        status: next,
        ..case
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::domain::case::CaseStatus;

    fn case_doc(status: &str) -> serde_json::Value {
        json!({
            "$id": "k1",
            "clientId": "c1",
            "caseNumber": "CV-2023-0001",
            "status": status,
        })
    }

    #[tokio::test]
    async fn completed_serve_closes_the_case() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_documents()
            .returning(|_, _| Ok(vec![case_doc("Pending")]));
        backend
            .expect_update_document()
            .withf(|collection, id, data| {
                *collection == Collection::Cases && id == "k1" && data["status"] == "Closed"
            })
            .times(1)
            .returning(|_, _, _| Ok(case_doc("Closed")));

        let case = apply_serve_outcome(&backend, "c1", "CV-2023-0001", ServeStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(case.status, CaseStatus::Closed);
    }

    #[tokio::test]
    async fn failed_serve_leaves_the_case_pending() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_documents()
            .returning(|_, _| Ok(vec![case_doc("Pending")]));
        // Already pending: no update call expected.

        let case = apply_serve_outcome(&backend, "c1", "CV-2023-0001", ServeStatus::Failed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
    }

    #[tokio::test]
    async fn failed_serve_does_not_reopen_a_closed_case() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_documents()
            .returning(|_, _| Ok(vec![case_doc("Closed")]));

        let case = apply_serve_outcome(&backend, "c1", "CV-2023-0001", ServeStatus::Failed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(case.status, CaseStatus::Closed);
    }
}
