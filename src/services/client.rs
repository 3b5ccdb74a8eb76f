use log::error;
use uuid::Uuid;
use validator::Validate;

use crate::backend::{BackendError, Collection, ListQuery, RemoteBackend};
use crate::domain::client::{Client, UpdateClient};
use crate::dto::client::{CascadeReport, ClientsQuery, ClientsResponse, OrphanedRecord};
use crate::forms::client::{AddClientForm, UpdateClientForm};
use crate::normalize;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::services::{ServiceError, ServiceResult};
use crate::state::LocalState;

/// Loads the client list from the in-memory snapshot, so the view keeps
/// working with the backend unreachable.
pub fn list_clients(state: &LocalState, query: ClientsQuery) -> ServiceResult<ClientsResponse> {
    let mut clients = state.clients();

    let search = query
        .search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    if let Some(term) = &search {
        clients.retain(|client| matches_search(client, term));
    }

    let total = clients.len();
    let page = query.page.unwrap_or(1).max(1);
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    let items: Vec<Client> = clients
        .into_iter()
        .skip((page - 1) * DEFAULT_ITEMS_PER_PAGE)
        .take(DEFAULT_ITEMS_PER_PAGE)
        .collect();

    Ok(ClientsResponse {
        total,
        clients: Paginated::new(items, page, total_pages),
    })
}

fn matches_search(client: &Client, term: &str) -> bool {
    client.name.to_lowercase().contains(term)
        || client
            .email
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(term))
        || client
            .phone
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(term))
        || client
            .address
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(term))
}

pub fn get_client(state: &LocalState, id: &str) -> ServiceResult<Client> {
    state.find_client(id).ok_or(ServiceError::NotFound)
}

/// Validates the form and creates the client remotely, then merges the
/// result into the local snapshot.
pub async fn create_client<B>(
    backend: &B,
    state: &LocalState,
    form: AddClientForm,
) -> ServiceResult<Client>
where
    B: RemoteBackend + ?Sized,
{
    form.validate().map_err(|e| {
        error!("Failed to validate form: {e}");
        ServiceError::Form(e.to_string())
    })?;

    let new_client = form.to_new_client();
    let id = Uuid::new_v4().to_string();
    let doc = backend
        .create_document(Collection::Clients, &id, &new_client.to_document())
        .await?;

    let client = normalize::normalize_client(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable client document".to_string())
    })?;
    state.upsert_client(client.clone());
    Ok(client)
}

pub async fn update_client<B>(
    backend: &B,
    state: &LocalState,
    id: &str,
    form: UpdateClientForm,
) -> ServiceResult<Client>
where
    B: RemoteBackend + ?Sized,
{
    form.validate().map_err(|e| {
        error!("Failed to validate form: {e}");
        ServiceError::Form(e.to_string())
    })?;

    let updates = UpdateClient::from(&form);
    let doc = backend
        .update_document(Collection::Clients, id, &updates.to_document())
        .await?;

    let client = normalize::normalize_client(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable client document".to_string())
    })?;
    state.upsert_client(client.clone());
    Ok(client)
}

/// Removes a client and everything under it: serve attempts, cases, and
/// documents (storage file first, metadata second). Each failed step is
/// retried once; survivors are reported, not hidden. The client delete itself
/// must succeed for the operation to report success.
pub async fn delete_client<B>(
    backend: &B,
    state: &LocalState,
    id: &str,
) -> ServiceResult<CascadeReport>
where
    B: RemoteBackend + ?Sized,
{
    let mut report = CascadeReport::default();

    let attempt_ids = list_dependent_ids(backend, Collection::ServeAttempts, id, &mut report)
        .await
        .unwrap_or_default();
    report.deleted_serve_attempts = delete_documents(
        backend,
        Collection::ServeAttempts,
        "serve_attempt",
        attempt_ids,
        &mut report,
    )
    .await;

    let case_ids = list_dependent_ids(backend, Collection::Cases, id, &mut report)
        .await
        .unwrap_or_default();
    report.deleted_cases =
        delete_documents(backend, Collection::Cases, "case", case_ids, &mut report).await;

    match backend
        .list_documents(Collection::Documents, ListQuery::new().filter("clientId", id))
        .await
    {
        Ok(docs) => {
            for document in normalize::normalize_documents(&docs) {
                if !document.file_id.is_empty() {
                    delete_stored_file(backend, &document.file_id, &mut report).await;
                }
                report.deleted_documents += delete_documents(
                    backend,
                    Collection::Documents,
                    "document",
                    vec![document.id],
                    &mut report,
                )
                .await;
            }
        }
        Err(e) => {
            error!("Failed to list documents for client {id}: {e}");
            report.orphans.push(OrphanedRecord {
                kind: "documents".to_string(),
                id: "*".to_string(),
                error: e.to_string(),
            });
        }
    }

    // The primary delete is the one step that may fail the whole operation.
    backend.delete_document(Collection::Clients, id).await?;
    state.remove_client(id);

    if !report.orphans.is_empty() {
        error!(
            "Client {id} deleted with {} orphaned dependent(s)",
            report.orphans.len()
        );
    }
    Ok(report)
}

async fn list_dependent_ids<B>(
    backend: &B,
    collection: Collection,
    client_id: &str,
    report: &mut CascadeReport,
) -> Option<Vec<String>>
where
    B: RemoteBackend + ?Sized,
{
    let kind = match collection {
        Collection::ServeAttempts => "serve_attempts",
        Collection::Cases => "cases",
        _ => "documents",
    };
    match backend
        .list_documents(collection, ListQuery::new().filter("clientId", client_id))
        .await
    {
        Ok(docs) => Some(
            docs.iter()
                .filter_map(|doc| doc.get("$id").or_else(|| doc.get("id")))
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        Err(e) => {
            error!("Failed to list {kind} for client {client_id}: {e}");
            report.orphans.push(OrphanedRecord {
                kind: kind.to_string(),
                id: "*".to_string(),
                error: e.to_string(),
            });
            None
        }
    }
}

/// Deletes the given documents, retrying each failure once. Returns how many
/// went away; the rest land in the orphan report.
async fn delete_documents<B>(
    backend: &B,
    collection: Collection,
    kind: &str,
    ids: Vec<String>,
    report: &mut CascadeReport,
) -> usize
where
    B: RemoteBackend + ?Sized,
{
    let mut deleted = 0;
    for id in ids {
        match backend.delete_document(collection, &id).await {
            Ok(()) => deleted += 1,
            Err(first) => {
                error!("Failed to delete {kind} {id}: {first}; retrying once");
                match backend.delete_document(collection, &id).await {
                    Ok(()) | Err(BackendError::NotFound) => deleted += 1,
                    Err(e) => {
                        error!("Retry failed for {kind} {id}: {e}");
                        report.orphans.push(OrphanedRecord {
                            kind: kind.to_string(),
                            id,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }
    deleted
}

async fn delete_stored_file<B>(backend: &B, file_id: &str, report: &mut CascadeReport)
where
    B: RemoteBackend + ?Sized,
{
    if let Err(first) = backend.delete_file(file_id).await {
        error!("Failed to delete stored file {file_id}: {first}; retrying once");
        match backend.delete_file(file_id).await {
            Ok(()) | Err(BackendError::NotFound) => {}
            Err(e) => {
                error!("Retry failed for stored file {file_id}: {e}");
                report.orphans.push(OrphanedRecord {
                    kind: "document_file".to_string(),
                    id: file_id.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}
