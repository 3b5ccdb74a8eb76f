use log::error;
use uuid::Uuid;

use crate::backend::{Collection, ListQuery, RemoteBackend};
use crate::domain::document::{ClientDocument, NewClientDocument};
use crate::forms::document::UploadDocumentForm;
use crate::normalize;
use crate::services::{ServiceError, ServiceResult};

pub async fn list_documents<B>(
    backend: &B,
    client_id: &str,
    case_number: Option<&str>,
) -> ServiceResult<Vec<ClientDocument>>
where
    B: RemoteBackend + ?Sized,
{
    let mut query = ListQuery::new().filter("clientId", client_id);
    if let Some(case_number) = case_number {
        query = query.filter("caseNumber", case_number);
    }
    let docs = backend.list_documents(Collection::Documents, query).await?;
    Ok(normalize::normalize_documents(&docs))
}

/// Stores the uploaded binary, then creates the metadata document pointing at
/// it. Returns the normalized metadata record.
pub async fn upload_document<B>(
    backend: &B,
    form: UploadDocumentForm,
) -> ServiceResult<ClientDocument>
where
    B: RemoteBackend + ?Sized,
{
    let client_id = form.client_id.into_inner();
    if client_id.trim().is_empty() {
        return Err(ServiceError::Form("client_id is required".to_string()));
    }

    let file_name = form
        .file
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "upload.bin".to_string());
    let content_type = form
        .file
        .content_type
        .as_ref()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = std::fs::read(form.file.file.path())
        .map_err(|e| ServiceError::Internal(format!("failed to read upload: {e}")))?;
    let file_size = bytes.len() as i64;

    let stored = backend
        .upload_file(&file_name, &content_type, bytes)
        .await?;

    let new_document = NewClientDocument::new(
        client_id,
        form.case_number.map(|t| t.into_inner()),
        stored.id,
        file_name,
        content_type,
        file_size,
        form.description.map(|t| t.into_inner()),
    );
    let id = Uuid::new_v4().to_string();
    let doc = backend
        .create_document(Collection::Documents, &id, &new_document.to_document())
        .await?;

    normalize::normalize_document(&doc).ok_or_else(|| {
        ServiceError::Internal("backend returned an unreadable document record".to_string())
    })
}

/// Resolves the public view URL for a stored document.
pub async fn document_view_url<B>(backend: &B, id: &str) -> ServiceResult<String>
where
    B: RemoteBackend + ?Sized,
{
    let doc = backend.get_document(Collection::Documents, id).await?;
    let document = normalize::normalize_document(&doc).ok_or(ServiceError::NotFound)?;
    if document.file_id.is_empty() {
        return Err(ServiceError::NotFound);
    }
    Ok(backend.file_view_url(&document.file_id))
}

/// Deletes the stored file (best effort) and then the metadata document.
pub async fn delete_document<B>(backend: &B, id: &str) -> ServiceResult<()>
where
    B: RemoteBackend + ?Sized,
{
    let doc = backend.get_document(Collection::Documents, id).await?;
    if let Some(document) = normalize::normalize_document(&doc) {
        if !document.file_id.is_empty() {
            if let Err(e) = backend.delete_file(&document.file_id).await {
                error!("Failed to delete stored file {}: {e}", document.file_id);
            }
        }
    }

    backend
        .delete_document(Collection::Documents, id)
        .await
        .map_err(ServiceError::from)
}
