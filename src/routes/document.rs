use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, delete, get, post, web};
use log::error;

use crate::backend::RemoteBackend;
use crate::dto::serve::{DocumentUrlResponse, DocumentsQuery};
use crate::forms::document::UploadDocumentForm;
use crate::routes::error_response;
use crate::services::document as document_service;

#[get("/v1/clients/{client_id}/documents")]
pub async fn api_list_documents(
    client_id: web::Path<String>,
    params: web::Query<DocumentsQuery>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match document_service::list_documents(
        backend.get_ref(),
        &client_id,
        params.case_number.as_deref(),
    )
    .await
    {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(e) => {
            error!("Failed to list documents: {e}");
            error_response(e)
        }
    }
}

#[post("/v1/documents")]
pub async fn api_upload_document(
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match document_service::upload_document(backend.get_ref(), form).await {
        Ok(document) => HttpResponse::Created().json(document),
        Err(e) => {
            error!("Failed to upload document: {e}");
            error_response(e)
        }
    }
}

#[get("/v1/documents/{document_id}/url")]
pub async fn api_document_url(
    document_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match document_service::document_view_url(backend.get_ref(), &document_id).await {
        Ok(url) => HttpResponse::Ok().json(DocumentUrlResponse { url }),
        Err(e) => {
            error!("Failed to resolve document URL: {e}");
            error_response(e)
        }
    }
}

#[delete("/v1/documents/{document_id}")]
pub async fn api_delete_document(
    document_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match document_service::delete_document(backend.get_ref(), &document_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("Failed to delete document: {e}");
            error_response(e)
        }
    }
}
