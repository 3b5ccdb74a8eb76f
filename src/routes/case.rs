use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use log::error;

use crate::backend::RemoteBackend;
use crate::forms::case::{AddCaseForm, UpdateCaseForm};
use crate::routes::error_response;
use crate::services::case as case_service;

#[get("/v1/clients/{client_id}/cases")]
pub async fn api_list_cases(
    client_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match case_service::list_cases(backend.get_ref(), &client_id).await {
        Ok(cases) => HttpResponse::Ok().json(cases),
        Err(e) => {
            error!("Failed to list cases: {e}");
            error_response(e)
        }
    }
}

#[post("/v1/cases")]
pub async fn api_create_case(
    form: web::Json<AddCaseForm>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match case_service::create_case(backend.get_ref(), form.into_inner()).await {
        Ok(case) => HttpResponse::Created().json(case),
        Err(e) => {
            error!("Failed to create case: {e}");
            error_response(e)
        }
    }
}

#[put("/v1/cases/{case_id}")]
pub async fn api_update_case(
    case_id: web::Path<String>,
    form: web::Json<UpdateCaseForm>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match case_service::update_case(backend.get_ref(), &case_id, form.into_inner()).await {
        Ok(case) => HttpResponse::Ok().json(case),
        Err(e) => {
            error!("Failed to update case: {e}");
            error_response(e)
        }
    }
}

#[delete("/v1/cases/{case_id}")]
pub async fn api_delete_case(
    case_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
) -> impl Responder {
    match case_service::delete_case(backend.get_ref(), &case_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("Failed to delete case: {e}");
            error_response(e)
        }
    }
}
