use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use log::error;

use crate::backend::RemoteBackend;
use crate::dto::serve::ServesQuery;
use crate::forms::serve::{AddServeAttemptForm, UpdateServeAttemptForm};
use crate::mailer::Mailer;
use crate::routes::error_response;
use crate::services::serve as serve_service;
use crate::state::LocalState;

#[get("/v1/serves")]
pub async fn api_list_serves(
    params: web::Query<ServesQuery>,
    state: web::Data<LocalState>,
) -> impl Responder {
    HttpResponse::Ok().json(serve_service::list_serve_attempts(
        &state,
        params.into_inner(),
    ))
}

#[post("/v1/serves")]
pub async fn api_create_serve(
    form: web::Json<AddServeAttemptForm>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    match serve_service::create_serve_attempt(
        backend.get_ref(),
        &state,
        &mailer,
        form.into_inner(),
    )
    .await
    {
        Ok(attempt) => HttpResponse::Created().json(attempt),
        Err(e) => {
            error!("Failed to create serve attempt: {e}");
            error_response(e)
        }
    }
}

#[put("/v1/serves/{serve_id}")]
pub async fn api_update_serve(
    serve_id: web::Path<String>,
    form: web::Json<UpdateServeAttemptForm>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    match serve_service::update_serve_attempt(
        backend.get_ref(),
        &state,
        &mailer,
        &serve_id,
        form.into_inner(),
    )
    .await
    {
        Ok(attempt) => HttpResponse::Ok().json(attempt),
        Err(e) => {
            error!("Failed to update serve attempt: {e}");
            error_response(e)
        }
    }
}

#[delete("/v1/serves/{serve_id}")]
pub async fn api_delete_serve(
    serve_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
    mailer: web::Data<Mailer>,
) -> impl Responder {
    match serve_service::delete_serve_attempt(backend.get_ref(), &state, &mailer, &serve_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("Failed to delete serve attempt: {e}");
            error_response(e)
        }
    }
}
