use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use log::error;

use crate::backend::RemoteBackend;
use crate::dto::client::ClientsQuery;
use crate::forms::client::{AddClientForm, UpdateClientForm};
use crate::routes::error_response;
use crate::services::client as client_service;
use crate::state::LocalState;

#[get("/v1/clients")]
pub async fn api_list_clients(
    params: web::Query<ClientsQuery>,
    state: web::Data<LocalState>,
) -> impl Responder {
    match client_service::list_clients(&state, params.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Failed to list clients: {e}");
            error_response(e)
        }
    }
}

#[get("/v1/clients/{client_id}")]
pub async fn api_get_client(
    client_id: web::Path<String>,
    state: web::Data<LocalState>,
) -> impl Responder {
    match client_service::get_client(&state, &client_id) {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(e) => error_response(e),
    }
}

#[post("/v1/clients")]
pub async fn api_create_client(
    form: web::Json<AddClientForm>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
) -> impl Responder {
    match client_service::create_client(backend.get_ref(), &state, form.into_inner()).await {
        Ok(client) => HttpResponse::Created().json(client),
        Err(e) => {
            error!("Failed to create client: {e}");
            error_response(e)
        }
    }
}

#[put("/v1/clients/{client_id}")]
pub async fn api_update_client(
    client_id: web::Path<String>,
    form: web::Json<UpdateClientForm>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
) -> impl Responder {
    match client_service::update_client(backend.get_ref(), &state, &client_id, form.into_inner())
        .await
    {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(e) => {
            error!("Failed to update client: {e}");
            error_response(e)
        }
    }
}

#[delete("/v1/clients/{client_id}")]
pub async fn api_delete_client(
    client_id: web::Path<String>,
    backend: web::Data<dyn RemoteBackend>,
    state: web::Data<LocalState>,
) -> impl Responder {
    match client_service::delete_client(backend.get_ref(), &state, &client_id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            error!("Failed to delete client: {e}");
            error_response(e)
        }
    }
}
