//! ServeTracker: process-serving case management fronting a hosted
//! document/file/function backend, with a local SQLite mirror that keeps the
//! client and serve-attempt views usable when the backend is unreachable.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use tera::Tera;

use crate::backend::{HttpBackend, RemoteBackend};
use crate::db::establish_connection_pool;
use crate::mailer::Mailer;
use crate::mirror::MirrorStore;
use crate::models::config::ServerConfig;
use crate::routes::case::{api_create_case, api_delete_case, api_list_cases, api_update_case};
use crate::routes::client::{
    api_create_client, api_delete_client, api_get_client, api_list_clients, api_update_client,
};
use crate::routes::document::{
    api_delete_document, api_document_url, api_list_documents, api_upload_document,
};
use crate::routes::serve::{api_create_serve, api_delete_serve, api_list_serves, api_update_serve};
use crate::routes::sync::{api_refresh, api_sync_status};
use crate::state::LocalState;
use crate::sync::SyncController;

pub mod backend;
pub mod db;
#[cfg(feature = "diagnostics")]
pub mod diag;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod mailer;
pub mod mirror;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
pub mod sync;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite mirror and make sure the
    // mirror table exists before anything reads it.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    mirror::run_migrations(&pool)
        .map_err(|e| std::io::Error::other(format!("Failed to prepare mirror database: {e}")))?;

    let state = Arc::new(LocalState::new(MirrorStore::new(pool)));

    let backend: Arc<dyn RemoteBackend> = Arc::new(
        HttpBackend::new(server_config.backend.clone())
            .map_err(|e| std::io::Error::other(format!("Invalid backend configuration: {e}")))?,
    );

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;
    let mailer = Mailer::new(Arc::new(tera), server_config.notify_address.clone());

    let controller = Arc::new(SyncController::new(
        Arc::clone(&backend),
        Arc::clone(&state),
        Duration::from_secs(server_config.poll_interval_secs),
    ));
    controller.bootstrap().await;
    let poll_handle = controller.spawn_polling();

    let backend_data: web::Data<dyn RemoteBackend> = web::Data::from(Arc::clone(&backend));
    let state_data = web::Data::from(Arc::clone(&state));
    let controller_data = web::Data::from(Arc::clone(&controller));

    let bind_address = (server_config.address.clone(), server_config.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api")
                    .service(api_list_clients)
                    .service(api_get_client)
                    .service(api_create_client)
                    .service(api_update_client)
                    .service(api_delete_client)
                    .service(api_list_cases)
                    .service(api_create_case)
                    .service(api_update_case)
                    .service(api_delete_case)
                    .service(api_list_serves)
                    .service(api_create_serve)
                    .service(api_update_serve)
                    .service(api_delete_serve)
                    .service(api_list_documents)
                    .service(api_upload_document)
                    .service(api_document_url)
                    .service(api_delete_document)
                    .service(api_sync_status)
                    .service(api_refresh),
            )
            .app_data(backend_data.clone())
            .app_data(state_data.clone())
            .app_data(controller_data.clone())
            .app_data(web::Data::new(mailer.clone()))
    })
    .bind(bind_address)?
    .run();

    let result = server.await;
    // The poll loop dies with the server.
    if let Some(handle) = poll_handle {
        handle.abort();
    }
    result
}
