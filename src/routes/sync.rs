use actix_web::{HttpResponse, Responder, get, post, web};

use crate::dto::api::{RefreshResponse, SyncStatusResponse};
use crate::sync::SyncController;

#[get("/v1/sync")]
pub async fn api_sync_status(controller: web::Data<SyncController>) -> impl Responder {
    HttpResponse::Ok().json(SyncStatusResponse {
        state: controller.status(),
        last_synced_at: controller.last_synced(),
        applied_seq: controller.applied_seq(),
    })
}

/// Manual refresh: the same full fetch the poll timer runs, plus a re-probe
/// when the session started disconnected.
#[post("/v1/sync/refresh")]
pub async fn api_refresh(controller: web::Data<SyncController>) -> impl Responder {
    let outcome = controller.refresh().await;
    HttpResponse::Ok().json(RefreshResponse { outcome })
}
