//! JSON API surface. Handlers stay thin: deserialize, call the service
//! layer, map the error.

use actix_web::HttpResponse;

use crate::backend::BackendError;
use crate::dto::api::ErrorResponse;
use crate::services::ServiceError;

pub mod case;
pub mod client;
pub mod document;
pub mod serve;
pub mod sync;

pub(crate) fn error_response(err: ServiceError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match &err {
        ServiceError::NotFound | ServiceError::Backend(BackendError::NotFound) => {
            HttpResponse::NotFound().json(body)
        }
        ServiceError::Form(_) => HttpResponse::BadRequest().json(body),
        ServiceError::Backend(BackendError::Unreachable(_)) => {
            HttpResponse::ServiceUnavailable().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}
