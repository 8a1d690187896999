pub mod attachments;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{Json, Router};
use serde_json::{json, Value};
use taskpad_service::{LocalService, ServiceError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub struct InnerAppState {
    pub service: LocalService,
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.service.attachments().max_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .merge(health::routes())
        .merge(tasks::routes())
        .merge(attachments::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let (status, msg) = match &e {
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Internal(_) => {
            tracing::error!("request failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };
    (status, Json(json!({ "error": msg })))
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    to_error(ServiceError::InvalidInput(msg.into()))
}
