use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use taskpad_service::ServiceError;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/attachments/{reference}", get(download))
}

/// Serves attachments kept on the local filesystem. S3-backed deployments
/// hand out presigned URLs instead, but the route works for both.
async fn download(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, ApiError> {
    match state.service.attachments().load(&reference).await {
        Ok(Some((data, kind))) => {
            Ok(([(header::CONTENT_TYPE, kind.content_type())], data).into_response())
        }
        Ok(None) => Err(to_error(ServiceError::NotFound(format!(
            "attachment {reference}"
        )))),
        Err(e) => Err(to_error(e.into())),
    }
}
