use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use taskpad_core::attachment::{ImageUrl, UploadedImage};
use taskpad_core::task::{CreateTask, ReplaceTask, Task};
use taskpad_service::{ImageUpload, TaskService};

use super::{bad_request, to_error, ApiError, AppState};

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/upload_image", post(upload_image))
        .route("/api/tasks/{id}/image_url", get(image_url))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| bad_request(e.body_text()))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    state
        .service
        .list_tasks()
        .await
        .map(Json)
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    state
        .service
        .get_task(id)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let input = json_body(body)?;
    state
        .service
        .create_task(&input)
        .await
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<ReplaceTask>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let input = json_body(body)?;
    state
        .service
        .update_task(id, &input)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_task(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>, ApiError> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("invalid image field: {e}")))?;
        upload = Some(ImageUpload {
            data,
            content_type,
            filename,
        });
    }

    let upload =
        upload.ok_or_else(|| bad_request(format!("multipart field '{IMAGE_FIELD}' is required")))?;
    state
        .service
        .upload_attachment(id, upload)
        .await
        .map(|filename| Json(UploadedImage { filename }))
        .map_err(to_error)
}

async fn image_url(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ImageUrl>, ApiError> {
    state
        .service
        .resolve_attachment_url(id)
        .await
        .map(|url| Json(ImageUrl { url }))
        .map_err(to_error)
}
