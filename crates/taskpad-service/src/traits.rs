use async_trait::async_trait;
use bytes::Bytes;
use taskpad_core::task::{CreateTask, ReplaceTask, Task};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<taskpad_db::DbError> for ServiceError {
    fn from(e: taskpad_db::DbError) -> Self {
        match e {
            taskpad_db::DbError::NotFound(msg) => ServiceError::NotFound(msg),
            taskpad_db::DbError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<taskpad_store::StoreError> for ServiceError {
    fn from(e: taskpad_store::StoreError) -> Self {
        match e {
            taskpad_store::StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            taskpad_store::StoreError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// An image as received from the uploader.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    /// Declared MIME type, if the uploader sent one.
    pub content_type: Option<String>,
    /// Uploader's file name. Only used to classify untyped uploads.
    pub filename: Option<String>,
}

impl ImageUpload {
    pub fn new(data: impl Into<Bytes>, content_type: &str) -> Self {
        Self {
            data: data.into(),
            content_type: Some(content_type.to_string()),
            filename: None,
        }
    }
}

/// Abstraction over the task list.
///
/// `LocalService` composes the task database and the attachment store
/// in-process. `HttpService` talks to a running taskpad-server.
///
/// `update_task` is a full replace: callers must send the complete desired
/// state (start from the last known record with `Task::to_replace`). Fields
/// left at their defaults are stored as such.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: i64) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task(&self, id: i64, input: &ReplaceTask) -> Result<Task, ServiceError>;
    async fn delete_task(&self, id: i64) -> Result<(), ServiceError>;

    // -- Attachments --

    /// Store an image and attach it to the task, returning the new reference.
    async fn upload_attachment(
        &self,
        task_id: i64,
        upload: ImageUpload,
    ) -> Result<String, ServiceError>;

    /// A fetchable URL for the task's image, or `None` when it has none.
    async fn resolve_attachment_url(&self, task_id: i64) -> Result<Option<String>, ServiceError>;
}
