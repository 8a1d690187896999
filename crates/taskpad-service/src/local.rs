use std::sync::Arc;

use async_trait::async_trait;
use taskpad_core::task::{CreateTask, ReplaceTask, Task};
use taskpad_db::Database;
use taskpad_store::AttachmentStore;
use tracing::{info, warn};

use crate::{ImageUpload, ServiceError, TaskService};

/// In-process implementation over a `Database` and an `AttachmentStore`.
#[derive(Clone)]
pub struct LocalService {
    db: Arc<dyn Database>,
    attachments: AttachmentStore,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, attachments: AttachmentStore) -> Self {
        Self { db, attachments }
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Remove bytes nothing references any more. Failure only leaks storage.
    async fn discard_attachment(&self, reference: &str) {
        if let Err(e) = self.attachments.remove(reference).await {
            warn!(%reference, "failed to remove attachment: {e}");
        }
    }
}

#[async_trait]
impl TaskService for LocalService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.list_tasks().await?)
    }

    async fn get_task(&self, id: i64) -> Result<Task, ServiceError> {
        Ok(self.db.get_task(id).await?)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        let task = self.db.create_task(input).await?;
        info!(task_id = task.id, "created task");
        Ok(task)
    }

    async fn update_task(&self, id: i64, input: &ReplaceTask) -> Result<Task, ServiceError> {
        let current = self.db.get_task(id).await?;
        if let Some(reference) = &input.image_reference {
            // Only an upload may attach a new reference; a replace can keep or clear it.
            if current.image_reference.as_ref() != Some(reference) {
                return Err(ServiceError::InvalidInput(format!(
                    "image_filename can only be set by uploading an image: {reference}"
                )));
            }
        }
        Ok(self.db.replace_task(id, input).await?)
    }

    async fn delete_task(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self.db.delete_task(id).await?;
        info!(task_id = id, "deleted task");
        if let Some(reference) = &removed.image_reference {
            self.discard_attachment(reference).await;
        }
        Ok(())
    }

    async fn upload_attachment(
        &self,
        task_id: i64,
        upload: ImageUpload,
    ) -> Result<String, ServiceError> {
        let task = self.db.get_task(task_id).await?;
        let reference = self
            .attachments
            .store(
                upload.data,
                upload.content_type.as_deref(),
                upload.filename.as_deref(),
            )
            .await?;

        let mut desired = task.to_replace();
        desired.image_reference = Some(reference.clone());
        if let Err(e) = self.db.replace_task(task_id, &desired).await {
            // The record never saw the new reference; drop the orphaned bytes.
            self.discard_attachment(&reference).await;
            return Err(e.into());
        }
        info!(task_id, %reference, "attached image");

        if let Some(previous) = task.image_reference {
            self.discard_attachment(&previous).await;
        }
        Ok(reference)
    }

    async fn resolve_attachment_url(&self, task_id: i64) -> Result<Option<String>, ServiceError> {
        let task = self.db.get_task(task_id).await?;
        match task.image_reference {
            None => Ok(None),
            Some(reference) => Ok(self.attachments.resolve(&reference).await?),
        }
    }
}
