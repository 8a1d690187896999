use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use taskpad_core::attachment::{ImageUrl, UploadedImage};
use taskpad_core::task::{CreateTask, ReplaceTask, Task};

use crate::{ImageUpload, ServiceError, TaskService};

/// Async HTTP client implementation of TaskService.
/// Connects to a running taskpad-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    error_from_body(status, body)
}

fn error_from_body(status: StatusCode, body: String) -> ServiceError {
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl TaskService for HttpService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.get_json("/api/tasks").await
    }

    async fn get_task(&self, id: i64) -> Result<Task, ServiceError> {
        self.get_json(&format!("/api/tasks/{id}")).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.post_json("/api/tasks", input).await
    }

    async fn update_task(&self, id: i64, input: &ReplaceTask) -> Result<Task, ServiceError> {
        self.put_json(&format!("/api/tasks/{id}"), input).await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/tasks/{id}")).await
    }

    async fn upload_attachment(
        &self,
        task_id: i64,
        upload: ImageUpload,
    ) -> Result<String, ServiceError> {
        let mut part = Part::bytes(upload.data.to_vec())
            .file_name(upload.filename.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| ServiceError::InvalidInput(format!("bad content type: {e}")))?;
        }
        let form = Form::new().part("image", part);

        let resp = self
            .client
            .post(format!(
                "{}/api/tasks/{task_id}/upload_image",
                self.base_url
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let uploaded: UploadedImage = handle_response(resp).await?;
        Ok(uploaded.filename)
    }

    async fn resolve_attachment_url(&self, task_id: i64) -> Result<Option<String>, ServiceError> {
        let resolved: ImageUrl = self
            .get_json(&format!("/api/tasks/{task_id}/image_url"))
            .await?;
        Ok(resolved.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_extracted() {
        let err = error_from_body(
            StatusCode::NOT_FOUND,
            r#"{"error":"task 3 not found"}"#.to_string(),
        );
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "task 3 not found"));

        let err = error_from_body(StatusCode::BAD_REQUEST, "plain text".to_string());
        assert!(matches!(err, ServiceError::InvalidInput(ref m) if m == "plain text"));

        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpService::new("http://localhost:3710/");
        assert_eq!(svc.base_url(), "http://localhost:3710");
    }
}
