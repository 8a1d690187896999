use std::sync::Arc;

use axum::Router;
use taskpad_service::LocalService;
use taskpad_store::{AttachmentStore, LocalStore, StoreConfig};
use tokio::net::TcpListener;

use crate::routes::{build_router, InnerAppState};

pub const BOUNDARY: &str = "taskpad-test-boundary";

/// A service over in-memory SQLite and a temp local store whose URLs are
/// rooted at `public_url`.
pub fn test_service(public_url: &str, max_bytes: usize) -> LocalService {
    let db = Arc::new(taskpad_db::SqliteDatabase::open_in_memory().unwrap());
    let store_config = StoreConfig {
        local_data_dir: Some(
            tempfile::tempdir()
                .unwrap()
                .keep()
                .to_string_lossy()
                .to_string(),
        ),
        local_public_url: Some(format!("{public_url}/api")),
        ..Default::default()
    };
    let objects = Arc::new(LocalStore::new(&store_config));
    LocalService::new(db, AttachmentStore::with_max_bytes(objects, max_bytes))
}

/// Build a test router with in-memory SQLite and a temp local store.
pub async fn test_router() -> Router {
    test_router_with_limit(taskpad_core::attachment::MAX_ATTACHMENT_BYTES).await
}

pub async fn test_router_with_limit(max_bytes: usize) -> Router {
    let service = test_service("http://test.local", max_bytes);
    build_router(Arc::new(InnerAppState { service }))
}

/// A single-field multipart body delimited by `BOUNDARY`.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Attachment URLs it hands
/// out point back at the server itself.
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let service = test_service(&base_url, taskpad_core::attachment::MAX_ATTACHMENT_BYTES);
    let app = build_router(Arc::new(InnerAppState { service }));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
