pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use taskpad_service::LocalService;
use taskpad_store::AttachmentStore;
use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use routes::{build_router, AppState, InnerAppState};

/// Open the configured database and object store.
pub async fn open_service(config: &ServerConfig) -> Result<LocalService> {
    let db = taskpad_db::open_database(&config.db_config()).await?;
    let objects = taskpad_store::create_store(&config.store_config())?;
    let attachments = AttachmentStore::with_max_bytes(objects, config.max_upload_bytes);
    Ok(LocalService::new(db, attachments))
}

pub async fn serve(listener: TcpListener, service: LocalService) -> Result<()> {
    let state = Arc::new(InnerAppState { service });
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
