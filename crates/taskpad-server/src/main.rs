use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use taskpad_server::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.addr()?;
    let service = taskpad_server::open_service(&config).await?;

    let listener = TcpListener::bind(addr).await?;
    info!("taskpad-server listening on http://{addr}");
    info!("attachment URLs use {}", config.public_url());

    taskpad_server::serve(listener, service).await
}
