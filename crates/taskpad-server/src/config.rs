use std::net::SocketAddr;

use clap::Parser;
use taskpad_core::attachment::MAX_ATTACHMENT_BYTES;
use taskpad_db::DbConfig;
use taskpad_store::{StoreConfig, DEFAULT_URL_EXPIRY_SECS};

#[derive(Debug, Clone, Parser)]
#[command(name = "taskpad-server", about = "Task list REST server")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "TASKPAD_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "TASKPAD_PORT", default_value = "3710")]
    pub port: u16,

    /// SQLite database file (ignored when DATABASE_URL is set)
    #[arg(long, env = "TASKPAD_DB_PATH")]
    pub db_path: Option<String>,

    /// Postgres connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory for attachments when no S3 bucket is configured
    #[arg(long, env = "TASKPAD_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Externally reachable base URL of this server, used in attachment URLs.
    /// Defaults to http://127.0.0.1:<port>.
    #[arg(long, env = "TASKPAD_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Largest accepted image, in bytes
    #[arg(long, env = "TASKPAD_MAX_UPLOAD_BYTES", default_value_t = MAX_ATTACHMENT_BYTES)]
    pub max_upload_bytes: usize,

    /// Lifetime of presigned attachment URLs (seconds)
    #[arg(long, env = "TASKPAD_URL_EXPIRY", default_value_t = DEFAULT_URL_EXPIRY_SECS)]
    pub url_expiry: u32,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(SocketAddr::new(self.bind.parse()?, self.port))
    }

    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.port),
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone().filter(|s| !s.is_empty()),
            sqlite_path: self.db_path.clone(),
        }
    }

    /// S3 settings come from the environment; local storage is served by
    /// this server under `/api/attachments`.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            local_data_dir: self.data_dir.clone(),
            local_public_url: Some(format!("{}/api", self.public_url())),
            url_expiry_secs: Some(self.url_expiry),
            ..StoreConfig::from_env()
        }
    }
}
