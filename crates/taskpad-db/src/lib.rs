#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use taskpad_core::task::{CreateTask, ReplaceTask, Task};
use taskpad_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

impl From<ValidationError> for DbError {
    fn from(e: ValidationError) -> Self {
        DbError::InvalidInput(e.0)
    }
}

/// The authoritative set of task records.
///
/// `replace_task` overwrites every mutable field in a single statement; it
/// either applies the whole new state or leaves the old one untouched.
#[async_trait]
pub trait Database: Send + Sync {
    async fn create_task(&self, input: &CreateTask) -> Result<Task, DbError>;
    async fn get_task(&self, id: i64) -> Result<Task, DbError>;
    /// All tasks in insertion order.
    async fn list_tasks(&self) -> Result<Vec<Task>, DbError>;
    async fn replace_task(&self, id: i64, input: &ReplaceTask) -> Result<Task, DbError>;
    /// Delete a task, returning the record as it was just before removal.
    async fn delete_task(&self, id: i64) -> Result<Task, DbError>;
}

/// Which backend to open, and where.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Postgres connection URL. Takes precedence over SQLite when set.
    pub database_url: Option<String>,
    /// SQLite file path. Defaults to `<data_dir>/taskpad.db`.
    pub sqlite_path: Option<String>,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            sqlite_path: std::env::var("TASKPAD_DB_PATH").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn is_postgres(&self) -> bool {
        self.database_url.is_some()
    }
}

/// Open the configured backend and run its migrations.
pub async fn open_database(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    if config.is_postgres() {
        #[cfg(feature = "postgres")]
        {
            let url = config.database_url.as_deref().unwrap_or_default();
            tracing::info!("using postgres database");
            return Ok(Arc::new(PostgresDatabase::connect(url).await?));
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err(DbError::Internal(
                "DATABASE_URL is set but the 'postgres' feature is not enabled".into(),
            ));
        }
    }
    #[cfg(feature = "sqlite")]
    {
        let db = SqliteDatabase::open(config)?;
        Ok(Arc::new(db))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        Err(DbError::Internal(
            "no DATABASE_URL and the 'sqlite' feature is not enabled".into(),
        ))
    }
}

/// `$XDG_DATA_HOME/taskpad`, falling back to `~/.local/share/taskpad`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("taskpad")
}
