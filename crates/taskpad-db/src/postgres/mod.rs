pub(crate) mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use taskpad_core::task::{CreateTask, ReplaceTask, Task};

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError::Internal.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Create a DbError::NotFound with the given entity description.
pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn create_task(&self, input: &CreateTask) -> Result<Task, DbError> {
        self.pg_create_task(input).await
    }
    async fn get_task(&self, id: i64) -> Result<Task, DbError> {
        self.pg_get_task(id).await
    }
    async fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        self.pg_list_tasks().await
    }
    async fn replace_task(&self, id: i64, input: &ReplaceTask) -> Result<Task, DbError> {
        self.pg_replace_task(id, input).await
    }
    async fn delete_task(&self, id: i64) -> Result<Task, DbError> {
        self.pg_delete_task(id).await
    }
}
