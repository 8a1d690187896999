use chrono::{DateTime, Utc};

use taskpad_core::task::{validate_title, CreateTask, ReplaceTask, Task};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    is_completed: bool,
    image_filename: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        Task {
            id: r.id,
            title: r.title,
            description: r.description,
            is_completed: r.is_completed,
            image_reference: r.image_filename,
            created_at: r.created_at,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_create_task(&self, input: &CreateTask) -> Result<Task, DbError> {
        validate_title(&input.title)?;
        let row = sqlx::query_as::<_, TaskRow>(
            "INSERT INTO tasks (title, description, is_completed, image_filename, created_at)
             VALUES ($1, $2, $3, NULL, $4)
             RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.is_completed)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_get_task(&self, id: i64) -> Result<Task, DbError> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("task {id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let rows = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub(crate) async fn pg_replace_task(
        &self,
        id: i64,
        input: &ReplaceTask,
    ) -> Result<Task, DbError> {
        validate_title(&input.title)?;
        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET title = $1, description = $2, is_completed = $3, image_filename = $4
             WHERE id = $5
             RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.is_completed)
        .bind(&input.image_reference)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?
        .ok_or_else(|| pg_not_found(&format!("task {id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_delete_task(&self, id: i64) -> Result<Task, DbError> {
        let row = sqlx::query_as::<_, TaskRow>("DELETE FROM tasks WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("task {id}")))?;

        Ok(row.into())
    }
}
