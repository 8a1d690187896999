use chrono::Utc;
use rusqlite::{params, Connection, Row};

use taskpad_core::task::{validate_title, CreateTask, ReplaceTask, Task};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed: row.get("is_completed")?,
        image_reference: row.get("image_filename")?,
        created_at: row.get("created_at")?,
    })
}

fn select_task(conn: &Connection, id: i64) -> Result<Task, DbError> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("task {id}")),
            other => DbError::Internal(other.to_string()),
        })
}

impl SqliteDatabase {
    pub fn create_task_sync(&self, input: &CreateTask) -> Result<Task, DbError> {
        validate_title(&input.title)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, is_completed, image_filename, created_at)
                 VALUES (?1, ?2, ?3, NULL, ?4)",
                params![input.title, input.description, input.is_completed, Utc::now()],
            )
            .to_db()?;
            select_task(conn, conn.last_insert_rowid())
        })
    }

    pub fn get_task_sync(&self, id: i64) -> Result<Task, DbError> {
        self.with_conn(|conn| select_task(conn, id))
    }

    pub fn list_tasks_sync(&self) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM tasks ORDER BY id ASC")
                .to_db()?;
            let tasks = stmt
                .query_map([], row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks)
        })
    }

    pub fn replace_task_sync(&self, id: i64, input: &ReplaceTask) -> Result<Task, DbError> {
        validate_title(&input.title)?;
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tasks
                     SET title = ?1, description = ?2, is_completed = ?3, image_filename = ?4
                     WHERE id = ?5",
                    params![
                        input.title,
                        input.description,
                        input.is_completed,
                        input.image_reference,
                        id,
                    ],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            select_task(conn, id)
        })
    }

    pub fn delete_task_sync(&self, id: i64) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let task = select_task(conn, id)?;
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])
                .to_db()?;
            Ok(task)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> SqliteDatabase {
        SqliteDatabase::open_in_memory().unwrap()
    }

    #[test]
    fn create_assigns_identity_and_defaults() {
        let db = db();
        let before = Utc::now();
        let t = db.create_task_sync(&CreateTask::new("Buy milk", "")).unwrap();
        assert_eq!(t.id, 1);
        assert_eq!(t.title, "Buy milk");
        assert_eq!(t.description, "");
        assert!(!t.is_completed);
        assert!(t.image_reference.is_none());
        assert!(t.created_at >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn blank_title_is_rejected_and_nothing_persisted() {
        let db = db();
        for title in ["", "   ", "\t\n"] {
            let err = db.create_task_sync(&CreateTask::new(title, "d")).unwrap_err();
            assert!(matches!(err, DbError::InvalidInput(_)));
        }
        assert!(db.list_tasks_sync().unwrap().is_empty());
    }

    #[test]
    fn replace_overwrites_every_mutable_field() {
        let db = db();
        let t = db.create_task_sync(&CreateTask::new("Buy milk", "")).unwrap();
        let desired = ReplaceTask {
            title: "Buy milk".into(),
            description: "2%".into(),
            is_completed: true,
            image_reference: Some("0123456789abcdef0123456789abcdef.jpg".into()),
        };
        let replaced = db.replace_task_sync(t.id, &desired).unwrap();
        assert_eq!(replaced.to_replace(), desired);
        assert_eq!(replaced.id, t.id);
        assert_eq!(replaced.created_at, t.created_at);

        // Sparse state clears what it omits.
        let sparse = ReplaceTask {
            title: "Only title".into(),
            ..Default::default()
        };
        let cleared = db.replace_task_sync(t.id, &sparse).unwrap();
        assert_eq!(cleared.description, "");
        assert!(!cleared.is_completed);
        assert!(cleared.image_reference.is_none());
    }

    #[test]
    fn failed_replace_leaves_prior_state() {
        let db = db();
        let t = db.create_task_sync(&CreateTask::new("keep", "me")).unwrap();
        let bad = ReplaceTask {
            title: "  ".into(),
            description: "lost".into(),
            ..Default::default()
        };
        assert!(matches!(
            db.replace_task_sync(t.id, &bad).unwrap_err(),
            DbError::InvalidInput(_)
        ));
        assert_eq!(db.get_task_sync(t.id).unwrap(), t);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let db = db();
        let r = ReplaceTask {
            title: "x".into(),
            ..Default::default()
        };
        assert!(matches!(db.get_task_sync(42), Err(DbError::NotFound(_))));
        assert!(matches!(db.replace_task_sync(42, &r), Err(DbError::NotFound(_))));
        assert!(matches!(db.delete_task_sync(42), Err(DbError::NotFound(_))));
    }

    #[test]
    fn delete_returns_removed_record() {
        let db = db();
        let t = db.create_task_sync(&CreateTask::new("gone", "")).unwrap();
        let removed = db.delete_task_sync(t.id).unwrap();
        assert_eq!(removed, t);
        assert!(matches!(db.get_task_sync(t.id), Err(DbError::NotFound(_))));
    }

    #[test]
    fn list_is_in_insertion_order() {
        let db = db();
        for title in ["a", "b", "c"] {
            db.create_task_sync(&CreateTask::new(title, "")).unwrap();
        }
        let titles: Vec<_> = db
            .list_tasks_sync()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }
}
