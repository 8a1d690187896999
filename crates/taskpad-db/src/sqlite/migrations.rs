use rusqlite::{params, Connection};

use super::SqliteResultExt;
use crate::DbError;

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS tasks (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        title          TEXT NOT NULL CHECK(length(trim(title)) > 0),
        description    TEXT NOT NULL DEFAULT '',
        is_completed   INTEGER NOT NULL DEFAULT 0,
        image_filename TEXT,
        created_at     TEXT NOT NULL
    );",
)];

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .to_db()?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        conn.execute_batch(sql).to_db()?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![version, chrono::Utc::now()],
        )
        .to_db()?;
        tracing::debug!(version, "applied sqlite migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        let versions: i64 = conn
            .query_row("SELECT count(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, MIGRATIONS.len() as i64);
    }

    #[test]
    fn blank_title_violates_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        let res = conn.execute(
            "INSERT INTO tasks (title, created_at) VALUES ('   ', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(res.is_err());
    }
}
