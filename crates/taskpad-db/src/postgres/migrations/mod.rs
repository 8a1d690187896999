use sqlx::PgPool;

use crate::DbError;

/// Arbitrary but fixed key for the Postgres advisory lock that serialises
/// migration runs so concurrent connections don't race.
const MIGRATION_LOCK_KEY: i64 = 0x7461736B_70616430; // "taskpad0" as hex

const V1_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id             BIGSERIAL PRIMARY KEY,
    title          TEXT NOT NULL CHECK (length(btrim(title)) > 0),
    description    TEXT NOT NULL DEFAULT '',
    is_completed   BOOLEAN NOT NULL DEFAULT FALSE,
    image_filename TEXT,
    created_at     TIMESTAMPTZ NOT NULL
);
INSERT INTO schema_version (version, applied_at) VALUES (1, now());
";

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Session-level advisory lock; only one connection migrates at a time.
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(pool)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    let result = run_inner(pool).await;

    // Always release the advisory lock, even on error.
    let _ = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(pool)
        .await;

    result
}

async fn run_inner(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| DbError::Internal(e.to_string()))?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    if current < 1 {
        sqlx::raw_sql(V1_INITIAL)
            .execute(pool)
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?;
        tracing::info!("applied postgres migration v1");
    }

    Ok(())
}
