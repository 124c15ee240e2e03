use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        resume_id TEXT PRIMARY KEY,
        filename TEXT NOT NULL,
        content_type TEXT NOT NULL,
        content TEXT NOT NULL,
        processed TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        job_id TEXT PRIMARY KEY,
        resume_id TEXT NOT NULL REFERENCES resumes(resume_id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        keywords TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_resume_id ON jobs(resume_id)",
    r#"
    CREATE TABLE IF NOT EXISTS improvements (
        improvement_id TEXT PRIMARY KEY,
        resume_id TEXT NOT NULL REFERENCES resumes(resume_id) ON DELETE CASCADE,
        job_id TEXT NOT NULL REFERENCES jobs(job_id) ON DELETE CASCADE,
        original_score REAL NOT NULL,
        new_score REAL NOT NULL,
        updated_resume TEXT NOT NULL,
        suggestions TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_improvements_job_id ON improvements(job_id)",
];

/// Creates the SQLite pool (creating the file if needed) and bootstraps the schema.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open SQLite database")?;

    migrate(&pool).await?;

    info!("SQLite pool established");
    Ok(pool)
}

/// Idempotent schema bootstrap.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Schema migration failed")?;
    }
    Ok(())
}

/// True when the database answers a trivial query.
pub async fn is_reachable(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Fresh file-backed database for unit tests. Keep the `TempDir` alive for
/// as long as the pool is used.
#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = create_pool(&url).await.expect("test pool");
    (dir, pool)
}
