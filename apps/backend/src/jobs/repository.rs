use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::job::JobRow;

pub async fn insert_job(
    pool: &SqlitePool,
    job_id: Uuid,
    resume_id: Uuid,
    content: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO jobs (job_id, resume_id, content, keywords, created_at)
        VALUES (?1, ?2, ?3, NULL, ?4)
        "#,
    )
    .bind(job_id.to_string())
    .bind(resume_id.to_string())
    .bind(content)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Stores the JSON-encoded `JobKeywords` for a job.
pub async fn set_keywords(
    pool: &SqlitePool,
    job_id: Uuid,
    keywords_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET keywords = ?1 WHERE job_id = ?2")
        .bind(keywords_json)
        .bind(job_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = ?1")
        .bind(job_id.to_string())
        .fetch_optional(pool)
        .await
}

/// All jobs, or only those attached to `resume_id`. Newest first.
pub async fn list_jobs(
    pool: &SqlitePool,
    resume_id: Option<Uuid>,
) -> Result<Vec<JobRow>, sqlx::Error> {
    match resume_id {
        Some(id) => {
            sqlx::query_as::<_, JobRow>(
                "SELECT * FROM jobs WHERE resume_id = ?1 ORDER BY created_at DESC, job_id",
            )
            .bind(id.to_string())
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC, job_id")
                .fetch_all(pool)
                .await
        }
    }
}
