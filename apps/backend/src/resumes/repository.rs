use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::resume::{ImprovementRow, ResumeRow, ResumeSummaryRow};

pub struct NewResume<'a> {
    pub resume_id: Uuid,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub content: &'a str,
}

pub async fn insert_resume(pool: &SqlitePool, resume: NewResume<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO resumes (resume_id, filename, content_type, content, processed, created_at)
        VALUES (?1, ?2, ?3, ?4, NULL, ?5)
        "#,
    )
    .bind(resume.resume_id.to_string())
    .bind(resume.filename)
    .bind(resume.content_type)
    .bind(resume.content)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Stores the JSON-encoded structured profile for a résumé.
pub async fn set_processed(
    pool: &SqlitePool,
    resume_id: Uuid,
    processed_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE resumes SET processed = ?1 WHERE resume_id = ?2")
        .bind(processed_json)
        .bind(resume_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_resume(pool: &SqlitePool, resume_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE resume_id = ?1")
        .bind(resume_id.to_string())
        .fetch_optional(pool)
        .await
}

/// Newest first.
pub async fn list_resumes(pool: &SqlitePool) -> Result<Vec<ResumeSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeSummaryRow>(
        r#"
        SELECT r.resume_id, r.filename, r.created_at, COUNT(j.job_id) AS job_count
        FROM resumes r
        LEFT JOIN jobs j ON j.resume_id = r.resume_id
        GROUP BY r.resume_id
        ORDER BY r.created_at DESC, r.resume_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Deletes a résumé and, via foreign keys, its jobs and improvements.
/// Returns false when nothing matched.
pub async fn delete_resume(pool: &SqlitePool, resume_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE resume_id = ?1")
        .bind(resume_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub struct NewImprovement<'a> {
    pub improvement_id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub original_score: f32,
    pub new_score: f32,
    pub updated_resume: &'a str,
    pub suggestions_json: &'a str,
}

pub async fn insert_improvement(
    pool: &SqlitePool,
    improvement: NewImprovement<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO improvements
            (improvement_id, resume_id, job_id, original_score, new_score,
             updated_resume, suggestions, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(improvement.improvement_id.to_string())
    .bind(improvement.resume_id.to_string())
    .bind(improvement.job_id.to_string())
    .bind(f64::from(improvement.original_score))
    .bind(f64::from(improvement.new_score))
    .bind(improvement.updated_resume)
    .bind(improvement.suggestions_json)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_improvements(
    pool: &SqlitePool,
    resume_id: Uuid,
) -> Result<Vec<ImprovementRow>, sqlx::Error> {
    sqlx::query_as::<_, ImprovementRow>(
        "SELECT * FROM improvements WHERE resume_id = ?1 ORDER BY created_at DESC",
    )
    .bind(resume_id.to_string())
    .fetch_all(pool)
    .await
}
