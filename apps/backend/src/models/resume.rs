use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Uploaded résumé with its extracted text and optional LLM-structured profile.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub resume_id: String,
    pub filename: String,
    pub content_type: String,
    pub content: String,
    /// JSON-encoded `ResumeProfile`.
    pub processed: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeSummaryRow {
    pub resume_id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub job_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ImprovementRow {
    pub improvement_id: String,
    pub resume_id: String,
    pub job_id: String,
    pub original_score: f64,
    pub new_score: f64,
    pub updated_resume: String,
    /// JSON-encoded `Vec<Suggestion>`.
    pub suggestions: String,
    pub created_at: DateTime<Utc>,
}
