use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Job description attached to a résumé.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub job_id: String,
    pub resume_id: String,
    pub content: String,
    /// JSON-encoded `JobKeywords`; null until extraction succeeds.
    pub keywords: Option<String>,
    pub created_at: DateTime<Utc>,
}
