//! Axum route handlers for the Job API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::repository::{get_job, insert_job, list_jobs, set_keywords};
use crate::matching::analyzer::JobKeywords;
use crate::models::job::JobRow;
use crate::resumes::handlers::Envelope;
use crate::resumes::repository::get_resume;
use crate::state::AppState;

/// Upper bound on job descriptions per upload request.
pub const MAX_JOBS_PER_UPLOAD: usize = 10;

#[derive(Debug, Deserialize)]
pub struct JobUploadRequest {
    pub resume_id: Uuid,
    pub job_descriptions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobUploadResponse {
    pub message: String,
    pub request_id: Uuid,
    pub job_id: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub resume_id: String,
    pub job_title: Option<String>,
    pub keywords_extracted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for JobSummary {
    fn from(row: JobRow) -> Self {
        let parsed = parse_keywords(&row);
        Self {
            job_title: parsed.as_ref().and_then(|k| k.job_title.clone()),
            keywords_extracted: parsed.is_some(),
            job_id: row.job_id,
            resume_id: row.resume_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetail {
    pub job_id: String,
    pub resume_id: String,
    pub content: String,
    pub keywords: Option<JobKeywords>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/v1/jobs/upload
///
/// Stores job descriptions against a résumé and extracts their keywords.
/// Keyword extraction is best effort and retried when the job is used.
pub async fn handle_upload(
    State(state): State<AppState>,
    AppJson(request): AppJson<JobUploadRequest>,
) -> Result<Json<JobUploadResponse>, AppError> {
    let descriptions: Vec<&str> = request
        .job_descriptions
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect();
    if descriptions.is_empty() {
        return Err(AppError::Validation(
            "job_descriptions must contain at least one non-empty description".to_string(),
        ));
    }
    if descriptions.len() > MAX_JOBS_PER_UPLOAD {
        return Err(AppError::Validation(format!(
            "At most {MAX_JOBS_PER_UPLOAD} job descriptions can be uploaded at once"
        )));
    }

    get_resume(&state.db, request.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", request.resume_id)))?;

    let analyzer = state.analyzer();
    let mut job_ids = Vec::with_capacity(descriptions.len());
    for description in descriptions {
        let job_id = Uuid::new_v4();
        insert_job(&state.db, job_id, request.resume_id, description).await?;

        match analyzer.extract_job_keywords(description).await {
            Ok(keywords) => {
                let json = serde_json::to_string(&keywords).map_err(anyhow::Error::from)?;
                set_keywords(&state.db, job_id, &json).await?;
            }
            Err(e) => warn!(%job_id, "Keyword extraction failed, will retry on use: {e}"),
        }
        job_ids.push(job_id);
    }
    info!(resume_id = %request.resume_id, count = job_ids.len(), "Stored jobs");

    Ok(Json(JobUploadResponse {
        message: "data successfully processed".to_string(),
        request_id: Uuid::new_v4(),
        job_id: job_ids,
    }))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Envelope<Vec<JobSummary>>>, AppError> {
    let jobs = list_jobs(&state.db, query.resume_id)
        .await?
        .into_iter()
        .map(JobSummary::from)
        .collect();
    Ok(Envelope::new(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Envelope<JobDetail>>, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(Envelope::new(JobDetail {
        keywords: parse_keywords(&job),
        job_id: job.job_id,
        resume_id: job.resume_id,
        content: job.content,
        created_at: job.created_at,
    }))
}

/// Stored keywords for a job, extracting and storing them first if the
/// upload-time extraction failed.
pub async fn job_keywords(
    state: &AppState,
    job: &JobRow,
    job_id: Uuid,
) -> Result<JobKeywords, AppError> {
    if let Some(keywords) = parse_keywords(job) {
        return Ok(keywords);
    }

    let keywords = state.analyzer().extract_job_keywords(&job.content).await?;
    let json = serde_json::to_string(&keywords).map_err(anyhow::Error::from)?;
    set_keywords(&state.db, job_id, &json).await?;
    Ok(keywords)
}

fn parse_keywords(job: &JobRow) -> Option<JobKeywords> {
    job.keywords
        .as_deref()
        .and_then(|k| serde_json::from_str(k).ok())
}
