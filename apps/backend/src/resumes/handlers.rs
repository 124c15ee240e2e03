//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{extract_text, validate_upload, DocumentKind};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::handlers::{job_keywords, JobSummary};
use crate::jobs::repository::{get_job, list_jobs};
use crate::matching::analyzer::Suggestion;
use crate::models::resume::{ImprovementRow, ResumeSummaryRow};
use crate::resumes::repository::{
    delete_resume, get_resume, insert_improvement, insert_resume, list_improvements,
    list_resumes, set_processed, NewImprovement, NewResume,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub request_id: Uuid,
    pub resume_id: Uuid,
    pub processed: bool,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub request_id: Uuid,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            request_id: Uuid::new_v4(),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeDetail {
    pub resume_id: String,
    pub filename: String,
    pub content_type: String,
    pub content: String,
    pub processed: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub jobs: Vec<JobSummary>,
    pub improvements: Vec<ImprovementSummary>,
}

#[derive(Debug, Serialize)]
pub struct ImprovementSummary {
    pub improvement_id: String,
    pub job_id: String,
    pub original_score: f64,
    pub new_score: f64,
    pub updated_resume: String,
    pub suggestions: Vec<Suggestion>,
    pub created_at: DateTime<Utc>,
}

impl From<ImprovementRow> for ImprovementSummary {
    fn from(row: ImprovementRow) -> Self {
        let suggestions = serde_json::from_str(&row.suggestions).unwrap_or_else(|e| {
            warn!(improvement_id = %row.improvement_id, "Stored suggestions are not valid JSON: {e}");
            Vec::new()
        });
        Self {
            improvement_id: row.improvement_id,
            job_id: row.job_id,
            original_score: row.original_score,
            new_score: row.new_score,
            updated_resume: row.updated_resume,
            suggestions,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub improvement_id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub original_score: f32,
    pub new_score: f32,
    pub updated_resume: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub attempts: u32,
}

struct UploadedFile {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Multipart upload (field `file`) of a PDF or DOCX résumé. The extracted text
/// is stored immediately; the structured profile is best effort.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let file = read_file_field(multipart?).await?;

    let kind = validate_upload(
        file.filename.as_deref(),
        file.content_type.as_deref(),
        file.bytes.len(),
        state.config.max_upload_bytes,
    )?;

    let bytes = file.bytes.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let resume_id = Uuid::new_v4();
    let filename = file
        .filename
        .unwrap_or_else(|| default_filename(kind).to_string());
    insert_resume(
        &state.db,
        NewResume {
            resume_id,
            filename: &filename,
            content_type: kind.mime(),
            content: &text,
        },
    )
    .await?;
    info!(%resume_id, %filename, chars = text.len(), "Stored resume");

    let processed = match state.analyzer().extract_resume_profile(&text).await {
        Ok(profile) => {
            let json = serde_json::to_string(&profile).map_err(anyhow::Error::from)?;
            set_processed(&state.db, resume_id, &json).await?;
            true
        }
        Err(e) => {
            warn!(%resume_id, "Structured extraction failed, keeping raw text only: {e}");
            false
        }
    };

    Ok(Json(UploadResponse {
        message: format!("File {filename} successfully processed as resume"),
        request_id: Uuid::new_v4(),
        resume_id,
        processed,
    }))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ResumeSummaryRow>>>, AppError> {
    Ok(Envelope::new(list_resumes(&state.db).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Envelope<ResumeDetail>>, AppError> {
    let resume = get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let jobs = list_jobs(&state.db, Some(resume_id))
        .await?
        .into_iter()
        .map(JobSummary::from)
        .collect();
    let improvements = list_improvements(&state.db, resume_id)
        .await?
        .into_iter()
        .map(ImprovementSummary::from)
        .collect();

    let processed = resume
        .processed
        .as_deref()
        .and_then(|p| serde_json::from_str(p).ok());

    Ok(Envelope::new(ResumeDetail {
        resume_id: resume.resume_id,
        filename: resume.filename,
        content_type: resume.content_type,
        content: resume.content,
        processed,
        created_at: resume.created_at,
        jobs,
        improvements,
    }))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !delete_resume(&state.db, resume_id).await? {
        return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
    }
    info!(%resume_id, "Deleted resume");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/improve
///
/// Rewrites a stored résumé towards one of its stored jobs and records the result.
pub async fn handle_improve(
    State(state): State<AppState>,
    AppJson(request): AppJson<ImproveRequest>,
) -> Result<Json<Envelope<ImproveResponse>>, AppError> {
    let resume = get_resume(&state.db, request.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", request.resume_id)))?;
    let job = get_job(&state.db, request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;
    if job.resume_id != resume.resume_id {
        return Err(AppError::Validation(format!(
            "Job {} does not belong to resume {}",
            request.job_id, request.resume_id
        )));
    }

    let keywords = job_keywords(&state, &job, request.job_id).await?;
    let outcome = state
        .analyzer()
        .improve_resume(&resume.content, &keywords.all_keywords())
        .await?;

    let improvement_id = Uuid::new_v4();
    let suggestions_json =
        serde_json::to_string(&outcome.suggestions).map_err(anyhow::Error::from)?;
    insert_improvement(
        &state.db,
        NewImprovement {
            improvement_id,
            resume_id: request.resume_id,
            job_id: request.job_id,
            original_score: outcome.original_score,
            new_score: outcome.new_score,
            updated_resume: &outcome.updated_resume,
            suggestions_json: &suggestions_json,
        },
    )
    .await?;
    info!(
        %improvement_id,
        original = outcome.original_score,
        new = outcome.new_score,
        "Stored resume improvement"
    );

    Ok(Envelope::new(ImproveResponse {
        improvement_id,
        resume_id: request.resume_id,
        job_id: request.job_id,
        original_score: outcome.original_score,
        new_score: outcome.new_score,
        updated_resume: outcome.updated_resume,
        missing_keywords: outcome.missing_keywords,
        suggestions: outcome.suggestions,
        attempts: outcome.attempts,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the `file` field; other fields are ignored.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    Err(AppError::UnprocessableEntity(
        "Field required: file".to_string(),
    ))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::UnprocessableEntity(e.body_text())
    }
}

fn default_filename(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "resume.pdf",
        DocumentKind::Docx => "resume.docx",
    }
}
