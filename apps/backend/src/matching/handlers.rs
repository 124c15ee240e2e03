//! Stateless matching endpoints. Nothing here touches the database.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::matching::analyzer::{JobToCompare, MatchAnalysis, RankedJob};
use crate::resumes::handlers::Envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub resume_text: String,
    pub jobs: Vec<JobToCompare>,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    AppJson(request): AppJson<MatchRequest>,
) -> Result<Json<Envelope<MatchAnalysis>>, AppError> {
    let resume_text = non_empty("resume_text", &request.resume_text)?;
    let job_description = non_empty("job_description", &request.job_description)?;

    let analysis = state
        .analyzer()
        .analyze_match(resume_text, job_description)
        .await?;
    Ok(Envelope::new(analysis))
}

/// POST /api/v1/match/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    AppJson(request): AppJson<CompareRequest>,
) -> Result<Json<Envelope<Vec<RankedJob>>>, AppError> {
    let resume_text = non_empty("resume_text", &request.resume_text)?;
    if let Some(blank) = request
        .jobs
        .iter()
        .position(|j| j.description.trim().is_empty())
    {
        return Err(AppError::Validation(format!(
            "jobs[{blank}].description cannot be empty"
        )));
    }

    let ranked = state
        .analyzer()
        .compare_jobs(resume_text, &request.jobs)
        .await?;
    Ok(Envelope::new(ranked))
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}
