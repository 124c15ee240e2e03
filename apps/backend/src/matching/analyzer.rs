//! Résumé / job analysis pipeline.
//!
//! Every step is one provider request. The local pieces (keyword coverage,
//! cosine similarity, ATS checks) run on the provider's output.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill, json_prompt, GROUNDING_INSTRUCTION};
use crate::llm_client::{complete_json, CompletionProvider, EmbeddingProvider};
use crate::matching::ats::{ats_checks, AtsReport};
use crate::matching::coverage::{keyword_coverage, CoverageReport};
use crate::matching::prompts::{
    COMPARE_JOBS_PROMPT, IMPROVE_RESUME_PROMPT, JOB_KEYWORDS_PROMPT, MATCH_ANALYSIS_PROMPT,
    RESUME_STRUCTURE_PROMPT, SUGGESTIONS_PROMPT,
};
use crate::matching::similarity::{cosine_similarity, similarity_percent};

/// Rewrites requested before giving up on beating the original score.
pub const MAX_IMPROVEMENT_ATTEMPTS: u32 = 5;
/// Upper bound on jobs in a single comparison request.
pub const MAX_COMPARED_JOBS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// LLM output models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobKeywords {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub keywords: Vec<String>,
}

impl JobKeywords {
    /// Keywords first, then required and preferred skills, without
    /// case-insensitive duplicates.
    pub fn all_keywords(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.keywords
            .iter()
            .chain(&self.required_skills)
            .chain(&self.preferred_skills)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmAssessment {
    #[serde(deserialize_with = "lenient_number")]
    pub match_percentage: f32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_optional_number")]
    pub ats_score: Option<f32>,
    pub ats_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: String,
    #[serde(default)]
    pub line_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SuggestionList {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ComparedJob {
    index: usize,
    #[serde(deserialize_with = "lenient_number")]
    match_percentage: f32,
    fit_summary: String,
    improvements: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparisonList {
    jobs: Vec<ComparedJob>,
}

/// Accepts `72`, `72.5`, `"72"` or `"72%"`; anything else becomes 0.
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
    Ok(lenient_optional_number(d)?.unwrap_or(0.0))
}

fn lenient_optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f32>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(|f| f as f32),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MatchAnalysis {
    /// Embedding cosine similarity between résumé and job text, as 0–100.
    pub similarity_score: f32,
    pub coverage: CoverageReport,
    pub job_keywords: JobKeywords,
    pub llm_analysis: LlmAssessment,
    pub ats_tips: AtsReport,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementOutcome {
    pub original_score: f32,
    pub new_score: f32,
    pub updated_resume: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobToCompare {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub rank: usize,
    pub title: String,
    pub similarity_score: f32,
    pub match_percentage: f32,
    pub fit_summary: String,
    pub improvements: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct Analyzer<'a> {
    llm: &'a dyn CompletionProvider,
    embedder: &'a dyn EmbeddingProvider,
}

impl<'a> Analyzer<'a> {
    pub fn new(llm: &'a dyn CompletionProvider, embedder: &'a dyn EmbeddingProvider) -> Self {
        Self { llm, embedder }
    }

    pub async fn extract_resume_profile(&self, resume_text: &str) -> Result<ResumeProfile, AppError> {
        let prompt = json_prompt(&fill(RESUME_STRUCTURE_PROMPT, &[("resume_text", resume_text)]));
        complete_json(self.llm, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Resume extraction failed: {e}")))
    }

    pub async fn extract_job_keywords(&self, job_text: &str) -> Result<JobKeywords, AppError> {
        let prompt = json_prompt(&fill(JOB_KEYWORDS_PROMPT, &[("job_text", job_text)]));
        complete_json(self.llm, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Job keyword extraction failed: {e}")))
    }

    /// Cosine similarity between two texts via the embedding provider.
    pub async fn similarity(&self, left: &str, right: &str) -> Result<f32, AppError> {
        let (a, b) = tokio::try_join!(self.embedder.embed(left), self.embedder.embed(right))?;
        cosine_similarity(&a, &b).map_err(|e| AppError::Llm(e.to_string()))
    }

    /// Full match report: similarity, keyword gaps, LLM assessment, ATS tips.
    pub async fn analyze_match(
        &self,
        resume_text: &str,
        job_text: &str,
    ) -> Result<MatchAnalysis, AppError> {
        let job_keywords = self.extract_job_keywords(job_text).await?;
        let coverage = keyword_coverage(resume_text, &job_keywords.all_keywords());
        let similarity = self.similarity(resume_text, job_text).await?;

        let missing = if coverage.missing_keywords.is_empty() {
            "none".to_string()
        } else {
            coverage.missing_keywords.join(", ")
        };
        let prompt = json_prompt(&fill(
            MATCH_ANALYSIS_PROMPT,
            &[
                ("grounding_instruction", GROUNDING_INSTRUCTION),
                ("missing_keywords", &missing),
                ("resume_text", resume_text),
                ("job_text", job_text),
            ],
        ));
        let mut llm_analysis: LlmAssessment = complete_json(self.llm, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Match analysis failed: {e}")))?;
        llm_analysis.match_percentage = llm_analysis.match_percentage.clamp(0.0, 100.0);
        llm_analysis.ats_score = llm_analysis.ats_score.map(|s| s.clamp(1.0, 10.0));

        info!(
            similarity = similarity,
            coverage = coverage.score,
            match_percentage = llm_analysis.match_percentage,
            "Match analysis complete"
        );

        Ok(MatchAnalysis {
            similarity_score: similarity_percent(similarity),
            coverage,
            job_keywords,
            llm_analysis,
            ats_tips: ats_checks(resume_text),
            model: self.llm.model().to_string(),
        })
    }

    /// Asks the LLM for rewrites until one scores higher than the original
    /// against the job keywords, up to `MAX_IMPROVEMENT_ATTEMPTS`.
    pub async fn improve_resume(
        &self,
        resume_text: &str,
        job_keywords: &[String],
    ) -> Result<ImprovementOutcome, AppError> {
        if job_keywords.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "No keywords were extracted for this job; cannot score an improvement".to_string(),
            ));
        }

        let keywords_joined = job_keywords.join(", ");
        let (resume_vec, job_vec) = tokio::try_join!(
            self.embedder.embed(resume_text),
            self.embedder.embed(&keywords_joined)
        )?;
        let original = cosine_similarity(&resume_vec, &job_vec)
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let coverage = keyword_coverage(resume_text, job_keywords);
        let missing = if coverage.missing_keywords.is_empty() {
            "none".to_string()
        } else {
            coverage.missing_keywords.join(", ")
        };
        let current_score = format!("{:.4}", original);
        let prompt = fill(
            IMPROVE_RESUME_PROMPT,
            &[
                ("grounding_instruction", GROUNDING_INSTRUCTION),
                ("current_score", &current_score),
                ("job_keywords", &keywords_joined),
                ("missing_keywords", &missing),
                ("resume_text", resume_text),
            ],
        );

        let mut best: Option<(f32, String)> = None;
        let mut attempts = 0;
        for attempt in 1..=MAX_IMPROVEMENT_ATTEMPTS {
            attempts = attempt;
            let candidate = self.llm.complete(&prompt).await?;
            let candidate = strip_markdown_fence(&candidate);
            if candidate.is_empty() {
                warn!(attempt, "LLM returned an empty rewrite");
                continue;
            }

            let candidate_vec = self.embedder.embed(candidate).await?;
            let score = cosine_similarity(&candidate_vec, &job_vec)
                .map_err(|e| AppError::Llm(e.to_string()))?;
            debug!(attempt, original, score, "Scored rewrite");

            if score > original {
                best = Some((score, candidate.to_string()));
                break;
            }
        }

        let (new_score, updated_resume) = match best {
            Some(found) => found,
            None => {
                info!(attempts, "No rewrite beat the original score; returning the original");
                (original, resume_text.to_string())
            }
        };

        let suggestions = if updated_resume == resume_text {
            Vec::new()
        } else {
            self.suggestions(resume_text, &updated_resume, &keywords_joined)
                .await
        };

        Ok(ImprovementOutcome {
            original_score: similarity_percent(original),
            new_score: similarity_percent(new_score),
            updated_resume,
            missing_keywords: coverage.missing_keywords,
            suggestions,
            attempts,
        })
    }

    /// Line-level suggestions. Best effort: a malformed reply yields none.
    async fn suggestions(&self, original: &str, updated: &str, keywords: &str) -> Vec<Suggestion> {
        let numbered: String = original
            .lines()
            .enumerate()
            .map(|(i, l)| format!("{}: {l}\n", i + 1))
            .collect();
        let prompt = json_prompt(&fill(
            SUGGESTIONS_PROMPT,
            &[
                ("job_keywords", keywords),
                ("original_resume", &numbered),
                ("updated_resume", updated),
            ],
        ));
        match complete_json::<SuggestionList>(self.llm, &prompt).await {
            Ok(list) => list
                .suggestions
                .into_iter()
                .filter(|s| !s.suggestion.trim().is_empty())
                .collect(),
            Err(e) => {
                warn!("Suggestion extraction failed: {e}");
                Vec::new()
            }
        }
    }

    /// Ranks jobs by embedding similarity to the résumé, annotated with LLM commentary.
    pub async fn compare_jobs(
        &self,
        resume_text: &str,
        jobs: &[JobToCompare],
    ) -> Result<Vec<RankedJob>, AppError> {
        if jobs.is_empty() {
            return Err(AppError::Validation("jobs cannot be empty".to_string()));
        }
        if jobs.len() > MAX_COMPARED_JOBS {
            return Err(AppError::Validation(format!(
                "At most {MAX_COMPARED_JOBS} jobs can be compared at once"
            )));
        }

        let resume_vec = self.embedder.embed(resume_text).await?;
        let mut similarities = Vec::with_capacity(jobs.len());
        for job in jobs {
            let job_vec = self.embedder.embed(&job.description).await?;
            let s = cosine_similarity(&resume_vec, &job_vec)
                .map_err(|e| AppError::Llm(e.to_string()))?;
            similarities.push(s);
        }

        let listing: String = jobs
            .iter()
            .enumerate()
            .map(|(i, j)| format!("JOB {} - {}:\n{}\n\n", i + 1, j.title, j.description))
            .collect();
        let prompt = json_prompt(&fill(
            COMPARE_JOBS_PROMPT,
            &[("resume_text", resume_text), ("jobs", &listing)],
        ));
        let comparison: ComparisonList = complete_json(self.llm, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Job comparison failed: {e}")))?;

        Ok(rank_jobs(jobs, &similarities, comparison.jobs))
    }
}

/// Merges similarities with LLM commentary (matched by 1-based index) and
/// sorts best-first. Ties on similarity fall back to the LLM percentage.
fn rank_jobs(jobs: &[JobToCompare], similarities: &[f32], commentary: Vec<ComparedJob>) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = jobs
        .iter()
        .zip(similarities)
        .enumerate()
        .map(|(i, (job, &similarity))| {
            let notes = commentary
                .iter()
                .find(|c| c.index == i + 1)
                .cloned()
                .unwrap_or_default();
            RankedJob {
                rank: 0,
                title: job.title.clone(),
                similarity_score: similarity_percent(similarity),
                match_percentage: notes.match_percentage.clamp(0.0, 100.0),
                fit_summary: notes.fit_summary,
                improvements: notes.improvements,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then(b.match_percentage.total_cmp(&a.match_percentage))
    });
    for (i, job) in ranked.iter_mut().enumerate() {
        job.rank = i + 1;
    }
    ranked
}

/// Removes a surrounding ``` fence (with any language tag) from LLM output.
fn strip_markdown_fence(text: &str) -> &str {
    let text = text.trim();
    match text.strip_prefix("```") {
        Some(rest) => {
            let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
            body.trim_end()
                .strip_suffix("```")
                .unwrap_or(body)
                .trim()
        }
        None => text,
    }
}
