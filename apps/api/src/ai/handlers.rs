//! Axum route handlers for the AI API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::ai::feedback::{review_resume, ResumeFeedback};
use crate::ai::writer::{generate_summary, rewrite_bullets, BulletsRequest};
use crate::envelope::{ok, ApiResponse};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::resume::ResumeDocument;
use crate::resumes::validation::validate_resume;
use crate::state::AppState;

const MAX_JOB_DESCRIPTION_LEN: usize = 20_000;

#[derive(Debug, Deserialize)]
pub struct ResumeAssistRequest {
    pub resume: ResumeDocument,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct BulletsResponse {
    pub bullets: Vec<String>,
}

/// POST /ai/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResumeAssistRequest>,
) -> Result<Json<ApiResponse<ResumeFeedback>>, AppError> {
    validate_resume(&request.resume)?;
    let jd = job_description(request.job_description.as_deref())?;
    let feedback = review_resume(&request.resume, jd, &state.llm).await?;
    Ok(ok(feedback))
}

/// POST /ai/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResumeAssistRequest>,
) -> Result<Json<ApiResponse<SummaryResponse>>, AppError> {
    validate_resume(&request.resume)?;
    let jd = job_description(request.job_description.as_deref())?;
    let summary = generate_summary(&request.resume, jd, &state.llm).await?;
    Ok(ok(SummaryResponse { summary }))
}

/// POST /ai/bullets
pub async fn handle_bullets(
    State(state): State<AppState>,
    AppJson(request): AppJson<BulletsRequest>,
) -> Result<Json<ApiResponse<BulletsResponse>>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    job_description(request.job_description.as_deref())?;
    let bullets = rewrite_bullets(&request, &state.llm).await?;
    Ok(ok(BulletsResponse { bullets }))
}

/// Blank descriptions count as absent.
fn job_description(jd: Option<&str>) -> Result<Option<&str>, AppError> {
    match jd.map(str::trim) {
        Some(jd) if jd.chars().count() > MAX_JOB_DESCRIPTION_LEN => Err(AppError::Validation(
            format!("job_description must be at most {MAX_JOB_DESCRIPTION_LEN} characters"),
        )),
        Some(jd) if !jd.is_empty() => Ok(Some(jd)),
        _ => Ok(None),
    }
}
