//! Writing helpers: professional summary drafting and experience bullet rewriting.

use serde::Deserialize;
use tracing::debug;

use crate::ai::feedback::resume_as_text;
use crate::ai::prompts::{
    fill_prompt, system_prompt, BULLETS_PROMPT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::ResumeDocument;

pub const MAX_BULLETS: usize = 6;

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct BulletsOutput {
    #[serde(default)]
    bullets: Vec<String>,
}

/// Input for a bullet rewrite.
#[derive(Debug, Clone, Deserialize)]
pub struct BulletsRequest {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

pub async fn generate_summary(
    resume: &ResumeDocument,
    job_description: Option<&str>,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let prompt = fill_prompt(
        SUMMARY_PROMPT_TEMPLATE,
        &[
            ("resume", resume_as_text(resume).as_str()),
            ("job_description", job_description.unwrap_or_default()),
        ],
    );
    let output = llm
        .call_json::<SummaryOutput>(&prompt, &system_prompt())
        .await
        .map_err(|e| AppError::Llm(format!("Summary generation failed: {e}")))?;
    clean_summary(&output.summary)
}

pub async fn rewrite_bullets(
    request: &BulletsRequest,
    llm: &LlmClient,
) -> Result<Vec<String>, AppError> {
    let current = request
        .bullets
        .iter()
        .map(|b| format!("- {b}"))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = fill_prompt(
        BULLETS_PROMPT_TEMPLATE,
        &[
            ("title", request.title.as_str()),
            ("company", request.company.as_str()),
            ("bullets", current.as_str()),
            (
                "job_description",
                request.job_description.as_deref().unwrap_or_default(),
            ),
        ],
    );
    let output = llm
        .call_json::<BulletsOutput>(&prompt, &system_prompt())
        .await
        .map_err(|e| AppError::Llm(format!("Bullet rewrite failed: {e}")))?;
    debug!("Model returned {} bullets", output.bullets.len());
    clean_bullets(output.bullets)
}

fn clean_summary(summary: &str) -> Result<String, AppError> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(AppError::Llm("Model returned an empty summary".to_string()));
    }
    Ok(summary.to_string())
}

/// Trims, strips list markers the model sometimes adds, and caps the count.
fn clean_bullets(bullets: Vec<String>) -> Result<Vec<String>, AppError> {
    let cleaned: Vec<String> = bullets
        .iter()
        .map(|b| b.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|b| !b.is_empty())
        .take(MAX_BULLETS)
        .collect();
    if cleaned.is_empty() {
        return Err(AppError::Llm("Model returned no bullets".to_string()));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_is_trimmed() {
        assert_eq!(
            clean_summary("  Backend engineer.\n").unwrap(),
            "Backend engineer."
        );
    }

    #[test]
    fn test_blank_summary_is_an_llm_error() {
        assert!(matches!(clean_summary(" \n "), Err(AppError::Llm(_))));
    }

    #[test]
    fn test_bullets_are_capped_and_cleaned() {
        let raw: Vec<String> = (1..=9).map(|i| format!("- Shipped feature {i}")).collect();
        let bullets = clean_bullets(raw).unwrap();
        assert_eq!(bullets.len(), MAX_BULLETS);
        assert_eq!(bullets[0], "Shipped feature 1");
    }

    #[test]
    fn test_empty_bullets_are_an_llm_error() {
        let err = clean_bullets(vec!["  ".to_string(), "•".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_bullets_request_defaults() {
        let req: BulletsRequest =
            serde_json::from_value(serde_json::json!({ "title": "Engineer" })).unwrap();
        assert!(req.bullets.is_empty());
        assert!(req.job_description.is_none());
    }
}
