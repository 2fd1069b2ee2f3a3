//! Resume feedback: a scored critique of a resume, optionally against a job description.

use serde::{Deserialize, Serialize};

use crate::ai::prompts::{fill_prompt, system_prompt, FEEDBACK_PROMPT_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::ResumeDocument;

const MAX_STRENGTHS: usize = 5;
const MAX_IMPROVEMENTS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Improvement {
    pub section: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResumeFeedback {
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub missing_keywords: Vec<String>,
}

/// What the model returns. Scores arrive as any JSON number.
#[derive(Debug, Deserialize)]
struct RawFeedback {
    #[serde(default)]
    overall_score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<Improvement>,
    #[serde(default)]
    missing_keywords: Vec<String>,
}

pub async fn review_resume(
    resume: &ResumeDocument,
    job_description: Option<&str>,
    llm: &LlmClient,
) -> Result<ResumeFeedback, AppError> {
    let prompt = fill_prompt(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("resume", resume_as_text(resume).as_str()),
            ("job_description", job_description.unwrap_or_default()),
        ],
    );
    let raw = llm
        .call_json::<RawFeedback>(&prompt, &system_prompt())
        .await
        .map_err(|e| AppError::Llm(format!("Resume feedback failed: {e}")))?;
    Ok(normalize(raw))
}

fn normalize(raw: RawFeedback) -> ResumeFeedback {
    let score = if raw.overall_score.is_finite() {
        raw.overall_score.round().clamp(0.0, 100.0) as u8
    } else {
        0
    };
    ResumeFeedback {
        overall_score: score,
        strengths: non_empty(raw.strengths, MAX_STRENGTHS),
        improvements: raw
            .improvements
            .into_iter()
            .filter(|i| !i.suggestion.trim().is_empty())
            .take(MAX_IMPROVEMENTS)
            .collect(),
        missing_keywords: non_empty(raw.missing_keywords, usize::MAX),
    }
}

fn non_empty(items: Vec<String>, limit: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect()
}

/// Flattens a resume into plain text for prompting.
pub fn resume_as_text(resume: &ResumeDocument) -> String {
    let info = &resume.personal_info;
    let mut out = format!("Name: {}\n", info.full_name);
    if let Some(location) = &info.location {
        out.push_str(&format!("Location: {location}\n"));
    }
    if let Some(summary) = &resume.summary {
        out.push_str(&format!("\nSummary:\n{summary}\n"));
    }

    if !resume.experience.is_empty() {
        out.push_str("\nExperience:\n");
        for job in &resume.experience {
            let end = if job.current {
                "Present"
            } else {
                job.end_date.as_deref().unwrap_or_default()
            };
            out.push_str(&format!(
                "- {} at {} ({} - {})\n",
                job.title, job.company, job.start_date, end
            ));
            for bullet in &job.description {
                out.push_str(&format!("  * {bullet}\n"));
            }
        }
    }

    if !resume.education.is_empty() {
        out.push_str("\nEducation:\n");
        for school in &resume.education {
            out.push_str(&format!("- {}, {}\n", school.degree, school.institution));
        }
    }

    if !resume.projects.is_empty() {
        out.push_str("\nProjects:\n");
        for project in &resume.projects {
            out.push_str(&format!(
                "- {}: {} [{}]\n",
                project.name,
                project.description,
                project.technologies.join(", ")
            ));
        }
    }

    if !resume.skills.is_empty() {
        out.push_str("\nSkills:\n");
        for skill in &resume.skills {
            out.push_str(&format!("- {}: {}\n", skill.category, skill.items.join(", ")));
        }
    }

    if !resume.certifications.is_empty() {
        out.push_str("\nCertifications:\n");
        for cert in &resume.certifications {
            out.push_str(&format!("- {}\n", cert.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ExperienceEntry, PersonalInfo};

    fn raw(score: f64) -> RawFeedback {
        RawFeedback {
            overall_score: score,
            strengths: vec![" Clear impact ".to_string(), "".to_string()],
            improvements: vec![
                Improvement {
                    section: "summary".to_string(),
                    suggestion: "Name the target role".to_string(),
                },
                Improvement {
                    section: "skills".to_string(),
                    suggestion: "  ".to_string(),
                },
            ],
            missing_keywords: vec!["Kubernetes".to_string()],
        }
    }

    #[test]
    fn test_score_is_clamped_and_rounded() {
        assert_eq!(normalize(raw(140.0)).overall_score, 100);
        assert_eq!(normalize(raw(-3.0)).overall_score, 0);
        assert_eq!(normalize(raw(71.6)).overall_score, 72);
        assert_eq!(normalize(raw(f64::NAN)).overall_score, 0);
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let feedback = normalize(raw(50.0));
        assert_eq!(feedback.strengths, vec!["Clear impact".to_string()]);
        assert_eq!(feedback.improvements.len(), 1, "blank suggestions are noise");
        assert_eq!(feedback.missing_keywords, vec!["Kubernetes".to_string()]);
    }

    #[test]
    fn test_lenient_model_output_parses() {
        let parsed: RawFeedback =
            serde_json::from_str(r#"{"overall_score": 64, "strengths": ["ok"]}"#).unwrap();
        let feedback = normalize(parsed);
        assert_eq!(feedback.overall_score, 64);
        assert!(feedback.improvements.is_empty());
    }

    #[test]
    fn test_resume_as_text_includes_roles_in_order() {
        let doc = ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            experience: vec![
                ExperienceEntry {
                    title: "Staff Engineer".to_string(),
                    company: "Acme".to_string(),
                    current: true,
                    description: vec!["Led migration".to_string()],
                    ..Default::default()
                },
                ExperienceEntry {
                    title: "Engineer".to_string(),
                    company: "Initech".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let text = resume_as_text(&doc);

        assert!(text.starts_with("Name: Jane Doe"));
        assert!(text.contains("Staff Engineer at Acme ( - Present)"));
        assert!(text.contains("  * Led migration"));
        let acme = text.find("Acme").unwrap();
        let initech = text.find("Initech").unwrap();
        assert!(acme < initech, "entries keep the user's order");
    }
}
