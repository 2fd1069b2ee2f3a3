// LLM prompt constants for the AI module.
// Templates carry `{placeholder}` markers filled by `fill_prompt` before sending.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt shared by every AI endpoint.
pub fn system_prompt() -> String {
    format!(
        "You are an experienced technical recruiter and resume editor. \
        You give concrete, specific advice and never invent experience the candidate does not have. {JSON_ONLY_SYSTEM}"
    )
}

/// Feedback prompt. Replace `{resume}` and `{job_description}`.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Review the resume below.

RESUME:
{resume}

TARGET JOB DESCRIPTION (may be empty):
{job_description}

Return a JSON object with this EXACT schema:
{
  "overall_score": 72,
  "strengths": ["Clear, quantified impact in the most recent role"],
  "improvements": [
    {"section": "experience", "suggestion": "Lead bullets with the outcome, not the task"}
  ],
  "missing_keywords": ["Kubernetes"]
}

Rules:
- overall_score is an integer from 0 to 100.
- section is one of: personal_info, summary, experience, education, projects, skills, certifications.
- missing_keywords lists terms from the job description that the resume never mentions. Use [] when no job description is given.
- At most 5 strengths and 8 improvements."#;

/// Summary prompt. Replace `{resume}` and `{job_description}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a professional summary for the resume below.

RESUME:
{resume}

TARGET JOB DESCRIPTION (may be empty):
{job_description}

Return a JSON object with this EXACT schema:
{"summary": "Backend engineer with 6 years ..."}

Rules:
- 2 to 4 sentences, third person implied (no "I").
- Only use facts present in the resume."#;

/// Bullet rewrite prompt. Replace `{title}`, `{company}`, `{bullets}` and `{job_description}`.
pub const BULLETS_PROMPT_TEMPLATE: &str = r#"Rewrite the resume bullets for this role.

ROLE: {title} at {company}

CURRENT BULLETS:
{bullets}

TARGET JOB DESCRIPTION (may be empty):
{job_description}

Return a JSON object with this EXACT schema:
{"bullets": ["Cut p99 latency 40% by ..."]}

Rules:
- Start each bullet with a strong past-tense verb.
- Keep every number the candidate gave; never invent metrics.
- Return between 3 and 6 bullets.
- If no current bullets are given, draft bullets typical for the role and keep them modest."#;

/// Fills `{name}` placeholders in one pass over the template.
///
/// Substituted text is never scanned again, so user input that happens to
/// contain `{company}` or `{job_description}` stays literal. Braces that do not
/// name a known placeholder (the JSON schema examples) are copied through.
pub fn fill_prompt(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
