use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// The structured resume record composed by the client.
///
/// Field names follow the client's camelCase JSON. List order is the order the
/// user arranged entries in and is preserved all the way into the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub customization: Option<Customization>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Current positions render "Present" instead of an end date.
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub graduation_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    /// Hex color such as `#2B6CB0`. Anything else falls back to the template default.
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<FontFamily>,
}

/// Closed set of font choices. Each maps to a fixed LaTeX preamble line, so
/// no user text ever reaches the preamble.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Default,
    Serif,
    Sans,
    Mono,
    Palatino,
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub template_id: String,
    pub share_id: Option<String>,
    pub document: Json<ResumeDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight listing view, with per-section counts computed from the document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub title: String,
    pub template_id: String,
    pub shared: bool,
    pub section_counts: SectionCounts,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SectionCounts {
    pub experience: usize,
    pub education: usize,
    pub projects: usize,
    pub skills: usize,
    pub certifications: usize,
}

impl SectionCounts {
    pub fn of(document: &ResumeDocument) -> Self {
        Self {
            experience: document.experience.len(),
            education: document.education.len(),
            projects: document.projects.len(),
            skills: document.skills.len(),
            certifications: document.certifications.len(),
        }
    }
}

impl From<&ResumeRow> for ResumeSummary {
    fn from(row: &ResumeRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            template_id: row.template_id.clone(),
            shared: row.share_id.is_some(),
            section_counts: SectionCounts::of(&row.document),
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_deserializes_with_defaults() {
        let json = serde_json::json!({
            "personalInfo": { "fullName": "Jane Doe", "email": "jane@example.com" }
        });
        let doc: ResumeDocument = serde_json::from_value(json).unwrap();

        assert_eq!(doc.personal_info.full_name, "Jane Doe");
        assert!(doc.experience.is_empty());
        assert!(doc.template_id.is_none());
        assert!(doc.customization.is_none());
    }

    #[test]
    fn test_font_family_uses_snake_case() {
        let c: Customization =
            serde_json::from_value(serde_json::json!({ "fontFamily": "palatino" })).unwrap();
        assert_eq!(c.font_family, Some(FontFamily::Palatino));
    }

    #[test]
    fn test_unknown_font_family_is_rejected() {
        let result: Result<Customization, _> =
            serde_json::from_value(serde_json::json!({ "fontFamily": "\\input{/etc/passwd}" }));
        assert!(result.is_err(), "font family must be a closed set");
    }

    #[test]
    fn test_section_counts() {
        let doc = ResumeDocument {
            experience: vec![ExperienceEntry::default(), ExperienceEntry::default()],
            skills: vec![SkillCategory::default()],
            ..Default::default()
        };
        let counts = SectionCounts::of(&doc);
        assert_eq!(counts.experience, 2);
        assert_eq!(counts.skills, 1);
        assert_eq!(counts.education, 0);
    }
}
