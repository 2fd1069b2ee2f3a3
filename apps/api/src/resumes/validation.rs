//! Request validation for resume documents.
//!
//! Runs before anything is stored or rendered. All violations are collected so
//! the client can fix a form in one round trip.

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::render::templates::is_valid_template_id;

const MAX_USER_ID_LEN: usize = 128;
const MAX_TITLE_LEN: usize = 200;
const MAX_SHORT_FIELD_LEN: usize = 300;
const MAX_LONG_FIELD_LEN: usize = 3000;
const MAX_SECTION_ENTRIES: usize = 50;
const MAX_ITEMS_PER_ENTRY: usize = 30;

pub fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::Validation(format!(
            "user_id must be at most {MAX_USER_ID_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a resume document, returning every violation in one error.
pub fn validate_resume(resume: &ResumeDocument) -> Result<(), AppError> {
    let mut v = Violations::default();
    let info = &resume.personal_info;

    if info.full_name.trim().is_empty() {
        v.push("personalInfo.fullName is required");
    }
    if info.email.trim().is_empty() {
        v.push("personalInfo.email is required");
    } else if !is_plausible_email(info.email.trim()) {
        v.push("personalInfo.email is not a valid email address");
    }

    v.short("personalInfo.fullName", &info.full_name);
    v.short("personalInfo.email", &info.email);
    for (field, value) in [
        ("personalInfo.phone", &info.phone),
        ("personalInfo.location", &info.location),
        ("personalInfo.linkedin", &info.linkedin),
        ("personalInfo.github", &info.github),
        ("personalInfo.website", &info.website),
    ] {
        if let Some(value) = value {
            v.short(field, value);
        }
    }
    if let Some(summary) = &resume.summary {
        v.long("summary", summary);
    }

    v.entries("experience", resume.experience.len());
    for (i, job) in resume.experience.iter().enumerate() {
        let at = format!("experience[{i}]");
        v.short(&format!("{at}.title"), &job.title);
        v.short(&format!("{at}.company"), &job.company);
        v.short(&format!("{at}.startDate"), &job.start_date);
        v.items(&format!("{at}.description"), job.description.len());
        for bullet in &job.description {
            v.long(&format!("{at}.description"), bullet);
        }
    }

    v.entries("education", resume.education.len());
    for (i, school) in resume.education.iter().enumerate() {
        let at = format!("education[{i}]");
        v.short(&format!("{at}.degree"), &school.degree);
        v.short(&format!("{at}.institution"), &school.institution);
    }

    v.entries("projects", resume.projects.len());
    for (i, project) in resume.projects.iter().enumerate() {
        let at = format!("projects[{i}]");
        v.short(&format!("{at}.name"), &project.name);
        v.long(&format!("{at}.description"), &project.description);
        v.items(&format!("{at}.technologies"), project.technologies.len());
    }

    v.entries("skills", resume.skills.len());
    for (i, skill) in resume.skills.iter().enumerate() {
        let at = format!("skills[{i}]");
        v.short(&format!("{at}.category"), &skill.category);
        v.items(&format!("{at}.items"), skill.items.len());
    }

    v.entries("certifications", resume.certifications.len());
    for (i, cert) in resume.certifications.iter().enumerate() {
        v.short(&format!("certifications[{i}].name"), &cert.name);
    }

    if let Ok(tree) = serde_json::to_value(resume) {
        v.glyphs("", &tree);
    }

    if let Some(template_id) = resume.template_id.as_deref().map(str::trim) {
        if !template_id.is_empty() && !is_valid_template_id(template_id) {
            v.push("templateId may only contain lowercase letters, digits, '-' and '_'");
        }
    }

    v.into_result()
}

/// Punctuation outside Latin-1 that the bundled templates' T1 fonts typeset.
const EXTRA_GLYPHS: &[char] = &[
    '\u{2013}', '\u{2014}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}',
    '\u{2026}', '\u{20AC}', '\u{2122}',
];

/// Whether pdflatex with `inputenc`/T1 can typeset `c`. Anything else (emoji,
/// CJK, most symbols) stops compilation.
fn is_typesettable(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r')
        || (('\u{A0}'..='\u{17E}').contains(&c) && c != '\u{149}')
        || EXTRA_GLYPHS.contains(&c)
}

/// `local@domain.tld` shape check. Deliverability is not our concern.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    fn short(&mut self, field: &str, value: &str) {
        if value.chars().count() > MAX_SHORT_FIELD_LEN {
            self.push(format!("{field} must be at most {MAX_SHORT_FIELD_LEN} characters"));
        }
    }

    fn long(&mut self, field: &str, value: &str) {
        if value.chars().count() > MAX_LONG_FIELD_LEN {
            self.push(format!("{field} must be at most {MAX_LONG_FIELD_LEN} characters"));
        }
    }

    /// Walks every string in the document and reports the first character
    /// per field that cannot be typeset.
    fn glyphs(&mut self, path: &str, value: &serde_json::Value) {
        match value {
            serde_json::Value::String(text) => {
                if let Some(c) = text.chars().find(|c| !is_typesettable(*c)) {
                    self.push(format!(
                        "{path} contains a character the PDF renderer cannot typeset: {c:?} (U+{:04X})",
                        u32::from(c)
                    ));
                }
            }
            serde_json::Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.glyphs(&format!("{path}[{i}]"), item);
                }
            }
            serde_json::Value::Object(fields) => {
                for (key, field) in fields {
                    let path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    self.glyphs(&path, field);
                }
            }
            _ => {}
        }
    }

    fn entries(&mut self, section: &str, count: usize) {
        if count > MAX_SECTION_ENTRIES {
            self.push(format!("{section} may have at most {MAX_SECTION_ENTRIES} entries"));
        }
    }

    fn items(&mut self, field: &str, count: usize) {
        if count > MAX_ITEMS_PER_ENTRY {
            self.push(format!("{field} may have at most {MAX_ITEMS_PER_ENTRY} items"));
        }
    }

    fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0.join("; ")))
        }
    }
}
