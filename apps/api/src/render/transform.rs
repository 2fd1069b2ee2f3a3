//! Data Transformer: maps a `ResumeDocument` onto the placeholders the LaTeX templates read.
//!
//! Every string that reaches a template goes through `sanitize`. Optional scalars
//! stay `None` (rendered as template `none`) when absent, so templates can tell
//! "absent" from "present but empty" with `<% if linkedin is not none %>`.

use serde::Serialize;

use crate::models::resume::{
    CertificationEntry, Customization, EducationEntry, ExperienceEntry, FontFamily,
    ProjectEntry, ResumeDocument, SkillCategory,
};
use crate::render::sanitize::{sanitize, sanitize_opt};

pub const DEFAULT_ACCENT_COLOR: &str = "2B6CB0";

/// Placeholder map handed to the template engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateContext {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,

    pub has_experience: bool,
    pub experience: Vec<ExperienceContext>,
    pub has_education: bool,
    pub education: Vec<EducationContext>,
    pub has_projects: bool,
    pub projects: Vec<ProjectContext>,
    pub has_skills: bool,
    pub skills: Vec<SkillContext>,
    pub has_certifications: bool,
    pub certifications: Vec<CertificationContext>,

    /// Six uppercase hex digits, no `#`.
    pub accent_color: String,
    /// A full preamble line, chosen from a fixed table.
    pub font_package: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExperienceContext {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EducationContext {
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub graduation_date: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectContext {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    /// `technologies` joined with ", " for templates that render them inline.
    pub technologies_inline: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkillContext {
    pub category: String,
    pub items: Vec<String>,
    pub items_inline: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CertificationContext {
    pub name: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
}

/// Builds the template context. Never fails: shape validation happens before rendering.
pub fn transform(resume: &ResumeDocument) -> TemplateContext {
    let info = &resume.personal_info;

    let experience: Vec<_> = resume.experience.iter().map(experience_context).collect();
    let education: Vec<_> = resume.education.iter().map(education_context).collect();
    let projects: Vec<_> = resume.projects.iter().map(project_context).collect();
    let skills: Vec<_> = resume.skills.iter().map(skill_context).collect();
    let certifications: Vec<_> = resume
        .certifications
        .iter()
        .map(certification_context)
        .collect();

    let customization = resume.customization.clone().unwrap_or_default();

    TemplateContext {
        name: sanitize(&info.full_name),
        email: sanitize(&info.email),
        phone: optional(info.phone.as_deref()),
        location: optional(info.location.as_deref()),
        linkedin: optional(info.linkedin.as_deref()),
        github: optional(info.github.as_deref()),
        website: optional(info.website.as_deref()),
        summary: optional(resume.summary.as_deref()),

        has_experience: !experience.is_empty(),
        experience,
        has_education: !education.is_empty(),
        education,
        has_projects: !projects.is_empty(),
        projects,
        has_skills: !skills.is_empty(),
        skills,
        has_certifications: !certifications.is_empty(),
        certifications,

        accent_color: accent_color(&customization),
        font_package: font_package(customization.font_family.unwrap_or_default()),
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(sanitize)
}

fn sanitize_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| sanitize(v)).collect()
}

fn experience_context(entry: &ExperienceEntry) -> ExperienceContext {
    let end_date = if entry.current {
        "Present".to_string()
    } else {
        sanitize_opt(entry.end_date.as_deref())
    };
    ExperienceContext {
        title: sanitize(&entry.title),
        company: sanitize(&entry.company),
        location: optional(entry.location.as_deref()),
        start_date: sanitize(&entry.start_date),
        end_date,
        current: entry.current,
        description: sanitize_all(&entry.description),
    }
}

fn education_context(entry: &EducationEntry) -> EducationContext {
    EducationContext {
        degree: sanitize(&entry.degree),
        institution: sanitize(&entry.institution),
        location: optional(entry.location.as_deref()),
        graduation_date: optional(entry.graduation_date.as_deref()),
        gpa: optional(entry.gpa.as_deref()),
    }
}

fn project_context(entry: &ProjectEntry) -> ProjectContext {
    let technologies = sanitize_all(&entry.technologies);
    ProjectContext {
        name: sanitize(&entry.name),
        description: sanitize(&entry.description),
        technologies_inline: technologies.join(", "),
        technologies,
        link: optional(entry.link.as_deref()),
    }
}

fn skill_context(entry: &SkillCategory) -> SkillContext {
    let items = sanitize_all(&entry.items);
    SkillContext {
        category: sanitize(&entry.category),
        items_inline: items.join(", "),
        items,
    }
}

fn certification_context(entry: &CertificationEntry) -> CertificationContext {
    CertificationContext {
        name: sanitize(&entry.name),
        issuer: optional(entry.issuer.as_deref()),
        date: optional(entry.date.as_deref()),
    }
}

/// Accepts `#RRGGBB` or `RRGGBB`; anything else yields the default accent.
fn accent_color(customization: &Customization) -> String {
    customization
        .accent_color
        .as_deref()
        .map(|c| c.trim().trim_start_matches('#'))
        .filter(|c| c.len() == 6 && c.chars().all(|ch| ch.is_ascii_hexdigit()))
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string())
}

fn font_package(font: FontFamily) -> &'static str {
    match font {
        FontFamily::Default => "\\usepackage{lmodern}",
        FontFamily::Serif => "\\usepackage{charter}",
        FontFamily::Sans => "\\usepackage[default]{sourcesanspro}",
        FontFamily::Mono => "\\usepackage{inconsolata}\\renewcommand{\\familydefault}{\\ttdefault}",
        FontFamily::Palatino => "\\usepackage{mathpazo}",
    }
}
