//! Resume Service: validation, persistence and PDF delivery for stored resumes.
//!
//! PDFs are read into memory and their file deleted before the bytes are
//! returned, so the render working directory only holds in-flight jobs.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumeRow, ResumeSummary};
use crate::render::Renderer;
use crate::resumes::repository::{ResumeDraft, ResumeRepository};
use crate::resumes::validation::{validate_resume, validate_title, validate_user_id};

/// A compiled resume ready to be sent as a download.
#[derive(Debug)]
pub struct PdfDownload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Public view of a shared resume. Owner identity is never exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedResume {
    pub title: String,
    pub template_id: String,
    pub resume: ResumeDocument,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for SharedResume {
    fn from(row: ResumeRow) -> Self {
        Self {
            title: row.title,
            template_id: row.template_id,
            resume: row.document.0,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ResumeService {
    repo: Arc<dyn ResumeRepository>,
    renderer: Renderer,
}

impl ResumeService {
    pub fn new(repo: Arc<dyn ResumeRepository>, renderer: Renderer) -> Self {
        Self { repo, renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub async fn create(
        &self,
        user_id: &str,
        title: Option<String>,
        resume: ResumeDocument,
    ) -> Result<ResumeRow, AppError> {
        validate_user_id(user_id)?;
        let draft = self.draft(title, resume)?;
        let row = self.repo.create(user_id.trim(), draft).await?;
        info!("Created resume {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    pub async fn get(&self, id: Uuid, user_id: &str) -> Result<ResumeRow, AppError> {
        validate_user_id(user_id)?;
        self.repo
            .get(id, user_id.trim())
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<ResumeSummary>, AppError> {
        validate_user_id(user_id)?;
        let rows = self.repo.list_for_user(user_id.trim()).await?;
        Ok(rows.iter().map(ResumeSummary::from).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        title: Option<String>,
        resume: ResumeDocument,
    ) -> Result<ResumeRow, AppError> {
        validate_user_id(user_id)?;
        let draft = self.draft(title, resume)?;
        self.repo
            .update(id, user_id.trim(), draft)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        validate_user_id(user_id)?;
        if !self.repo.delete(id, user_id.trim()).await? {
            return Err(not_found(id));
        }
        info!("Deleted resume {id}");
        Ok(())
    }

    /// Enables the public link, keeping an existing share id stable.
    pub async fn share(&self, id: Uuid, user_id: &str) -> Result<String, AppError> {
        validate_user_id(user_id)?;
        let candidate = Uuid::new_v4().simple().to_string();
        let row = self
            .repo
            .ensure_share(id, user_id.trim(), &candidate)
            .await?
            .ok_or_else(|| not_found(id))?;
        let share_id = row.share_id.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Resume {id} has no share id after sharing"))
        })?;
        if share_id == candidate {
            info!("Resume {id} shared as {share_id}");
        }
        Ok(share_id)
    }

    pub async fn unshare(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        validate_user_id(user_id)?;
        self.repo
            .clear_share(id, user_id.trim())
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(())
    }

    pub async fn shared(&self, share_id: &str) -> Result<ResumeRow, AppError> {
        self.repo
            .get_by_share_id(share_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shared resume {share_id} not found")))
    }

    /// Merged LaTeX source for preview; nothing is compiled.
    pub async fn latex_source(&self, row: &ResumeRow) -> Result<String, AppError> {
        Ok(self.renderer.render_source(&row.document).await?)
    }

    pub async fn render_pdf(&self, row: &ResumeRow) -> Result<PdfDownload, AppError> {
        let path = self.renderer.render(&row.document).await?;
        let bytes = read_and_remove(&path).await?;
        Ok(PdfDownload {
            filename: pdf_filename(&row.document.personal_info.full_name),
            bytes,
        })
    }

    /// Pins the effective template id into the document, so a later change of
    /// the default template does not change how stored resumes render.
    fn draft(
        &self,
        title: Option<String>,
        mut resume: ResumeDocument,
    ) -> Result<ResumeDraft, AppError> {
        validate_resume(&resume)?;
        let title = match title.map(|t| t.trim().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => format!("{} Resume", resume.personal_info.full_name.trim()),
        };
        validate_title(&title)?;
        let template_id = match resume.template_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.renderer.templates().default_id().to_string(),
        };
        resume.template_id = Some(template_id.clone());
        Ok(ResumeDraft {
            title,
            template_id,
            document: resume,
        })
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

/// Reads the compiled PDF and deletes it whether or not the read succeeded.
async fn read_and_remove(path: &Path) -> Result<Bytes, AppError> {
    let bytes = tokio::fs::read(path).await;
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove delivered PDF {}: {e}", path.display());
    }
    bytes
        .map(Bytes::from)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to read compiled PDF: {e}")))
}

/// `Jane Doe` → `Jane_Doe_Resume.pdf`. Only ASCII alphanumerics survive.
pub fn pdf_filename(full_name: &str) -> String {
    let stem = full_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "Resume.pdf".to_string()
    } else {
        format!("{stem}_Resume.pdf")
    }
}
