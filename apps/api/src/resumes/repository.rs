//! Resume persistence behind the `ResumeRepository` trait.
//!
//! Every query is scoped by the owning `user_id` except the public share lookup.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumeRow};

/// The mutable part of a stored resume.
#[derive(Debug, Clone)]
pub struct ResumeDraft {
    pub title: String,
    pub template_id: String,
    pub document: ResumeDocument,
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create(&self, user_id: &str, draft: ResumeDraft) -> Result<ResumeRow, AppError>;

    async fn get(&self, id: Uuid, user_id: &str) -> Result<Option<ResumeRow>, AppError>;

    /// Most recently updated first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ResumeRow>, AppError>;

    async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        draft: ResumeDraft,
    ) -> Result<Option<ResumeRow>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, AppError>;

    /// Stores `candidate` as the share id unless one is already set, in a single
    /// write. The returned row carries whichever id won.
    async fn ensure_share(
        &self,
        id: Uuid,
        user_id: &str,
        candidate: &str,
    ) -> Result<Option<ResumeRow>, AppError>;

    async fn clear_share(&self, id: Uuid, user_id: &str) -> Result<Option<ResumeRow>, AppError>;

    async fn get_by_share_id(&self, share_id: &str) -> Result<Option<ResumeRow>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgResumeRepository: production store, document kept as JSONB
// ────────────────────────────────────────────────────────────────────────────

pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn create(&self, user_id: &str, draft: ResumeDraft) -> Result<ResumeRow, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, title, template_id, document)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.template_id)
        .bind(Json(&draft.document))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid, user_id: &str) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ResumeRow>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        draft: ResumeDraft,
    ) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET title = $3, template_id = $4, document = $5, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.template_id)
        .bind(Json(&draft.document))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ensure_share(
        &self,
        id: Uuid,
        user_id: &str,
        candidate: &str,
    ) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET share_id = COALESCE(share_id, $3),
                updated_at = CASE WHEN share_id IS NULL THEN now() ELSE updated_at END
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(candidate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn clear_share(&self, id: Uuid, user_id: &str) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET share_id = NULL, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_by_share_id(&self, share_id: &str) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE share_id = $1")
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryResumeRepository: test double
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub use memory::InMemoryResumeRepository;
