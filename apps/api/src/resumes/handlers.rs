//! Axum route handlers for the Resume API.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::{ok, ApiResponse};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::resume::{ResumeDocument, ResumeRow, ResumeSummary};
use crate::render::templates::TemplateDescriptor;
use crate::resumes::service::{PdfDownload, SharedResume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Ownership scope. Authentication happens upstream; the caller passes the user id.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub resume: ResumeDocument,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub resume: ResumeDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_id: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UnshareResponse {
    pub id: Uuid,
    pub shared: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TemplateDescriptor>>>, AppError> {
    let templates = state.resumes.renderer().templates().list().await?;
    Ok(ok(templates))
}

/// POST /resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ResumeRow>>), AppError> {
    let row = state
        .resumes
        .create(&request.user_id, request.title, request.resume)
        .await?;
    Ok((StatusCode::CREATED, ok(row)))
}

/// GET /resumes?user_id=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<ResumeSummary>>>, AppError> {
    Ok(ok(state.resumes.list(&owner.user_id).await?))
}

/// GET /resumes/:id?user_id=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    Ok(ok(state.resumes.get(id, &owner.user_id).await?))
}

/// PUT /resumes/:id?user_id=
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
    AppJson(request): AppJson<UpdateResumeRequest>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    let row = state
        .resumes
        .update(id, &owner.user_id, request.title, request.resume)
        .await?;
    Ok(ok(row))
}

/// DELETE /resumes/:id?user_id=
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AppError> {
    state.resumes.delete(id, &owner.user_id).await?;
    Ok(ok(DeletedResponse { id, deleted: true }))
}

/// GET /resumes/:id/pdf?user_id=
///
/// Renders on demand. The compiled file is gone from disk by the time the bytes are sent.
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Response, AppError> {
    let row = state.resumes.get(id, &owner.user_id).await?;
    let pdf = state.resumes.render_pdf(&row).await?;
    Ok(pdf_response(pdf))
}

/// GET /resumes/:id/latex?user_id=
pub async fn handle_latex_source(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Response, AppError> {
    let row = state.resumes.get(id, &owner.user_id).await?;
    let source = state.resumes.latex_source(&row).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/x-tex; charset=utf-8")],
        source,
    )
        .into_response())
}

/// POST /resumes/:id/share?user_id=
pub async fn handle_share(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Json<ApiResponse<ShareResponse>>, AppError> {
    let share_id = state.resumes.share(id, &owner.user_id).await?;
    Ok(ok(ShareResponse {
        path: format!("/r/{share_id}"),
        share_id,
    }))
}

/// DELETE /resumes/:id/share?user_id=
pub async fn handle_unshare(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Json<ApiResponse<UnshareResponse>>, AppError> {
    state.resumes.unshare(id, &owner.user_id).await?;
    Ok(ok(UnshareResponse { id, shared: false }))
}

/// GET /r/:share_id
pub async fn handle_get_shared(
    State(state): State<AppState>,
    AppPath(share_id): AppPath<String>,
) -> Result<Json<ApiResponse<SharedResume>>, AppError> {
    let row = state.resumes.shared(&share_id).await?;
    Ok(ok(SharedResume::from(row)))
}

/// GET /r/:share_id/pdf
pub async fn handle_shared_pdf(
    State(state): State<AppState>,
    AppPath(share_id): AppPath<String>,
) -> Result<Response, AppError> {
    let row = state.resumes.shared(&share_id).await?;
    let pdf = state.resumes.render_pdf(&row).await?;
    Ok(pdf_response(pdf))
}

fn pdf_response(pdf: PdfDownload) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pdf.filename),
            ),
        ],
        pdf.bytes,
    )
        .into_response()
}
