pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/templates", get(resumes::handle_list_templates))
        // Resume API
        .route(
            "/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route("/resumes/:id/pdf", get(resumes::handle_download_pdf))
        .route("/resumes/:id/latex", get(resumes::handle_latex_source))
        .route(
            "/resumes/:id/share",
            post(resumes::handle_share).delete(resumes::handle_unshare),
        )
        // Public share links
        .route("/r/:share_id", get(resumes::handle_get_shared))
        .route("/r/:share_id/pdf", get(resumes::handle_shared_pdf))
        // AI API
        .route("/ai/feedback", post(ai::handle_feedback))
        .route("/ai/summary", post(ai::handle_summary))
        .route("/ai/bullets", post(ai::handle_bullets))
        .with_state(state)
}
