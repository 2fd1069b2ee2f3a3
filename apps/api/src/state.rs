use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resumes::ResumeService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stored resumes plus the render pipeline they feed.
    pub resumes: ResumeService,
    pub llm: LlmClient,
    pub config: Config,
}
