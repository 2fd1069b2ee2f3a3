use std::io;

use thiserror::Error;

/// Failures of the PDF pipeline. Cleanup failures never appear here: they are logged and dropped.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template '{template_id}' not found")]
    TemplateNotFound { template_id: String },

    #[error("Failed to read template '{template_id}': {source}")]
    TemplateRead {
        template_id: String,
        #[source]
        source: io::Error,
    },

    #[error("Template merge failed: {0}")]
    Merge(#[from] minijinja::Error),

    #[error("Render workspace error: {0}")]
    Workspace(#[source] io::Error),

    #[error("LaTeX compiler could not be started: {0}")]
    CompilerUnavailable(#[source] io::Error),

    #[error("LaTeX compiler timed out after {seconds}s")]
    CompileTimeout { seconds: u64 },

    #[error("LaTeX compilation produced no PDF for job {job_id} (exit code {exit_code:?}):\n{diagnostics}")]
    CompileFailure {
        job_id: String,
        exit_code: Option<i32>,
        diagnostics: String,
    },
}
