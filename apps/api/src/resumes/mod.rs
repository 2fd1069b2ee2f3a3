// Stored resumes: validation, persistence, sharing and PDF delivery.
// Rendering itself lives in `render`; this module only decides what to render for whom.

pub mod handlers;
pub mod repository;
pub mod service;
pub mod validation;

pub use repository::PgResumeRepository;
pub use service::ResumeService;
