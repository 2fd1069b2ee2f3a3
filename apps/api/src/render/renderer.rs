//! Renderer: resume document in, compiled PDF path out.
//!
//! Pipeline per call:
//! prepare work dir → resolve template → transform + merge → write `<job>.tex`
//! → compile → verify `<job>.pdf` exists → clean up source and auxiliary files.
//!
//! The compiler's exit code is advisory: pdflatex exits non-zero on plenty of
//! warnings while still producing a usable PDF. Only a missing PDF is a failure.
//!
//! Every render gets its own `RenderJob`, whose `Drop` removes that job's
//! source and auxiliary files on every exit path. The PDF itself is handed to
//! the caller, who owns its deletion.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::resume::ResumeDocument;
use crate::render::compiler::Compiler;
use crate::render::error::RenderError;
use crate::render::templates::{TemplateSource, TemplateStore};
use crate::render::transform::{transform, TemplateContext};

/// Files pdflatex leaves next to the PDF.
const AUX_EXTENSIONS: &[&str] = &["log", "aux", "out", "fls", "toc", "fdb_latexmk"];

/// Prefix shared by every job file; the sweeper relies on it.
pub const JOB_PREFIX: &str = "resume-";

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub template_dir: PathBuf,
    pub work_dir: PathBuf,
    pub default_template: String,
}

#[derive(Clone)]
pub struct Renderer {
    templates: TemplateStore,
    work_dir: PathBuf,
    compiler: Arc<dyn Compiler>,
}

impl Renderer {
    pub fn new(config: RenderConfig, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            templates: TemplateStore::new(config.template_dir, config.default_template),
            work_dir: config.work_dir,
            compiler,
        }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Merges the resume into its template without compiling.
    pub async fn render_source(&self, resume: &ResumeDocument) -> Result<String, RenderError> {
        let template = self.templates.resolve(resume.template_id.as_deref()).await?;
        merge(&template, &transform(resume))
    }

    /// Renders the resume to PDF and returns the absolute path of the compiled file.
    pub async fn render(&self, resume: &ResumeDocument) -> Result<PathBuf, RenderError> {
        let work_dir = self.prepare().await?;

        let template = self.templates.resolve(resume.template_id.as_deref()).await?;
        let source = merge(&template, &transform(resume))?;

        let job = RenderJob::new(&work_dir);
        debug!(
            "Render job {} using template '{}' ({}) in {}",
            job.id,
            template.id,
            template.path.display(),
            work_dir.display()
        );

        tokio::fs::write(&job.source_path, source)
            .await
            .map_err(RenderError::Workspace)?;

        let output = self.compiler.compile(&job.source_path, &work_dir).await?;
        if !output.success() {
            warn!(
                "Compiler exited with {:?} for job {}; checking for output anyway",
                output.exit_code, job.id
            );
        }

        if !is_non_empty_file(&job.output_path).await {
            return Err(RenderError::CompileFailure {
                job_id: job.id.clone(),
                exit_code: output.exit_code,
                diagnostics: output.diagnostics(),
            });
        }

        info!("Render job {} produced {}", job.id, job.output_path.display());
        Ok(job.into_output())
    }

    /// Creates the working directory if needed and returns its absolute path.
    async fn prepare(&self) -> Result<PathBuf, RenderError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(RenderError::Workspace)?;
        tokio::fs::canonicalize(&self.work_dir)
            .await
            .map_err(RenderError::Workspace)
    }
}

/// Substitutes the context into the template using `<< >>` / `<% %>` / `<# #>`
/// delimiters, which never collide with LaTeX's own braces and percent signs.
pub fn merge(template: &TemplateSource, context: &TemplateContext) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_syntax(latex_syntax()?);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    let name = format!("{}.tex", template.id);
    Ok(env.render_named_str(&name, &template.content, context)?)
}

fn latex_syntax() -> Result<SyntaxConfig, minijinja::Error> {
    SyntaxConfig::builder()
        .block_delimiters("<%", "%>")
        .variable_delimiters("<<", ">>")
        .comment_delimiters("<#", "#>")
        .build()
}

async fn is_non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

// ────────────────────────────────────────────────────────────────────────────
// RenderJob
// ────────────────────────────────────────────────────────────────────────────

/// One render's disjoint set of files in the shared working directory.
///
/// Ids combine a millisecond timestamp with a random UUID, so two renders in
/// the same millisecond still get distinct files.
#[derive(Debug)]
pub struct RenderJob {
    pub id: String,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    aux_paths: Vec<PathBuf>,
    keep_output: bool,
}

impl RenderJob {
    pub fn new(work_dir: &Path) -> Self {
        let id = new_job_id();
        let base = work_dir.join(&id);
        Self {
            source_path: base.with_extension("tex"),
            output_path: base.with_extension("pdf"),
            aux_paths: AUX_EXTENSIONS
                .iter()
                .map(|ext| base.with_extension(ext))
                .collect(),
            keep_output: false,
            id,
        }
    }

    /// Hands the PDF to the caller; the remaining files are removed on drop.
    pub fn into_output(mut self) -> PathBuf {
        self.keep_output = true;
        self.output_path.clone()
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        remove_quietly(&self.source_path);
        for path in &self.aux_paths {
            remove_quietly(path);
        }
        if !self.keep_output {
            remove_quietly(&self.output_path);
        }
    }
}

fn new_job_id() -> String {
    format!(
        "{JOB_PREFIX}{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove render artifact {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ExperienceEntry, PersonalInfo};
    use crate::render::compiler::fake::FakeCompiler;
    use tempfile::TempDir;

    const TEST_TEMPLATE: &str = r"\documentclass{article}
\begin{document}
<< name >> -- << email >>
<% if has_experience %>
<% for job in experience %>
\textbf{<< job.title >>} at << job.company >>
<% endfor %>
<% endif %>
\end{document}
";

    struct Fixture {
        _templates: TempDir,
        work: TempDir,
        renderer: Renderer,
    }

    fn fixture(compiler: Arc<dyn Compiler>) -> Fixture {
        let templates = TempDir::new().unwrap();
        std::fs::write(templates.path().join("classic.tex"), TEST_TEMPLATE).unwrap();
        let work = TempDir::new().unwrap();
        let renderer = Renderer::new(
            RenderConfig {
                template_dir: templates.path().to_path_buf(),
                work_dir: work.path().join("jobs"),
                default_template: "classic".to_string(),
            },
            compiler,
        );
        Fixture {
            _templates: templates,
            work,
            renderer,
        }
    }

    fn resume(name: &str) -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: name.to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return vec![];
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_render_success_leaves_only_pdf() {
        let compiler = FakeCompiler::new(true, 0);
        let fx = fixture(compiler.clone());

        let path = fx.renderer.render(&resume("Jane Doe")).await.unwrap();

        assert!(path.is_absolute());
        assert!(path.exists(), "returned PDF must exist");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        let remaining = files_in(&fx.work.path().join("jobs"));
        assert_eq!(remaining.len(), 1, "only the PDF may remain, found {remaining:?}");
        assert!(remaining[0].ends_with(".pdf"));
        assert_eq!(compiler.calls(), 1);
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_output_is_success() {
        let fx = fixture(FakeCompiler::new(true, 1));
        let path = fx.renderer.render(&resume("Jane Doe")).await.unwrap();
        assert!(path.exists(), "warnings exit code must not fail the render");
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_compiling() {
        let compiler = FakeCompiler::new(true, 0);
        let fx = fixture(compiler.clone());
        let mut doc = resume("Jane Doe");
        doc.template_id = Some("does-not-exist".to_string());

        let err = fx.renderer.render(&doc).await.unwrap_err();

        assert!(matches!(err, RenderError::TemplateNotFound { .. }), "got {err:?}");
        assert_eq!(compiler.calls(), 0, "compiler must not run");
        assert!(files_in(&fx.work.path().join("jobs")).is_empty(), "no job files written");
    }

    #[tokio::test]
    async fn test_missing_pdf_is_compile_failure_and_cleans_up() {
        let fx = fixture(FakeCompiler::new(false, 1));

        let err = fx.renderer.render(&resume("Jane Doe")).await.unwrap_err();

        match err {
            RenderError::CompileFailure {
                exit_code,
                diagnostics,
                job_id,
            } => {
                assert_eq!(exit_code, Some(1));
                assert!(diagnostics.contains("moderncv.cls"), "diagnostics: {diagnostics}");
                assert!(job_id.starts_with(JOB_PREFIX));
            }
            other => panic!("expected CompileFailure, got {other:?}"),
        }
        let remaining = files_in(&fx.work.path().join("jobs"));
        assert!(remaining.is_empty(), "no .tex/.log/.aux may remain, found {remaining:?}");
    }

    #[tokio::test]
    async fn test_concurrent_renders_are_isolated() {
        let fx = fixture(FakeCompiler::new(true, 0));
        let alice = resume("Alice Anders");
        let bob = resume("Bob Brown");

        let (a, b) = tokio::join!(fx.renderer.render(&alice), fx.renderer.render(&bob));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a, b, "each job needs its own output file");
        let a_body = std::fs::read_to_string(&a).unwrap();
        let b_body = std::fs::read_to_string(&b).unwrap();
        assert!(a_body.contains("Alice Anders") && !a_body.contains("Bob Brown"));
        assert!(b_body.contains("Bob Brown") && !b_body.contains("Alice Anders"));
    }

    #[tokio::test]
    async fn test_merged_source_is_sanitized() {
        let fx = fixture(FakeCompiler::new(true, 0));
        let mut doc = resume("Jane_Doe");
        doc.experience.push(ExperienceEntry {
            title: "R&D {Lead}".to_string(),
            company: "Acme".to_string(),
            ..Default::default()
        });

        let source = fx.renderer.render_source(&doc).await.unwrap();

        assert!(source.contains("Jane\\_Doe -- jane@example.com"));
        assert!(source.contains("\\textbf{R\\&D \\{Lead\\}} at Acme"));
        assert!(!source.contains("<<"), "no placeholder may survive the merge");
    }

    #[test]
    fn test_job_ids_are_unique() {
        let dir = Path::new("/tmp");
        let a = RenderJob::new(dir);
        let b = RenderJob::new(dir);
        assert_ne!(a.id, b.id);
        assert_eq!(a.source_path.extension().unwrap(), "tex");
        assert_eq!(a.output_path.file_stem(), a.source_path.file_stem());
    }

    #[test]
    fn test_dropping_job_removes_source_and_aux() {
        let dir = TempDir::new().unwrap();
        let job = RenderJob::new(dir.path());
        std::fs::write(&job.source_path, "tex").unwrap();
        std::fs::write(&job.output_path, "pdf").unwrap();
        std::fs::write(job.source_path.with_extension("log"), "log").unwrap();

        let output = job.into_output();

        assert!(output.exists(), "kept output must survive");
        assert_eq!(files_in(dir.path()).len(), 1);
    }

    #[test]
    fn test_strict_merge_rejects_unknown_placeholder() {
        let template = TemplateSource {
            id: "broken".to_string(),
            path: PathBuf::from("broken.tex"),
            content: "<< no_such_field >>".to_string(),
        };
        let err = merge(&template, &transform(&resume("Jane"))).unwrap_err();
        assert!(matches!(err, RenderError::Merge(_)));
    }

    /// The shipped templates must merge cleanly against a fully populated resume.
    #[tokio::test]
    async fn test_shipped_templates_merge() {
        let template_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let store = TemplateStore::new(&template_dir, "classic");
        let doc: ResumeDocument = serde_json::from_value(serde_json::json!({
            "personalInfo": {
                "fullName": "Jane Doe", "email": "jane@example.com", "phone": "+1 555 0100",
                "location": "Berlin", "linkedin": "linkedin.com/in/jane",
                "github": "github.com/jane_doe", "website": "jane.dev"
            },
            "summary": "Backend engineer focused on 99.9% uptime & low latency.",
            "experience": [{
                "title": "Senior Engineer", "company": "Acme", "location": "Remote",
                "startDate": "2021", "current": true,
                "description": ["Cut costs by $40k", "Led #infra guild"]
            }],
            "education": [{
                "degree": "B.Sc. CS", "institution": "TU Berlin",
                "graduationDate": "2018", "gpa": "1.3"
            }],
            "projects": [{
                "name": "vitae", "description": "Resume builder",
                "technologies": ["Rust", "LaTeX"], "link": "github.com/jane_doe/vitae"
            }],
            "skills": [{ "category": "Languages", "items": ["Rust", "C#"] }],
            "certifications": [{ "name": "CKA", "issuer": "CNCF", "date": "2022" }],
            "customization": { "accentColor": "#336699", "fontFamily": "serif" }
        }))
        .unwrap();

        let listed = store.list().await.unwrap();
        assert!(listed.len() >= 3, "expected the bundled templates, got {listed:?}");
        for descriptor in listed {
            let template = store.resolve(Some(descriptor.id.as_str())).await.unwrap();
            let source = merge(&template, &transform(&doc))
                .unwrap_or_else(|e| panic!("template {} failed to merge: {e}", descriptor.id));
            assert!(source.contains("Jane Doe"), "{} lost the name", descriptor.id);
            assert!(source.contains("C\\#"), "{} lost the skills", descriptor.id);
            assert!(source.contains("\\end{document}"), "{} is truncated", descriptor.id);
            assert!(!source.contains("<<") && !source.contains("<%"), "{} left markers", descriptor.id);
        }
    }
}
