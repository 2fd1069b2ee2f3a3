//! Compiler seam: the only place the render pipeline touches an external process.
//!
//! `Renderer` holds an `Arc<dyn Compiler>`. Production uses `LatexCompiler`;
//! tests substitute a fake that writes (or omits) the PDF.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::render::error::RenderError;

/// Lines of compiler output kept for diagnostics. pdflatex reports the
/// actual error near the end of its transcript.
const DIAGNOSTIC_TAIL_LINES: usize = 40;

/// Result of one compiler run. The exit code is advisory only.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The trailing part of the combined compiler output.
    pub fn diagnostics(&self) -> String {
        let combined = format!("{}\n{}", self.stdout, self.stderr);
        let lines: Vec<&str> = combined.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
        lines[start..].join("\n")
    }
}

#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compiles `source` and writes all output files into `out_dir`.
    async fn compile(&self, source: &Path, out_dir: &Path) -> Result<CompileOutput, RenderError>;
}

/// Runs `pdflatex` (or a compatible engine) non-interactively.
#[derive(Debug, Clone)]
pub struct LatexCompiler {
    program: PathBuf,
    timeout: Duration,
}

impl LatexCompiler {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, source: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-no-shell-escape")
            .arg(format!("-output-directory={}", out_dir.display()))
            .arg(source)
            .current_dir(out_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Compiler for LatexCompiler {
    async fn compile(&self, source: &Path, out_dir: &Path) -> Result<CompileOutput, RenderError> {
        let started_at = Instant::now();
        let child = self
            .command(source, out_dir)
            .spawn()
            .map_err(RenderError::CompilerUnavailable)?;

        // Dropping the future on timeout drops the child, and kill_on_drop reaps it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(RenderError::CompilerUnavailable)?,
            Err(_) => {
                warn!(
                    "LaTeX compiler exceeded {}s on {}, killed",
                    self.timeout.as_secs(),
                    source.display()
                );
                return Err(RenderError::CompileTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let result = CompileOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "LaTeX compiler finished in {}ms with exit code {:?}",
            started_at.elapsed().as_millis(),
            result.exit_code
        );
        Ok(result)
    }
}
