// PDF rendering pipeline: sanitize → transform → template merge → pdflatex → cleanup.
// The compiler sits behind the `Compiler` trait so the pipeline runs without TeX in tests.

pub mod compiler;
pub mod error;
pub mod renderer;
pub mod sanitize;
pub mod sweep;
pub mod templates;
pub mod transform;

pub use compiler::LatexCompiler;
pub use error::RenderError;
pub use renderer::{RenderConfig, Renderer};
