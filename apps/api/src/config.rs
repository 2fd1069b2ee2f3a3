use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::render::RenderConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_COMPILER: &str = "pdflatex";
const DEFAULT_TEMPLATE: &str = "classic";
const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OUTPUT_MAX_AGE_SECS: u64 = 900;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub latex_compiler: PathBuf,
    pub template_dir: PathBuf,
    pub render_work_dir: PathBuf,
    pub default_template: String,
    pub compile_timeout: Duration,
    pub output_max_age: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            latex_compiler: optional_env("LATEX_COMPILER")
                .unwrap_or_else(|| DEFAULT_COMPILER.to_string())
                .into(),
            template_dir: optional_env("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")),
            render_work_dir: optional_env("RENDER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("vitae-render")),
            default_template: optional_env("DEFAULT_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            compile_timeout: Duration::from_secs(parse_env(
                "COMPILE_TIMEOUT_SECS",
                DEFAULT_COMPILE_TIMEOUT_SECS,
            )?),
            output_max_age: Duration::from_secs(parse_env(
                "OUTPUT_MAX_AGE_SECS",
                DEFAULT_OUTPUT_MAX_AGE_SECS,
            )?),
        };
        config.check_render_limits()?;
        Ok(config)
    }

    /// The compile timeout is non-zero and output outlives the longest compile,
    /// so the sweeper never takes a PDF that is still waiting to be sent.
    fn check_render_limits(&self) -> Result<()> {
        if self.compile_timeout.is_zero() {
            bail!("COMPILE_TIMEOUT_SECS must be greater than 0");
        }
        if self.output_max_age <= self.compile_timeout {
            bail!(
                "OUTPUT_MAX_AGE_SECS ({}) must be greater than COMPILE_TIMEOUT_SECS ({})",
                self.output_max_age.as_secs(),
                self.compile_timeout.as_secs()
            );
        }
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            template_dir: self.template_dir.clone(),
            work_dir: self.render_work_dir.clone(),
            default_template: self.default_template.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are treated alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
