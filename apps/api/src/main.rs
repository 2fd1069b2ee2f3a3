mod ai;
mod config;
mod db;
mod envelope;
mod errors;
mod extract;
mod llm_client;
mod models;
mod render;
mod resumes;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::render::sweep::spawn_sweeper;
use crate::render::{LatexCompiler, Renderer};
use crate::resumes::{PgResumeRepository, ResumeService};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let repo = Arc::new(PgResumeRepository::new(db));

    // Initialize render pipeline
    let compiler = Arc::new(LatexCompiler::new(
        config.latex_compiler.clone(),
        config.compile_timeout,
    ));
    let renderer = Renderer::new(config.render_config(), compiler);
    info!(
        "Renderer ready: compiler={}, templates={}, work_dir={}",
        config.latex_compiler.display(),
        config.template_dir.display(),
        config.render_work_dir.display()
    );

    // Orphaned PDFs are swept at a quarter of their max age
    let sweep_interval = (config.output_max_age / 4).max(Duration::from_secs(1));
    let _sweeper = spawn_sweeper(
        config.render_work_dir.clone(),
        sweep_interval,
        config.output_max_age,
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        resumes: ResumeService::new(repo, renderer),
        llm,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
