pub mod batch;
pub mod config;
pub mod errors;
pub mod materializer;
pub mod optimizer;
pub mod perception;

use std::path::PathBuf;
use std::sync::Arc;

use crate::batch::{BatchOrchestrator, FsArtifactSink};
use crate::config::AppConfig;
use crate::errors::{ForgeError, ForgeResult};
use crate::optimizer::{Catalogue, Optimizer};
use crate::perception::job_file::JsonJobSource;

/// Command-line entry: `uiforge <job.json>`, or the job named by `UIFORGE_JOB`.
pub fn run() -> ForgeResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config; using built-in defaults");
            config::parse_config("")?
        }
    };

    let job_path = job_path_from(std::env::args().nth(1))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_job_file(cfg, job_path))
}

async fn run_job_file(cfg: AppConfig, job_path: PathBuf) -> ForgeResult<()> {
    let catalogue = Arc::new(Catalogue::with_overrides(&cfg.catalogue));
    let optimizer = Optimizer::new(catalogue, cfg.optimizer.clone());
    let sink = Arc::new(FsArtifactSink::new(cfg.output.clone()));
    let orchestrator = BatchOrchestrator::new(optimizer, sink);

    let report = orchestrator.run(&JsonJobSource::new(job_path)).await?;
    tracing::info!(
        job_id = %report.job_id,
        output = %cfg.output.directory.join(&report.job_id).display(),
        fallbacks = report.fallbacks,
        mean_quality = report.mean_quality,
        "job written"
    );
    Ok(())
}

fn job_path_from(arg: Option<String>) -> ForgeResult<PathBuf> {
    arg.filter(|a| !a.trim().is_empty())
        .or_else(|| std::env::var("UIFORGE_JOB").ok().filter(|v| !v.trim().is_empty()))
        .map(PathBuf::from)
        .ok_or_else(|| ForgeError::Config("usage: uiforge <job.json> (or set UIFORGE_JOB)".into()))
}
