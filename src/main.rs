use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use ai_llm_service::LlmService;
use ai_llm_service::config::default_config::{
    config_from_env, max_concurrency_from_env, sampling_from_env,
};
use ai_llm_service::telemetry;
use clap::{ArgGroup, Parser};
use patch_pipeline::{IndicatifProgress, PipelineConfig, Predictor};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_TARGETS: &[&str] = &[telemetry::TARGET_PREFIX, "patch_pipeline", "chainpatch"];

/// Localize the root cause of a problem in a repository and produce a
/// verified patch.
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(group(ArgGroup::new("problem_source").required(true).args(["problem", "problem_file"])))]
struct Args {
    /// Repository directory (already extracted).
    #[arg(long)]
    repo: PathBuf,

    /// Problem statement text.
    #[arg(long)]
    problem: Option<String>,

    /// File holding the problem statement.
    #[arg(long)]
    problem_file: Option<PathBuf>,

    /// Write the accepted patch here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log pipeline internals at DEBUG.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Optional: configuration may come from the real environment only.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", LOG_TARGETS, level))
        .with(telemetry::layer(LOG_TARGETS))
        .init();

    let problem = match (&args.problem, &args.problem_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => return Err("one of --problem or --problem-file is required".into()),
    };

    let svc = LlmService::new(config_from_env()?, max_concurrency_from_env()?)?;
    let predictor = Predictor::new(svc, sampling_from_env()?, PipelineConfig::from_env())?
        .with_progress(Arc::new(IndicatifProgress::spinner()));

    let prediction = predictor.predict(&problem, &args.repo).await?;
    info!(
        stop = ?prediction.stop,
        attempts = prediction.attempts.len(),
        "run finished"
    );

    match (prediction.patch, args.out) {
        (Some(patch), Some(out)) => {
            fs::write(&out, &patch)?;
            println!("Patch written to {}", out.display());
        }
        (Some(patch), None) => println!("{patch}"),
        (None, _) => println!("No valid patch generated."),
    }
    Ok(())
}
