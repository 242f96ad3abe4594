//! Evidence localization and patch validation pipeline.
//!
//! Public entry point: [`Predictor::predict`]. For one problem statement and one
//! repository directory it
//! 1. lists the repository files,
//! 2. asks the model which files to open and which strings to search for,
//! 3. extracts merged, line-numbered excerpts around every hit,
//! 4. runs a bounded generate-then-verify loop that accepts a candidate patch
//!    only when every verification judgment agrees.
//!
//! The model is reached through [`ai_llm_service::CompletionBackend`], so the
//! whole pipeline runs against any deterministic fake in tests.
//!
//! # Example
//! ```no_run
//! use std::{path::Path, sync::Arc};
//!
//! use ai_llm_service::LlmService;
//! use ai_llm_service::config::default_config::{config_from_env, sampling_from_env};
//! use patch_pipeline::{IndicatifProgress, PipelineConfig, Predictor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = LlmService::new(config_from_env()?, None)?;
//! let predictor = Predictor::new(svc, sampling_from_env()?, PipelineConfig::from_env())?
//!     .with_progress(Arc::new(IndicatifProgress::spinner()));
//!
//! let prediction = predictor.predict("TypeError when ...", Path::new("repo")).await?;
//! println!("{:?}", prediction.patch);
//! # Ok(()) }
//! ```

pub mod cfg;
pub mod controller;
pub mod error;
pub mod evidence;
pub mod generate;
pub mod indexer;
pub mod locate;
pub mod parse;
pub mod predictor;
pub mod progress;
pub mod prompt;
pub mod query;
pub mod verify;

mod llm;

#[cfg(test)]
mod testing;

pub use cfg::PipelineConfig;
pub use controller::{AttemptRecord, AttemptResult, CandidateLoop, LoopOutcome, LoopState};
pub use error::PipelineError;
pub use evidence::{FileEvidence, LineHit, Snippet};
pub use parse::{QueryError, QueryParse, extract_patch, parse_search_request};
pub use predictor::{Prediction, Predictor, StopReason};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use prompt::PromptTemplates;
pub use query::{SearchEntry, SearchRequest};
pub use verify::Verdict;
