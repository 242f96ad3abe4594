//! Completion backend used by the patch pipeline.
//!
//! The pipeline treats the language model as a black box with a single batched
//! operation: submit N prompts with one [`SamplingConfig`], get back N completions
//! in submission order, or nothing at all. [`CompletionBackend`] is that seam;
//! [`LlmService`] implements it over the configured provider (Ollama or an
//! OpenAI-compatible API).
//!
//! # Example
//! ```no_run
//! use ai_llm_service::{CompletionBackend, LlmService};
//! use ai_llm_service::config::default_config::{config_from_env, sampling_from_env};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = LlmService::new(config_from_env()?, Some(4))?;
//! let sampling = sampling_from_env()?;
//! let out = svc.generate(&["Say hi".to_string()], &sampling).await?;
//! println!("{}", out[0]);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{
    llm_model_config::LlmModelConfig, llm_provider::LlmProvider, sampling_config::SamplingConfig,
};
pub use error_handler::{AiLlmError, Result};
pub use service_profiles::{CompletionBackend, LlmService};
