//! Completion capability shared by every pipeline stage.
//!
//! - [`CompletionBackend`] is the single seam the pipeline depends on: a batch of
//!   prompts in, one completion per prompt out, in submission order.
//! - [`LlmService`] implements it over the configured provider using enum
//!   dispatch (no boxed clients). A batch is fanned out with at most
//!   `max_concurrency` requests in flight and is all-or-nothing: if any request
//!   fails, the whole call fails.
//!
//! Construct once and pass by reference (or wrap in `Arc`) to dependents.

use std::future::Future;
use std::time::Instant;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::{
    config::{
        llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
        sampling_config::SamplingConfig,
    },
    error_handler::Result,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Default number of in-flight requests inside one batched call.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Black-box text completion.
///
/// Implementations must return exactly one completion per prompt, in the order
/// the prompts were given. An empty vector (or an error) means the whole batch
/// failed; callers never see partial batches.
pub trait CompletionBackend: Send + Sync {
    fn generate(
        &self,
        prompts: &[String],
        sampling: &SamplingConfig,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

enum ProviderClient {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

/// Provider-backed [`CompletionBackend`].
pub struct LlmService {
    cfg: LlmModelConfig,
    client: ProviderClient,
    max_concurrency: usize,
}

impl LlmService {
    /// Builds the provider client selected by `cfg.provider`.
    ///
    /// `max_concurrency` defaults to [`DEFAULT_MAX_CONCURRENCY`]; `Some(0)` is
    /// clamped to 1.
    ///
    /// # Errors
    /// Provider validation or HTTP client construction errors.
    pub fn new(cfg: LlmModelConfig, max_concurrency: Option<usize>) -> Result<Self> {
        let client = match cfg.provider {
            LlmProvider::Ollama => ProviderClient::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => ProviderClient::OpenAI(OpenAiService::new(cfg.clone())?),
        };
        let max_concurrency = max_concurrency
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
            .max(1);

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            max_concurrency,
            "completion backend ready"
        );

        Ok(Self {
            cfg,
            client,
            max_concurrency,
        })
    }

    /// Connection settings this service was built from.
    pub fn model_config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    async fn generate_one(&self, prompt: &str, sampling: &SamplingConfig) -> Result<String> {
        match &self.client {
            ProviderClient::Ollama(cli) => cli.generate(prompt, sampling).await,
            ProviderClient::OpenAI(cli) => cli.generate(prompt, sampling).await,
        }
    }
}

impl CompletionBackend for LlmService {
    async fn generate(
        &self,
        prompts: &[String],
        sampling: &SamplingConfig,
    ) -> Result<Vec<String>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        debug!(
            batch = prompts.len(),
            max_concurrency = self.max_concurrency,
            "submitting completion batch"
        );

        // Futures are built up front so the stream does not borrow through a
        // higher-ranked closure; `buffered` keeps submission order.
        let pending: Vec<_> = prompts
            .iter()
            .map(|p| self.generate_one(p, sampling))
            .collect();
        let out: Vec<String> = stream::iter(pending)
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        info!(
            batch = out.len(),
            latency_ms = started.elapsed().as_millis(),
            "completion batch finished"
        );
        Ok(out)
    }
}
