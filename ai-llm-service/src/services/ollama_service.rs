//! Ollama client: `POST {endpoint}/api/generate` with `stream = false`.
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{LlmModelConfig, LlmProvider, SamplingConfig};
//! use ai_llm_service::services::ollama_service::OllamaService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = OllamaService::new(LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "qwen3:14b".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     timeout_secs: Some(30),
//! })?;
//! let text = svc.generate("Say hi.", &SamplingConfig::default()).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    config::{
        llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
        sampling_config::SamplingConfig,
    },
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::http::{base_url, build_client, post_json},
};

#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl OllamaService {
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }
        let url_generate = format!("{}/api/generate", base_url(Provider::Ollama, &cfg.endpoint)?);
        let client = build_client(cfg.timeout_secs, HeaderMap::new())?;

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// One non-streaming generation. `sampling.max_tokens` maps to
    /// `num_predict`; `top_p` is sent only when set.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, AiLlmError> {
        let body = GenerateRequest::new(&self.cfg.model, prompt, sampling);
        debug!(prompt_len = prompt.len(), "ollama: generate");

        let out: GenerateResponse =
            post_json(&self.client, Provider::Ollama, &self.url_generate, &body).await?;
        debug!(response_len = out.response.len(), "ollama: done");
        Ok(out.response)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

impl<'a> GenerateRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, sampling: &SamplingConfig) -> Self {
        Self {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: sampling.temperature,
                min_p: sampling.min_p,
                top_p: sampling.top_p,
                num_predict: sampling.max_tokens,
            },
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    min_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
