//! Default backend configs loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`            = provider kind (`ollama` by default, or `openai`)
//! - `LLM_TIMEOUT_SECS`    = optional request timeout (u64, default 600)
//! - `LLM_MAX_CONCURRENCY` = max in-flight requests per batch (default 4)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`  = API key (mandatory)
//! - `OPENAI_BASE_URL` = endpoint (default `https://api.openai.com`)
//! - `OPENAI_MODEL`    = model (mandatory)
//!
//! Sampling:
//! - `LLM_TEMPERATURE` (default 1.0), `LLM_MIN_P` (default 0.01),
//!   `LLM_TOP_P` (unset by default), `LLM_MAX_TOKENS` (default 32768)
//!
//! Every resolver also has a `*_from_vars` twin taking a lookup function, so
//! the parsing rules can be exercised without touching the process environment.

use crate::{
    config::{
        llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
        sampling_config::SamplingConfig,
    },
    error_handler::{AiLlmError, ConfigError, Result, validate_http_endpoint},
};

const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";

/// Variable lookup used by the `*_from_vars` resolvers.
pub type VarLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Builds the backend config selected by `LLM_KIND`.
///
/// # Errors
/// Any [`ConfigError`] raised while resolving the provider-specific variables.
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from_vars(&process_env)
}

/// Same as [`config_from_env`], reading variables through `var`.
pub fn config_from_vars(var: VarLookup<'_>) -> Result<LlmModelConfig> {
    let provider = match non_empty(var, "LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Ollama,
    };
    let timeout_secs = Some(
        opt_num::<u64>(var, "LLM_TIMEOUT_SECS", "expected u64")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
    );

    match provider {
        LlmProvider::Ollama => Ok(LlmModelConfig {
            provider,
            model: required(var, "OLLAMA_MODEL")?,
            endpoint: ollama_endpoint(var)?,
            api_key: None,
            timeout_secs,
        }),
        LlmProvider::OpenAI => {
            let endpoint =
                non_empty(var, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.into());
            validate_http_endpoint("OPENAI_BASE_URL", &endpoint)?;
            Ok(LlmModelConfig {
                provider,
                model: required(var, "OPENAI_MODEL")?,
                endpoint,
                api_key: Some(required(var, "OPENAI_API_KEY")?),
                timeout_secs,
            })
        }
    }
}

/// Reads `LLM_MAX_CONCURRENCY` (in-flight requests inside one batched call).
///
/// # Errors
/// [`ConfigError::InvalidNumber`] if the value is not a positive integer.
pub fn max_concurrency_from_env() -> Result<Option<usize>> {
    max_concurrency_from_vars(&process_env)
}

/// Same as [`max_concurrency_from_env`], reading variables through `var`.
pub fn max_concurrency_from_vars(var: VarLookup<'_>) -> Result<Option<usize>> {
    match opt_num::<usize>(var, "LLM_MAX_CONCURRENCY", "expected positive integer")? {
        Some(0) => Err(ConfigError::InvalidNumber {
            var: "LLM_MAX_CONCURRENCY",
            reason: "expected positive integer",
        }
        .into()),
        other => Ok(other),
    }
}

/// Builds and validates the sampling parameters.
///
/// # Errors
/// - [`ConfigError::InvalidNumber`] for unparsable values
/// - [`ConfigError::OutOfRange`] for values outside provider limits
pub fn sampling_from_env() -> Result<SamplingConfig> {
    sampling_from_vars(&process_env)
}

/// Same as [`sampling_from_env`], reading variables through `var`.
pub fn sampling_from_vars(var: VarLookup<'_>) -> Result<SamplingConfig> {
    let dflt = SamplingConfig::default();
    let cfg = SamplingConfig {
        temperature: opt_num(var, "LLM_TEMPERATURE", "expected f32")?
            .unwrap_or(dflt.temperature),
        min_p: opt_num(var, "LLM_MIN_P", "expected f32")?.unwrap_or(dflt.min_p),
        top_p: opt_num(var, "LLM_TOP_P", "expected f32")?,
        max_tokens: opt_num(var, "LLM_MAX_TOKENS", "expected u32")?.unwrap_or(dflt.max_tokens),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint(var: VarLookup<'_>) -> Result<String> {
    if let Some(url) = non_empty(var, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_num::<u16>(var, "OLLAMA_PORT", "expected u16 (1..=65535)")? {
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

fn non_empty(var: VarLookup<'_>, name: &str) -> Option<String> {
    var(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(var: VarLookup<'_>, name: &'static str) -> Result<String> {
    non_empty(var, name).ok_or_else(|| ConfigError::MissingVar(name).into())
}

fn opt_num<T: std::str::FromStr>(
    var: VarLookup<'_>,
    name: &'static str,
    reason: &'static str,
) -> Result<Option<T>> {
    match non_empty(var, name) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ollama_is_default_provider() {
        let env = vars(&[("OLLAMA_PORT", "11434"), ("OLLAMA_MODEL", "qwen3:32b")]);
        let cfg = config_from_vars(&|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert_eq!(cfg.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn ollama_url_wins_over_port() {
        let env = vars(&[
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OLLAMA_PORT", "9999"),
            ("OLLAMA_MODEL", "m"),
        ]);
        let cfg = config_from_vars(&|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.endpoint, "http://gpu-box:11434");
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let env = vars(&[("OLLAMA_MODEL", "m")]);
        let err = config_from_vars(&|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT"))
        ));
    }

    #[test]
    fn openai_requires_key() {
        let env = vars(&[("LLM_KIND", "openai"), ("OPENAI_MODEL", "gpt-4o")]);
        let err = config_from_vars(&|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY"))
        ));

        let env = vars(&[
            ("LLM_KIND", "openai"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_TIMEOUT_SECS", "30"),
        ]);
        let cfg = config_from_vars(&|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.endpoint, DEFAULT_OPENAI_BASE);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.timeout_secs, Some(30));
    }

    #[test]
    fn sampling_defaults_and_overrides() {
        let empty = vars(&[]);
        let s = sampling_from_vars(&|k| empty.get(k).cloned()).unwrap();
        assert_eq!(s, SamplingConfig::default());

        let env = vars(&[("LLM_TEMPERATURE", "0.6"), ("LLM_MAX_TOKENS", "4096")]);
        let s = sampling_from_vars(&|k| env.get(k).cloned()).unwrap();
        assert_eq!(s.temperature, 0.6);
        assert_eq!(s.max_tokens, 4096);
        assert_eq!(s.min_p, 0.01);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let env = vars(&[("LLM_MAX_CONCURRENCY", "0")]);
        assert!(max_concurrency_from_vars(&|k| env.get(k).cloned()).is_err());
        let env = vars(&[("LLM_MAX_CONCURRENCY", "8")]);
        assert_eq!(
            max_concurrency_from_vars(&|k| env.get(k).cloned()).unwrap(),
            Some(8)
        );
    }

    #[test]
    fn sampling_rejects_garbage() {
        let env = vars(&[("LLM_MAX_TOKENS", "lots")]);
        let err = sampling_from_vars(&|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber {
                var: "LLM_MAX_TOKENS",
                ..
            })
        ));
    }
}
