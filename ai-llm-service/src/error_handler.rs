//! Errors of the completion backend.
//!
//! [`AiLlmError`] is the only error type callers see. It nests
//! [`ConfigError`] (environment and validation problems at startup) and
//! [`ProviderError`] (anything a provider client hits at request time).
//! Messages carry an `[AI LLM Service]` tag so they stand out in mixed logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiLlmError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Connection, timeout or body-read failure below the HTTP status level.
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Problems found while reading or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable unset or blank.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        /// e.g. `expected u32`
        reason: &'static str,
    },

    /// `LLM_KIND` names a provider this crate has no client for.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    /// Sampling value outside what providers accept.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: String,
    },
}

/// Which client raised a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAI,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAI => "OpenAI",
        };
        f.write_str(name)
    }
}

/// A non-2xx answer: status, where it came from and the start of its body.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Output of [`make_snippet`].
    pub snippet: String,
}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ProviderErrorKind {
    /// Config was built for the other provider.
    InvalidProvider,
    MissingApiKey,
    /// Endpoint without an http(s) scheme.
    InvalidEndpoint(String),
    HttpStatus(HttpError),
    /// Body arrived but did not match the expected shape.
    Decode(String),
    /// Chat answer with no usable message content.
    EmptyChoices,
}

#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProvider => f.write_str("config is for a different provider"),
            Self::MissingApiKey => f.write_str("no API key configured"),
            Self::InvalidEndpoint(url) => write!(f, "endpoint needs an http(s) scheme: {url}"),
            Self::HttpStatus(h) => write!(f, "{} answered {}: {}", h.url, h.status, h.snippet),
            Self::Decode(msg) => write!(f, "unexpected response body: {msg}"),
            Self::EmptyChoices => f.write_str("response contained no choices"),
        }
    }
}

const SNIPPET_CHARS: usize = 240;

/// First [`SNIPPET_CHARS`] characters of `body` on one line.
pub fn make_snippet(body: &str) -> String {
    let flat: String = body
        .chars()
        .take(SNIPPET_CHARS)
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
        .collect();
    flat.trim().to_string()
}

/// `Err(InvalidFormat)` unless `value` starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(());
    }
    Err(ConfigError::InvalidFormat {
        var,
        reason: "must start with http:// or https://",
    }
    .into())
}

/// `Err(OutOfRange)` unless `value` is finite and within `min..=max`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        detail: format!("got {value}, expected {min}..={max}"),
    }
    .into())
}
