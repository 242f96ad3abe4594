//! HTTP plumbing shared by the provider clients: endpoint checks, client
//! construction and one JSON round trip with uniform error mapping.

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error_handler::{
    AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
};

/// Timeout applied when the config leaves it unset. Long generations are normal.
pub(crate) const FALLBACK_TIMEOUT_SECS: u64 = 600;

/// Checks the scheme and returns `endpoint` without trailing slashes.
pub(crate) fn base_url(provider: Provider, endpoint: &str) -> Result<String, AiLlmError> {
    let trimmed = endpoint.trim();
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    if !has_scheme {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        )
        .into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Builds a compressed-transfer client with the given default headers.
pub(crate) fn build_client(
    timeout_secs: Option<u64>,
    headers: HeaderMap,
) -> Result<reqwest::Client, AiLlmError> {
    let timeout = Duration::from_secs(timeout_secs.unwrap_or(FALLBACK_TIMEOUT_SECS));
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .default_headers(headers)
        .build()?)
}

/// POSTs `body` as JSON and decodes a 2xx answer into `R`.
///
/// # Errors
/// - `HttpStatus` with a body snippet for non-2xx answers
/// - `Decode` when the payload does not match `R`
/// - [`AiLlmError::HttpTransport`] for network failures
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    provider: Provider,
    url: &str,
    body: &B,
) -> Result<R, AiLlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let started = Instant::now();
    let resp = client.post(url).json(body).send().await?;
    let status = resp.status();

    if !status.is_success() {
        let snippet = make_snippet(&resp.text().await.unwrap_or_default());
        error!(
            %provider,
            %status,
            url,
            %snippet,
            latency_ms = started.elapsed().as_millis(),
            "upstream rejected request"
        );
        let http = HttpError {
            status,
            url: url.to_string(),
            snippet,
        };
        return Err(ProviderError::new(provider, ProviderErrorKind::HttpStatus(http)).into());
    }

    let decoded = resp.json::<R>().await.map_err(|e| {
        error!(%provider, url, error = %e, "response body did not decode");
        ProviderError::new(provider, ProviderErrorKind::Decode(e.to_string()))
    })?;
    debug!(
        %provider,
        url,
        latency_ms = started.elapsed().as_millis(),
        "round trip done"
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slashes() {
        let url = base_url(Provider::Ollama, " http://gpu:11434// ").unwrap();
        assert_eq!(url, "http://gpu:11434");
    }

    #[test]
    fn base_url_requires_scheme() {
        let err = base_url(Provider::OpenAI, "api.openai.com").unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::InvalidEndpoint(_),
                ..
            })
        ));
    }
}
