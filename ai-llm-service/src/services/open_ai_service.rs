//! OpenAI-compatible client: `POST {endpoint}/v1/chat/completions`.
//!
//! Works against OpenAI itself or any server speaking the same API (vLLM,
//! llama.cpp server, ...). The prompt goes out as a single user message.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    config::{
        llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
        sampling_config::SamplingConfig,
    },
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::http::{base_url, build_client, post_json},
};

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Validates provider, API key and endpoint, then builds a client that
    /// sends the bearer token on every request.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    /// - `Decode` if the key cannot be used as a header value
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let fail = |kind| AiLlmError::from(ProviderError::new(Provider::OpenAI, kind));

        if cfg.provider != LlmProvider::OpenAI {
            return Err(fail(ProviderErrorKind::InvalidProvider));
        }
        let key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| fail(ProviderErrorKind::MissingApiKey))?;
        let url_chat = format!(
            "{}/v1/chat/completions",
            base_url(Provider::OpenAI, &cfg.endpoint)?
        );

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| fail(ProviderErrorKind::Decode(format!("API key is not a valid header: {e}"))))?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = build_client(cfg.timeout_secs, headers)?;
        info!(model = %cfg.model, url = %url_chat, "openai: client ready");

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// One non-streaming chat completion; returns the first non-null content.
    ///
    /// Forwards `temperature`, `top_p` and `max_tokens`. The chat API has no
    /// `min_p`, so that knob is dropped here.
    ///
    /// # Errors
    /// Everything `post_json` maps, plus `EmptyChoices` when no choice carries
    /// content.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, AiLlmError> {
        let body = ChatRequest::new(&self.cfg.model, prompt, sampling);
        debug!(prompt_len = prompt.len(), "openai: chat");

        let out: ChatResponse =
            post_json(&self.client, Provider::OpenAI, &self.url_chat, &body).await?;
        let content = first_content(out).ok_or_else(|| {
            ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices)
        })?;
        debug!(response_len = content.len(), "openai: done");
        Ok(content)
    }
}

fn first_content(out: ChatResponse) -> Option<String> {
    out.choices.into_iter().find_map(|c| c.message.content)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [UserMessage<'a>; 1],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, sampling: &SamplingConfig) -> Self {
        Self {
            model,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_single_user_message() {
        let sampling = SamplingConfig {
            top_p: Some(0.95),
            ..Default::default()
        };
        let body = ChatRequest::new("gpt-4o", "fix it", &sampling);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"].as_array().unwrap().len(), 1);
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "fix it");
        assert_eq!(v["max_tokens"], 32_768);
        assert!(v.get("min_p").is_none());
    }

    #[test]
    fn picks_first_choice_with_content() {
        let out: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null}},{"message":{"content":"<patch>x</patch>"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(out).as_deref(), Some("<patch>x</patch>"));

        let empty: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(first_content(empty).is_none());
    }

    #[test]
    fn api_key_is_required() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o".into(),
            endpoint: "https://api.openai.com".into(),
            api_key: None,
            timeout_secs: None,
        };
        let err = OpenAiService::new(cfg).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::MissingApiKey,
                ..
            })
        ));
    }
}
