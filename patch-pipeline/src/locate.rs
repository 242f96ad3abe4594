//! Query stage: ask the model which files to open and what to search for.

use ai_llm_service::{CompletionBackend, SamplingConfig};
use tracing::{debug, info, warn};

use crate::llm::complete;
use crate::parse::{QueryParse, parse_search_request};
use crate::prompt::{DIRECTORY_STRING, PROBLEM_STATEMENT, render};

pub struct FileLocator<'a, B> {
    backend: &'a B,
    template: &'a str,
    sampling: &'a SamplingConfig,
}

impl<'a, B: CompletionBackend> FileLocator<'a, B> {
    pub fn new(backend: &'a B, template: &'a str, sampling: &'a SamplingConfig) -> Self {
        Self {
            backend,
            template,
            sampling,
        }
    }

    /// Sends one query prompt and parses the first completion.
    ///
    /// Returns the parse result together with the raw completion. A failed or
    /// empty backend call yields an empty parse and an empty string.
    pub async fn locate(&self, directory: &str, problem: &str) -> (QueryParse, String) {
        let prompt = render(
            self.template,
            &[(PROBLEM_STATEMENT, problem), (DIRECTORY_STRING, directory)],
        );

        let Some(raw) = complete(self.backend, "query", &[prompt], self.sampling)
            .await
            .into_iter()
            .next()
        else {
            warn!("query: no response from backend");
            return (QueryParse::default(), String::new());
        };
        debug!(response = %raw, "query: raw response");

        let parsed = parse_search_request(&raw);
        info!(
            entries = parsed.entries.len(),
            malformed_blocks = parsed.errors.len(),
            "query: response parsed"
        );
        (parsed, raw)
    }
}
