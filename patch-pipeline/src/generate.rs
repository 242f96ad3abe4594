//! Patch stage: one completion, one candidate.

use ai_llm_service::{CompletionBackend, SamplingConfig};
use tracing::{debug, info};

use crate::llm::complete;
use crate::parse::extract_patch;
use crate::prompt::{FILE_CONTENT_STRING, PROBLEM_STATEMENT, render};

pub struct PatchGenerator<'a, B> {
    backend: &'a B,
    template: &'a str,
    sampling: &'a SamplingConfig,
}

impl<'a, B: CompletionBackend> PatchGenerator<'a, B> {
    pub fn new(backend: &'a B, template: &'a str, sampling: &'a SamplingConfig) -> Self {
        Self {
            backend,
            template,
            sampling,
        }
    }

    /// Requests a patch for `problem` given the rendered `evidence`.
    ///
    /// Returns the extracted candidate (if any) and the raw completion.
    pub async fn generate(&self, problem: &str, evidence: &str) -> (Option<String>, String) {
        let prompt = render(
            self.template,
            &[(PROBLEM_STATEMENT, problem), (FILE_CONTENT_STRING, evidence)],
        );

        let raw = complete(self.backend, "patch", &[prompt], self.sampling)
            .await
            .into_iter()
            .next()
            .unwrap_or_default();
        debug!(response = %raw, "patch: raw response");

        let candidate = extract_patch(&raw);
        info!(
            has_candidate = candidate.is_some(),
            patch_len = candidate.as_ref().map_or(0, String::len),
            "patch: candidate extracted"
        );
        (candidate, raw)
    }
}
