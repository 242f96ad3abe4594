//! Backend call shared by the query, patch and verify stages.

use std::time::Instant;

use ai_llm_service::{CompletionBackend, SamplingConfig};
use tracing::{debug, warn};

use crate::prompt::approx_tokens;

/// Submits `prompts` as one batch; any backend error becomes an empty result.
///
/// An empty result is the pipeline's uniform "call failed" signal, so the
/// caller never has to distinguish transport errors from empty responses.
pub(crate) async fn complete<B: CompletionBackend>(
    backend: &B,
    stage: &'static str,
    prompts: &[String],
    sampling: &SamplingConfig,
) -> Vec<String> {
    let lengths: Vec<usize> = prompts.iter().map(|p| approx_tokens(p)).collect();
    debug!(stage, approx_tokens = ?lengths, "submitting prompts");

    let started = Instant::now();
    match backend.generate(prompts, sampling).await {
        Ok(out) => {
            debug!(
                stage,
                responses = out.len(),
                latency_ms = started.elapsed().as_millis(),
                "backend answered"
            );
            out
        }
        Err(err) => {
            warn!(stage, error = %err, "backend call failed; treating as empty response");
            Vec::new()
        }
    }
}
