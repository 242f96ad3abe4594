//! Deterministic backend for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use ai_llm_service::error_handler::ConfigError;
use ai_llm_service::{AiLlmError, CompletionBackend, Result, SamplingConfig};

/// Replays queued batches in order and records every submitted batch.
///
/// Once the script runs out, every call returns an empty batch.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    script: Mutex<VecDeque<Option<Vec<String>>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues one successful batch.
    pub(crate) fn reply(self, responses: &[&str]) -> Self {
        self.push(Some(responses.iter().map(|r| r.to_string()).collect()))
    }

    /// Queues one transport-level failure.
    pub(crate) fn fail(self) -> Self {
        self.push(None)
    }

    /// Batches submitted so far.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, item: Option<Vec<String>>) -> Self {
        self.script.lock().unwrap().push_back(item);
        self
    }
}

impl CompletionBackend for ScriptedBackend {
    async fn generate(&self, prompts: &[String], _sampling: &SamplingConfig) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(prompts.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Some(batch)) => Ok(batch),
            Some(None) => Err(AiLlmError::Config(ConfigError::MissingVar("SCRIPTED_FAILURE"))),
            None => Ok(Vec::new()),
        }
    }
}
