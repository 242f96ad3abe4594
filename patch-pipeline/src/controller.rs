//! Bounded generate-then-verify loop.
//!
//! ```text
//! Searching -> Generating -> Verifying -> Accepted
//!                  ^             |
//!                  |             v
//!                  +-------- Retrying ----> Exhausted (after max_attempts)
//! ```
//!
//! Attempts share nothing but the problem statement and the evidence string.
//! There is no backoff and no deduplication of candidates.

use std::fmt;

use ai_llm_service::CompletionBackend;
use tracing::{debug, info, warn};

use crate::generate::PatchGenerator;
use crate::progress::Progress;
use crate::verify::{PatchVerifier, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Searching,
    Generating,
    Verifying,
    Accepted,
    Retrying,
    Exhausted,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoopState::Searching => "searching",
            LoopState::Generating => "generating",
            LoopState::Verifying => "verifying",
            LoopState::Accepted => "accepted",
            LoopState::Retrying => "retrying",
            LoopState::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// What happened in one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptResult {
    /// The completion held no (or an empty) patch block; nothing was verified.
    NoCandidate,
    Rejected { dissent: String },
    Indeterminate,
    Accepted,
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttemptResult::NoCandidate => "no candidate",
            AttemptResult::Rejected { .. } => "rejected",
            AttemptResult::Indeterminate => "no verdict",
            AttemptResult::Accepted => "accepted",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based.
    pub attempt: usize,
    pub result: AttemptResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopOutcome {
    /// The accepted candidate, `None` once the budget is exhausted.
    pub patch: Option<String>,
    pub attempts: Vec<AttemptRecord>,
}

pub struct CandidateLoop<'a, B> {
    generator: PatchGenerator<'a, B>,
    verifier: PatchVerifier<'a, B>,
    max_attempts: usize,
    progress: &'a dyn Progress,
}

impl<'a, B: CompletionBackend> CandidateLoop<'a, B> {
    pub fn new(
        generator: PatchGenerator<'a, B>,
        verifier: PatchVerifier<'a, B>,
        max_attempts: usize,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            generator,
            verifier,
            max_attempts,
            progress,
        }
    }

    /// Runs up to `max_attempts` attempts and stops at the first accepted
    /// candidate.
    pub async fn run(&self, problem: &str, evidence: &str) -> LoopOutcome {
        let mut attempts = Vec::with_capacity(self.max_attempts);

        for attempt in 1..=self.max_attempts {
            enter(LoopState::Generating, attempt);
            self.progress
                .step(&format!("attempt {attempt}/{}: generating", self.max_attempts));

            let (candidate, _raw) = self.generator.generate(problem, evidence).await;
            let Some(patch) = candidate.filter(|p| !p.is_empty()) else {
                warn!(attempt, "no candidate patch in response");
                let result = AttemptResult::NoCandidate;
                self.retry_or_stop(attempt, &result);
                attempts.push(AttemptRecord { attempt, result });
                continue;
            };

            enter(LoopState::Verifying, attempt);
            self.progress
                .step(&format!("attempt {attempt}/{}: verifying", self.max_attempts));

            let result = match self.verifier.verify(problem, evidence, &patch).await {
                Verdict::Accepted => {
                    enter(LoopState::Accepted, attempt);
                    info!(attempt, "candidate patch accepted");
                    attempts.push(AttemptRecord {
                        attempt,
                        result: AttemptResult::Accepted,
                    });
                    return LoopOutcome {
                        patch: Some(patch),
                        attempts,
                    };
                }
                Verdict::Rejected { dissent } => {
                    info!(attempt, "candidate patch rejected");
                    AttemptResult::Rejected { dissent }
                }
                Verdict::Indeterminate => {
                    warn!(attempt, "verification returned no usable responses");
                    AttemptResult::Indeterminate
                }
            };
            self.retry_or_stop(attempt, &result);
            attempts.push(AttemptRecord { attempt, result });
        }

        LoopOutcome {
            patch: None,
            attempts,
        }
    }

    fn retry_or_stop(&self, attempt: usize, result: &AttemptResult) {
        self.progress
            .message(&format!("attempt {attempt}/{}: {result}", self.max_attempts));
        if attempt < self.max_attempts {
            enter(LoopState::Retrying, attempt);
        } else {
            enter(LoopState::Exhausted, attempt);
            info!(max_attempts = self.max_attempts, "attempt budget exhausted");
        }
    }
}

pub(crate) fn enter(state: LoopState, attempt: usize) {
    debug!(%state, attempt, "loop: state transition");
}
