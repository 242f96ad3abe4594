//! Verification stage: N independent judgments, unanimous acceptance.

use ai_llm_service::{CompletionBackend, SamplingConfig};
use tracing::{debug, info};

use crate::llm::complete;
use crate::prompt::{FILE_CONTENT_STRING, PATCH_STRING, PROBLEM_STATEMENT, render};

/// Literal a judgment must contain to count as a "yes".
pub const AFFIRMATIVE: &str = "<label>Yes</label>";

/// Outcome of verifying one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every judgment contained [`AFFIRMATIVE`].
    Accepted,
    /// At least one judgment did not; `dissent` is the first such response.
    Rejected { dissent: String },
    /// The backend returned no usable batch. Treated as a rejection.
    Indeterminate,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Applies the unanimity rule to one batch of `votes` judgments.
///
/// An empty batch, or one whose size differs from `votes`, is
/// [`Verdict::Indeterminate`].
pub fn tally(responses: &[String], votes: usize) -> Verdict {
    if responses.is_empty() || responses.len() != votes {
        return Verdict::Indeterminate;
    }
    match responses.iter().find(|r| !r.contains(AFFIRMATIVE)) {
        Some(dissent) => Verdict::Rejected {
            dissent: dissent.clone(),
        },
        None => Verdict::Accepted,
    }
}

pub struct PatchVerifier<'a, B> {
    backend: &'a B,
    template: &'a str,
    sampling: &'a SamplingConfig,
    votes: usize,
}

impl<'a, B: CompletionBackend> PatchVerifier<'a, B> {
    pub fn new(
        backend: &'a B,
        template: &'a str,
        sampling: &'a SamplingConfig,
        votes: usize,
    ) -> Self {
        Self {
            backend,
            template,
            sampling,
            votes,
        }
    }

    /// Submits `votes` identical prompts as one batch and tallies the answers.
    pub async fn verify(&self, problem: &str, evidence: &str, patch: &str) -> Verdict {
        let prompt = render(
            self.template,
            &[
                (PROBLEM_STATEMENT, problem),
                (FILE_CONTENT_STRING, evidence),
                (PATCH_STRING, patch),
            ],
        );
        let prompts = vec![prompt; self.votes];

        let responses = complete(self.backend, "verify", &prompts, self.sampling).await;
        let yes = responses.iter().filter(|r| r.contains(AFFIRMATIVE)).count();
        let verdict = tally(&responses, self.votes);

        info!(
            votes = self.votes,
            received = responses.len(),
            yes,
            accepted = verdict.is_accepted(),
            "verify: tallied"
        );
        if let Verdict::Rejected { dissent } = &verdict {
            debug!(%dissent, "verify: dissenting response");
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    fn batch(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unanimity_is_required() {
        let yes = "ok <label>Yes</label>, this fixes the problem.";
        let no = "<label>No</label>, this does not fix the problem.";

        assert_eq!(tally(&batch(&[yes, yes, yes, yes]), 4), Verdict::Accepted);
        assert_eq!(
            tally(&batch(&[yes, no, yes, "unsure"]), 4),
            Verdict::Rejected {
                dissent: no.to_string()
            }
        );
        // lowercase label is not affirmative
        assert!(!tally(&batch(&[yes, yes, yes, "<label>yes</label>"]), 4).is_accepted());
    }

    #[test]
    fn empty_or_short_batch_is_indeterminate() {
        assert_eq!(tally(&[], 4), Verdict::Indeterminate);
        let yes = "<label>Yes</label>";
        assert_eq!(tally(&batch(&[yes, yes]), 4), Verdict::Indeterminate);
    }

    #[tokio::test]
    async fn submits_one_batch_of_identical_prompts() {
        let yes = "<label>Yes</label>";
        let backend = ScriptedBackend::new().reply(&[yes, yes, yes]);
        let sampling = SamplingConfig::default();
        let verifier = PatchVerifier::new(
            &backend,
            "{problem_statement}/{file_content_string}/{patch_string}",
            &sampling,
            3,
        );

        assert_eq!(verifier.verify("p", "e", "d").await, Verdict::Accepted);
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["p/e/d".to_string(); 3]);
    }

    #[tokio::test]
    async fn backend_failure_is_indeterminate() {
        let backend = ScriptedBackend::new().fail();
        let sampling = SamplingConfig::default();
        let verifier = PatchVerifier::new(&backend, "{patch_string}", &sampling, 4);
        assert_eq!(verifier.verify("p", "e", "d").await, Verdict::Indeterminate);
    }
}
