//! Top-level orchestration: index -> query -> evidence -> candidate loop.

use std::path::Path;
use std::sync::Arc;

use ai_llm_service::{CompletionBackend, SamplingConfig};
use tracing::{debug, info, warn};

use crate::cfg::PipelineConfig;
use crate::controller::{AttemptRecord, CandidateLoop, LoopState, enter};
use crate::error::PipelineError;
use crate::evidence::{collect_evidence, render_evidence};
use crate::generate::PatchGenerator;
use crate::indexer::stringify_directory;
use crate::locate::FileLocator;
use crate::parse::QueryError;
use crate::progress::{NoopProgress, Progress};
use crate::prompt::PromptTemplates;
use crate::query::SearchRequest;
use crate::verify::PatchVerifier;

/// Why a prediction ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A candidate passed verification.
    Accepted,
    /// The query stage produced no usable search request.
    NoQuery,
    /// Every attempt failed.
    Exhausted,
}

/// Result of one run, with everything needed to explain it.
#[derive(Clone, Debug)]
pub struct Prediction {
    pub patch: Option<String>,
    pub stop: StopReason,
    pub query: SearchRequest,
    pub query_errors: Vec<QueryError>,
    pub query_response: String,
    /// Rendered evidence report, empty when the run stopped at the query.
    pub evidence: String,
    pub attempts: Vec<AttemptRecord>,
}

impl Prediction {
    fn no_query(errors: Vec<QueryError>, raw: String) -> Self {
        Self {
            patch: None,
            stop: StopReason::NoQuery,
            query: SearchRequest::new(),
            query_errors: errors,
            query_response: raw,
            evidence: String::new(),
            attempts: Vec::new(),
        }
    }
}

/// Pipeline bound to one completion backend.
///
/// Holds no per-run state; concurrent `predict` calls are independent.
pub struct Predictor<B> {
    backend: B,
    sampling: SamplingConfig,
    cfg: PipelineConfig,
    templates: PromptTemplates,
    progress: Arc<dyn Progress>,
}

impl<B: CompletionBackend> Predictor<B> {
    /// Validates `cfg` and loads prompt templates (honoring `cfg.prompt_dir`).
    ///
    /// # Errors
    /// - [`PipelineError::InvalidConfig`] for zero attempts or votes
    /// - [`PipelineError::Template`] for unreadable template overrides
    pub fn new(
        backend: B,
        sampling: SamplingConfig,
        cfg: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let templates = PromptTemplates::load(cfg.prompt_dir.as_deref())?;
        Ok(Self {
            backend,
            sampling,
            cfg,
            templates,
            progress: Arc::new(NoopProgress),
        })
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs the whole pipeline for `problem` against the repository at
    /// `repo_root`.
    ///
    /// Model failures never surface as errors: they end the run with
    /// [`StopReason::NoQuery`] or [`StopReason::Exhausted`].
    ///
    /// # Errors
    /// Only indexing failures ([`PipelineError::RepoRoot`], [`PipelineError::Walk`]).
    pub async fn predict(&self, problem: &str, repo_root: &Path) -> Result<Prediction, PipelineError> {
        let progress = &*self.progress;
        progress.set_total(3 + 2 * self.cfg.max_attempts as u64);

        enter(LoopState::Searching, 0);
        progress.step("indexing repository");
        let directory = stringify_directory(repo_root, &self.cfg.skip_dirs)?;

        progress.step("asking for files to inspect");
        let locator = FileLocator::new(&self.backend, &self.templates.query, &self.sampling);
        let (parsed, query_response) = locator.locate(&directory, problem).await;
        let query_errors = parsed.errors.clone();
        let query = parsed.into_request();
        if query.is_empty() {
            warn!(
                malformed_blocks = query_errors.len(),
                "no usable search request; stopping"
            );
            progress.finish("no usable query");
            return Ok(Prediction::no_query(query_errors, query_response));
        }
        debug!(?query, "search request");

        progress.step("extracting evidence");
        let files = collect_evidence(&query, self.cfg.context_lines, self.cfg.merge_gap);
        let evidence = render_evidence(&files, repo_root);
        debug!(%evidence, "rendered evidence");

        let generator = PatchGenerator::new(&self.backend, &self.templates.patch, &self.sampling);
        let verifier = PatchVerifier::new(
            &self.backend,
            &self.templates.verify,
            &self.sampling,
            self.cfg.verify_votes,
        );
        let outcome = CandidateLoop::new(generator, verifier, self.cfg.max_attempts, progress)
            .run(problem, &evidence)
            .await;

        let stop = if outcome.patch.is_some() {
            StopReason::Accepted
        } else {
            StopReason::Exhausted
        };
        info!(?stop, attempts = outcome.attempts.len(), "prediction finished");
        progress.finish(match stop {
            StopReason::Accepted => "patch accepted",
            _ => "no patch accepted",
        });

        Ok(Prediction {
            patch: outcome.patch,
            stop,
            query,
            query_errors,
            query_response,
            evidence,
            attempts: outcome.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::controller::AttemptResult;
    use crate::testing::ScriptedBackend;

    fn templates() -> PromptTemplates {
        PromptTemplates {
            query: "Q {directory_string}".into(),
            patch: "P {file_content_string}".into(),
            verify: "V {patch_string}".into(),
        }
    }

    #[tokio::test]
    async fn malformed_query_stops_before_evidence() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.py"), "x = 1\n").unwrap();

        let backend = ScriptedBackend::new().reply(&["<root><entry></root>"]);
        let predictor = Predictor::new(backend, SamplingConfig::default(), PipelineConfig::default())
            .unwrap()
            .with_templates(templates());

        let p = predictor.predict("bug", tmp.path()).await.unwrap();
        assert_eq!(p.stop, StopReason::NoQuery);
        assert_eq!(p.query_errors.len(), 1);
        assert!(p.evidence.is_empty());
        assert_eq!(predictor.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn evidence_labels_are_relative_to_repo_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("calc.py");
        fs::write(&file, "def calculate(x):\n    return x*2\n").unwrap();

        let query = format!(
            "<root><entry><filepath>{}</filepath><strings_to_search>\
             <string_to_search>calculate(</string_to_search>\
             </strings_to_search></entry></root>",
            file.display()
        );
        let backend = ScriptedBackend::new()
            .reply(&[query.as_str()])
            .reply(&["<patch>diff</patch>"])
            .reply(&["<label>Yes</label>"; 4]);
        let predictor = Predictor::new(backend, SamplingConfig::default(), PipelineConfig::default())
            .unwrap()
            .with_templates(templates());

        let p = predictor.predict("bug", tmp.path()).await.unwrap();
        assert_eq!(p.stop, StopReason::Accepted);
        assert_eq!(p.patch.as_deref(), Some("diff"));
        assert_eq!(p.attempts[0].result, AttemptResult::Accepted);
        assert!(p.evidence.contains("FILE: calc.py\n"));
        assert!(p.evidence.contains("    1 | def calculate(x):"));

        // the patch prompt carries the rendered evidence verbatim
        let calls = predictor.backend().calls();
        assert_eq!(calls[1][0], format!("P {}", p.evidence));
    }

    #[test]
    fn zero_votes_are_rejected_up_front() {
        let cfg = PipelineConfig {
            verify_votes: 0,
            ..Default::default()
        };
        let err = Predictor::new(ScriptedBackend::new(), SamplingConfig::default(), cfg)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
