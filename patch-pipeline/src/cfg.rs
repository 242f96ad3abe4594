//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use crate::error::PipelineError;

/// Knobs for one pipeline run. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    // Evidence extraction
    pub context_lines: usize,
    pub merge_gap: usize,

    // Candidate loop
    pub max_attempts: usize,
    pub verify_votes: usize,

    // Optional directory with `query.txt`, `patch.txt`, `verify.txt`
    pub prompt_dir: Option<PathBuf>,

    // Directory names the indexer never descends into
    pub skip_dirs: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_lines: 10,
            merge_gap: 0,
            max_attempts: 3,
            verify_votes: 4,
            prompt_dir: None,
            skip_dirs: vec![".git".to_string()],
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// Unparsable numbers fall back to the default; call [`validate`] before use.
    ///
    /// [`validate`]: PipelineConfig::validate
    pub fn from_env() -> Self {
        Self::from_vars(&|k| std::env::var(k).ok())
    }

    /// Same as [`PipelineConfig::from_env`], reading variables through `var`.
    pub fn from_vars(var: &dyn Fn(&str) -> Option<String>) -> Self {
        let dflt = Self::default();
        Self {
            context_lines: parse(var, "CONTEXT_LINES", dflt.context_lines),
            merge_gap: parse(var, "MERGE_GAP", dflt.merge_gap),
            max_attempts: parse(var, "MAX_ATTEMPTS", dflt.max_attempts),
            verify_votes: parse(var, "VERIFY_VOTES", dflt.verify_votes),
            prompt_dir: var("PROMPT_DIR")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            skip_dirs: var("SKIP_DIRS")
                .map(|v| split_list(&v))
                .unwrap_or(dflt.skip_dirs),
        }
    }

    /// Rejects values the candidate loop cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_attempts == 0 {
            return Err(PipelineError::InvalidConfig(
                "MAX_ATTEMPTS must be at least 1".into(),
            ));
        }
        if self.verify_votes == 0 {
            return Err(PipelineError::InvalidConfig(
                "VERIFY_VOTES must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(var: &dyn Fn(&str) -> Option<String>, k: &str, dflt: T) -> T {
    var(k)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
