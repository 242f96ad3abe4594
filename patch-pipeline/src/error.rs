//! Typed error for the patch-pipeline crate.
//!
//! Only conditions that make a run impossible end up here. Model failures,
//! unparsable responses and missing files degrade inside the pipeline instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The repository root is missing or is not a directory.
    #[error("repository root is not a directory: {0}")]
    RepoRoot(PathBuf),

    /// Directory traversal failed while building the file listing.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A prompt template override exists but cannot be read.
    #[error("failed to read prompt template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline knob has a value the pipeline cannot run with.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
