//! Evidence: line-numbered code excerpts around search-term hits.
//!
//! Flow per search entry: read file -> find hit lines -> one context window
//! per hit -> merge overlapping windows -> render the report.

mod extract;
mod merge;
mod render;

pub use extract::{collect_evidence, context_window, find_hits};
pub use merge::merge_snippets;
pub use render::render_evidence;

/// A line containing at least one search term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineHit {
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

/// Ordered `(line number, text)` pairs from one file.
///
/// A fresh context window is contiguous; a merged snippet may skip lines
/// when merging with a positive gap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snippet {
    lines: Vec<(usize, String)>,
}

impl Snippet {
    pub fn new(lines: Vec<(usize, String)>) -> Self {
        Self { lines }
    }

    /// First line number, 0 for an empty snippet.
    pub fn start(&self) -> usize {
        self.lines.first().map_or(0, |(n, _)| *n)
    }

    /// Last line number, 0 for an empty snippet.
    pub fn end(&self) -> usize {
        self.lines.last().map_or(0, |(n, _)| *n)
    }

    pub fn lines(&self) -> &[(usize, String)] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn into_lines(self) -> Vec<(usize, String)> {
        self.lines
    }
}

/// Merged snippets for one search entry, ascending and non-overlapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEvidence {
    /// Path as given in the search request.
    pub path: Option<String>,
    pub snippets: Vec<Snippet>,
}
