//! Prompt templates for the three model calls and placeholder substitution.
//!
//! Placeholders: `{problem_statement}`, `{directory_string}`,
//! `{file_content_string}`, `{patch_string}`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::PipelineError;

pub const PROBLEM_STATEMENT: &str = "problem_statement";
pub const DIRECTORY_STRING: &str = "directory_string";
pub const FILE_CONTENT_STRING: &str = "file_content_string";
pub const PATCH_STRING: &str = "patch_string";

/// Default query prompt: pick files and search strings.
pub const DEFAULT_QUERY: &str = r#"
You are preparing a git diff patch that resolves an issue in a code repository.
First decide which files most likely contain the root cause, and which exact
strings inside them lead to the relevant code.

Problem statement:

{problem_statement}

Repository files:

<directory>
{directory_string}
</directory>

Explain your reasoning briefly, then answer in exactly this format:

<root>
    <entry>
        <filepath>path exactly as listed above</filepath>
        <strings_to_search>
            <string_to_search>text to search for</string_to_search>
        </strings_to_search>
    </entry>
</root>

Rules:
- Copy every filepath verbatim from the listing.
- Prefer long, specific search strings; include punctuation such as " calculate(".
- Select at most 5 files.
"#;

/// Default patch prompt: write a unified diff.
pub const DEFAULT_PATCH: &str = r#"
You are writing a git diff patch that resolves an issue in a code repository.

Problem statement:

{problem_statement}

Relevant excerpts (line numbers on the left):

{file_content_string}

Reason about the root cause, then write the fix as a unified git diff between
<patch> and </patch>.
"#;

/// Default verify prompt: judge one candidate patch.
pub const DEFAULT_VERIFY: &str = r#"
You are reviewing a proposed git diff patch for an issue in a code repository.

Problem statement:

{problem_statement}

Relevant excerpts, possibly incomplete:

{file_content_string}

Proposed patch:

{patch_string}

List your observations, then decide whether the patch fully resolves the problem.
Do not suggest alternative fixes.

End your response with exactly one of:
- <label>Yes</label>, this fixes the problem.
- <label>No</label>, this does not fix the problem.
"#;

/// Template text for each model call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplates {
    pub query: String,
    pub patch: String,
    pub verify: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.trim().to_string(),
            patch: DEFAULT_PATCH.trim().to_string(),
            verify: DEFAULT_VERIFY.trim().to_string(),
        }
    }
}

impl PromptTemplates {
    /// Built-in templates, each replaced by `query.txt`, `patch.txt` or
    /// `verify.txt` from `dir` when such a file exists.
    ///
    /// # Errors
    /// [`PipelineError::Template`] if an existing override cannot be read.
    pub fn load(dir: Option<&Path>) -> Result<Self, PipelineError> {
        let mut t = Self::default();
        if let Some(dir) = dir {
            override_from(dir, "query.txt", &mut t.query)?;
            override_from(dir, "patch.txt", &mut t.patch)?;
            override_from(dir, "verify.txt", &mut t.verify)?;
        }
        Ok(t)
    }
}

fn override_from(dir: &Path, file: &str, slot: &mut String) -> Result<(), PipelineError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Ok(());
    }
    *slot = fs::read_to_string(&path)
        .map_err(|source| PipelineError::Template {
            path: path.clone(),
            source,
        })?
        .trim()
        .to_string();
    info!("prompt: using template override {}", path.display());
    Ok(())
}

/// Substitutes `{name}` placeholders in one pass.
///
/// Values are inserted verbatim and never rescanned; unknown `{...}` tokens
/// and unbalanced braces are kept as-is.
///
/// # Example
/// ```
/// # use patch_pipeline::prompt::render;
/// let out = render("fix {problem_statement} {x}", &[("problem_statement", "{x}")]);
/// assert_eq!(out, "fix {x} {x}");
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Rough token estimate used only for logging.
pub fn approx_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn substitutes_known_and_keeps_unknown() {
        let out = render(
            "{problem_statement}|{unknown}|{patch_string}|{",
            &[(PROBLEM_STATEMENT, "P"), (PATCH_STRING, "D")],
        );
        assert_eq!(out, "P|{unknown}|D|{");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render(
            "{file_content_string} / {patch_string}",
            &[
                (FILE_CONTENT_STRING, "fn f() { {patch_string} }"),
                (PATCH_STRING, "diff"),
            ],
        );
        assert_eq!(out, "fn f() { {patch_string} } / diff");
    }

    #[test]
    fn defaults_carry_every_placeholder_and_sentinel() {
        let t = PromptTemplates::default();
        assert!(t.query.contains("{problem_statement}") && t.query.contains("{directory_string}"));
        assert!(t.query.contains("<root>"));
        assert!(t.patch.contains("{file_content_string}") && t.patch.contains("<patch>"));
        assert!(t.verify.contains("{patch_string}") && t.verify.contains("<label>Yes</label>"));
    }

    #[test]
    fn overrides_only_the_files_present() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("patch.txt"), "  custom {problem_statement}\n").unwrap();

        let t = PromptTemplates::load(Some(tmp.path())).unwrap();
        assert_eq!(t.patch, "custom {problem_statement}");
        assert_eq!(t.query, PromptTemplates::default().query);
    }

    #[test]
    fn token_estimate_counts_chars() {
        assert_eq!(approx_tokens("abcdefgh"), 2);
        assert_eq!(approx_tokens("ééé"), 0);
    }
}
