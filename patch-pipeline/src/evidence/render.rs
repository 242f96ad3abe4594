use std::fmt::Write as _;
use std::path::Path;

use super::FileEvidence;

const HEADER: &str = "Search Results (by file, merging any overlapping context):\n\n";
const UNSPECIFIED: &str = "<unspecified>";

/// Serializes evidence into the report fed to the patch and verify prompts.
///
/// Files appear in request order; labels have `repo_root` stripped when the
/// path starts with it. Output is deterministic for a fixed input.
pub fn render_evidence(files: &[FileEvidence], repo_root: &Path) -> String {
    let mut out = String::from(HEADER);
    let rule_thin = "-".repeat(60);
    let rule_thick = "=".repeat(60);

    for file in files {
        let _ = writeln!(out, "FILE: {}", label(file.path.as_deref(), repo_root));
        let _ = writeln!(out, "{rule_thin}");

        if file.snippets.is_empty() {
            out.push_str("  No matches found.\n");
        } else {
            for (idx, snip) in file.snippets.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "Match #{}, lines {} to {}:",
                    idx + 1,
                    snip.start(),
                    snip.end()
                );
                for (n, text) in snip.lines() {
                    let _ = writeln!(out, "  {n:>3} | {text}");
                }
                out.push('\n');
            }
        }
        let _ = writeln!(out, "{rule_thick}\n");
    }
    out
}

fn label(path: Option<&str>, repo_root: &Path) -> String {
    match path {
        None => UNSPECIFIED.to_string(),
        Some(p) => match Path::new(p).strip_prefix(repo_root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
            _ => p.to_string(),
        },
    }
}
