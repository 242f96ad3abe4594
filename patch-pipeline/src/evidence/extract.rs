use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{FileEvidence, LineHit, Snippet, merge_snippets};
use crate::query::SearchRequest;

/// Builds merged evidence for every entry of `req`, in request order.
///
/// Missing, unreadable or path-less entries yield an empty snippet list so the
/// report can still mark them as "no matches".
pub fn collect_evidence(req: &SearchRequest, radius: usize, gap: usize) -> Vec<FileEvidence> {
    let files: Vec<FileEvidence> = req
        .entries()
        .iter()
        .map(|entry| {
            let snippets = match entry.usable_path().and_then(|p| read_lines(p).map(|l| (p, l))) {
                Some((path, lines)) => {
                    let windows: Vec<Snippet> = find_hits(path, &lines, &entry.terms)
                        .iter()
                        .map(|hit| context_window(&lines, hit.line, radius))
                        .collect();
                    let merged = merge_snippets(windows, gap);
                    debug!(path, snippets = merged.len(), "evidence: merged windows");
                    merged
                }
                None => {
                    debug!(path = ?entry.path, "evidence: not a readable file");
                    Vec::new()
                }
            };
            FileEvidence {
                path: entry.path.clone(),
                snippets,
            }
        })
        .collect();

    info!(
        files = files.len(),
        with_matches = files.iter().filter(|f| !f.snippets.is_empty()).count(),
        "evidence: collected"
    );
    files
}

/// Every line of `lines` containing any of `terms` (plain, case-sensitive
/// substring match).
pub fn find_hits(path: &str, lines: &[String], terms: &[String]) -> Vec<LineHit> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| terms.iter().any(|t| line.contains(t.as_str())))
        .map(|(idx, line)| LineHit {
            path: path.to_string(),
            line: idx + 1,
            text: line.clone(),
        })
        .collect()
}

/// Window `[line - radius, line + radius]` clipped to `[1, lines.len()]`.
pub fn context_window(lines: &[String], line: usize, radius: usize) -> Snippet {
    let start = line.saturating_sub(radius).max(1);
    let end = line.saturating_add(radius).min(lines.len());
    Snippet::new(
        (start..=end)
            .filter_map(|n| lines.get(n - 1).map(|t| (n, t.clone())))
            .collect(),
    )
}

/// Reads a regular file as lossy UTF-8 lines; `None` if it cannot be read.
fn read_lines(path: &str) -> Option<Vec<String>> {
    let p = Path::new(path);
    if !p.is_file() {
        return None;
    }
    match fs::read(p) {
        Ok(bytes) => Some(split_lines(&String::from_utf8_lossy(&bytes))),
        Err(err) => {
            debug!(path, error = %err, "evidence: read failed");
            None
        }
    }
}

/// Splits on `\n`, `\r\n` and a lone `\r`; a trailing terminator adds no line.
fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn window_is_clipped_to_file_bounds() {
        let lines = numbered(5);
        let w = context_window(&lines, 1, 10);
        assert_eq!((w.start(), w.end()), (1, 5));

        let w = context_window(&lines, 3, 1);
        assert_eq!((w.start(), w.end()), (2, 4));
        assert_eq!(w.lines()[1], (3, "line 3".to_string()));
    }

    #[test]
    fn hits_are_case_sensitive_substrings() {
        let lines: Vec<String> = ["def calculate(x):", "    return x*2", "CALCULATE("]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let hits = find_hits("foo.py", &lines, &["calculate(".to_string()]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 1);
        assert_eq!(hits[0].text, "def calculate(x):");
    }

    #[test]
    fn every_newline_convention_ends_a_line() {
        assert_eq!(split_lines("a\r\nb\rc\n\nd\r"), vec!["a", "b", "c", "", "d"]);
    }

    #[test]
    fn carriage_return_files_keep_line_numbers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mac.py");
        fs::write(&path, "import os\rdef calculate(x):\r    return x*2\r").unwrap();

        let mut req = SearchRequest::new();
        req.insert(Some(path.display().to_string()), vec!["calculate(".into()]);
        let ev = collect_evidence(&req, 0, 0);

        let s = &ev[0].snippets[0];
        assert_eq!((s.start(), s.end()), (2, 2));
        assert_eq!(s.lines()[0].1, "def calculate(x):");
    }

    #[test]
    fn def_line_with_radius_one() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("foo.py");
        fs::write(
            &path,
            "import os\n\ndef calculate(x):\n    return x*2\n\nprint(calculate(2))\n",
        )
        .unwrap();
        let path = path.display().to_string();

        let mut req = SearchRequest::new();
        req.insert(Some(path.clone()), vec!["def calculate(".into()]);
        let ev = collect_evidence(&req, 1, 0);

        assert_eq!(ev.len(), 1);
        assert_eq!(ev[0].snippets.len(), 1);
        let s = &ev[0].snippets[0];
        assert_eq!((s.start(), s.end()), (2, 4));
        assert_eq!(s.lines()[1].1, "def calculate(x):");
    }

    #[test]
    fn two_hits_five_lines_apart_merge_with_default_radius() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("m.py");
        let body: Vec<String> = (1..=40)
            .map(|i| match i {
                15 | 20 => format!("x = target({i})"),
                _ => format!("pass  # {i}"),
            })
            .collect();
        fs::write(&path, body.join("\n")).unwrap();

        let mut req = SearchRequest::new();
        req.insert(Some(path.display().to_string()), vec!["target(".into()]);
        let ev = collect_evidence(&req, 10, 0);

        assert_eq!(ev[0].snippets.len(), 1);
        let s = &ev[0].snippets[0];
        assert_eq!((s.start(), s.end()), (5, 30));
        assert_eq!(s.lines().len(), 26);
    }

    #[test]
    fn missing_file_and_null_path_keep_their_slot() {
        let mut req = SearchRequest::new();
        req.insert(Some("/definitely/not/here.py".into()), vec!["x".into()]);
        req.insert(None, vec!["x".into()]);
        let ev = collect_evidence(&req, 10, 0);
        assert_eq!(ev.len(), 2);
        assert!(ev.iter().all(|f| f.snippets.is_empty()));
        assert_eq!(ev[1].path, None);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bin.txt");
        fs::write(&path, b"ok\nbad \xff needle\n").unwrap();

        let mut req = SearchRequest::new();
        req.insert(Some(path.display().to_string()), vec!["needle".into()]);
        let ev = collect_evidence(&req, 0, 0);
        let s = &ev[0].snippets[0];
        assert_eq!(s.start(), 2);
        assert!(s.lines()[0].1.contains('\u{FFFD}'));
    }
}
