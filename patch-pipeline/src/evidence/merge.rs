use std::collections::BTreeMap;

use super::Snippet;

/// Merges one file's windows into ascending, non-overlapping snippets.
///
/// Windows are sorted by start line. A window starting at most `gap` lines
/// after the end of the current one is absorbed into it: the end becomes the
/// larger of both ends and the line sets are unioned (later text wins on a
/// duplicate line number). Empty windows are ignored.
///
/// Merging an already merged sequence returns it unchanged.
pub fn merge_snippets(mut windows: Vec<Snippet>, gap: usize) -> Vec<Snippet> {
    windows.retain(|w| !w.is_empty());
    windows.sort_by_key(Snippet::start);

    let mut merged: Vec<Snippet> = Vec::with_capacity(windows.len());
    let mut current: Option<(usize, BTreeMap<usize, String>)> = None;

    for w in windows {
        match current.as_mut() {
            Some((end, lines)) if w.start() <= end.saturating_add(gap) => {
                *end = (*end).max(w.end());
                lines.extend(w.into_lines());
            }
            _ => {
                if let Some((_, lines)) = current.take() {
                    merged.push(Snippet::new(lines.into_iter().collect()));
                }
                current = Some((w.end(), w.into_lines().into_iter().collect()));
            }
        }
    }
    if let Some((_, lines)) = current {
        merged.push(Snippet::new(lines.into_iter().collect()));
    }
    merged
}
