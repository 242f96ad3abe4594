//! Search request: which files to open and which strings to look for.

/// One file the model asked to inspect.
///
/// `path` is `None` when the entry had no `filepath` element at all. Such
/// entries never touch the filesystem but still show up in the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEntry {
    pub path: Option<String>,
    pub terms: Vec<String>,
}

impl SearchEntry {
    /// Path usable for file access: present and non-empty.
    pub fn usable_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }
}

/// Ordered mapping `path -> terms` with unique keys.
///
/// Insertion order follows the order entries appeared in the response. A
/// repeated path replaces the earlier term list but keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchRequest {
    entries: Vec<SearchEntry>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the term list for `path` (last write wins).
    pub fn insert(&mut self, path: Option<String>, terms: Vec<String>) {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(existing) => existing.terms = terms,
            None => self.entries.push(SearchEntry { path, terms }),
        }
    }

    /// Appends every entry of `other`, with the same last-write-wins rule.
    pub fn extend(&mut self, other: SearchRequest) {
        for e in other.entries {
            self.insert(e.path, e.terms);
        }
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.path.as_deref() == Some(path))
            .map(|e| e.terms.as_slice())
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn last_write_wins_in_original_position() {
        let mut req = SearchRequest::new();
        req.insert(Some("repo/a.py".into()), terms(&["foo"]));
        req.insert(Some("repo/b.py".into()), terms(&["bar"]));
        req.insert(Some("repo/a.py".into()), terms(&["baz"]));

        assert_eq!(req.len(), 2);
        assert_eq!(req.entries()[0].path.as_deref(), Some("repo/a.py"));
        assert_eq!(req.get("repo/a.py"), Some(&["baz".to_string()][..]));
    }

    #[test]
    fn missing_and_blank_paths_are_not_usable() {
        let mut req = SearchRequest::new();
        req.insert(None, terms(&["x"]));
        req.insert(Some(String::new()), terms(&["y"]));
        assert_eq!(req.len(), 2);
        assert!(req.entries().iter().all(|e| e.usable_path().is_none()));
    }
}
