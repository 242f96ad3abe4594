//! Flat file listing of a repository, fed to the query prompt.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::PipelineError;

/// Lists every regular file under `root`, one path per line.
///
/// Paths keep the `root` prefix exactly as passed in, so the model can echo
/// them back and the extractor can open them as given. Entries are sorted by
/// file name within each directory. Directories whose name is in `skip_dirs`
/// are not descended into.
///
/// # Errors
/// - [`PipelineError::RepoRoot`] if `root` is not a directory
/// - [`PipelineError::Walk`] if `root` itself cannot be read
pub fn stringify_directory(root: &Path, skip_dirs: &[String]) -> Result<String, PipelineError> {
    if !root.is_dir() {
        return Err(PipelineError::RepoRoot(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e, skip_dirs));

    let mut paths = Vec::new();
    let mut unreadable = 0usize;
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(PipelineError::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                unreadable += 1;
                warn!("indexer: skip unreadable entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() {
            paths.push(entry.path().display().to_string());
        }
    }

    info!(
        root = %root.display(),
        files = paths.len(),
        unreadable,
        "indexer: listing built"
    );
    Ok(paths.join("\n"))
}

fn is_skipped(e: &DirEntry, skip_dirs: &[String]) -> bool {
    if e.depth() == 0 || !e.file_type().is_dir() {
        return false;
    }
    let name = e.file_name().to_string_lossy();
    let skip = skip_dirs.iter().any(|d| *d == name);
    if skip {
        debug!("indexer: skip dir {}", e.path().display());
    }
    skip
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn lists_files_with_root_prefix_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("b.py"), "").unwrap();
        fs::write(root.join("a.py"), "").unwrap();
        fs::write(root.join("pkg/sub/c.py"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();

        let listing = stringify_directory(root, &[".git".to_string()]).unwrap();
        let lines: Vec<&str> = listing.lines().collect();

        let expected: Vec<String> = ["a.py", "b.py", "pkg/sub/c.py"]
            .iter()
            .map(|p| root.join(p).display().to_string())
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = stringify_directory(&tmp.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::RepoRoot(_)));
    }

    #[test]
    fn empty_directory_gives_empty_listing() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(stringify_directory(tmp.path(), &[]).unwrap(), "");
    }
}
