//! Directory traversal producing candidate file paths.
//!
//! # Overview
//!
//! The [`Walker`] yields a lazy, finite sequence of file paths under a root,
//! optionally restricted to a set of file extensions (compared
//! case-insensitively). Directories are never yielded; unreadable entries
//! are logged and skipped so traversal problems never abort a scan.
//!
//! Traversal is sequential and depth-first, matching the single-writer scan
//! model in [`crate::scan`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Sequential file discovery under a single root.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    extensions: Option<HashSet<String>>,
}

impl Walker {
    /// Create a walker over all files under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: None,
        }
    }

    /// Restrict the walk to files whose extension is in `extensions`.
    ///
    /// Comparison is case-insensitive; leading dots are accepted and
    /// stripped, so `"JPG"`, `"jpg"` and `".jpg"` are equivalent. An empty
    /// set means no restriction.
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        let set: HashSet<String> = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self.extensions = if set.is_empty() { None } else { Some(set) };
        self
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(ref wanted) = self.extensions else {
            return true;
        };
        path.extension()
            .map(|ext| wanted.contains(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false)
    }

    /// Lazily yield candidate file paths.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(e) if e.file_type().is_file() => {
                    let path = e.into_path();
                    if self.matches_extension(&path) {
                        Some(path)
                    } else {
                        None
                    }
                }
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Skipping unreadable entry during walk: {}", e);
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_walk_yields_only_files() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();

        let walker = Walker::new(dir.path());
        let mut files: Vec<PathBuf> = walker.walk().collect();
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("upper.JPG"), b"x").unwrap();
        fs::write(dir.path().join("lower.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("noext"), b"x").unwrap();

        let walker = Walker::new(dir.path()).with_extensions(&["jpg".to_string()]);
        let files: Vec<PathBuf> = walker.walk().collect();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_extension_filter_accepts_leading_dot() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), b"x").unwrap();
        fs::write(dir.path().join("b.go"), b"x").unwrap();

        let walker = Walker::new(dir.path()).with_extensions(&[".RS".to_string()]);
        let files: Vec<PathBuf> = walker.walk().collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().ends_with("a.rs"));
    }

    #[test]
    fn test_empty_extension_set_means_no_filter() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), b"x").unwrap();

        let walker = Walker::new(dir.path()).with_extensions(&[]);
        assert_eq!(walker.walk().count(), 1);
    }
}
