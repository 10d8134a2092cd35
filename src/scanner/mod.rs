//! Source file discovery
//!
//! Walks a repository root and yields the files worth analyzing. Hidden
//! entries and vendor/build-output directories prune their whole subtree;
//! only extensions from the language table are yielded.

use std::path::{Component, Path, PathBuf};

use ignore::{Walk, WalkBuilder};

use crate::error::{GraphError, Result};
use crate::types::Language;
use crate::IndexConfig;

/// A candidate source file found under the repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Repository-relative path with `/` separators
    pub relative: String,
    pub language: Language,
}

/// Walks a root directory for source files
pub struct SourceScanner {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>, config: &IndexConfig) -> Self {
        Self {
            root: root.into(),
            exclude_dirs: config.exclude_dirs.clone(),
            respect_gitignore: config.respect_gitignore,
        }
    }

    /// Start a fresh traversal. The returned iterator is lazy and single-use.
    pub fn scan(&self) -> SourceFiles {
        let exclude_dirs = self.exclude_dirs.clone();

        let mut walker = WalkBuilder::new(&self.root);
        walker
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') {
                    return false;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && exclude_dirs.iter().any(|d| d.as_str() == name))
            });

        SourceFiles {
            root: self.root.clone(),
            walk: walker.build(),
        }
    }
}

/// Lazy sequence of source files; walk errors are yielded, not skipped
pub struct SourceFiles {
    root: PathBuf,
    walk: Walk,
}

impl Iterator for SourceFiles {
    type Item = Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(GraphError::Walk(err))),
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let language = Language::from_extension(ext);
            if language == Language::Unknown {
                continue;
            }

            return Some(Ok(SourceFile {
                relative: relative_path(&self.root, path),
                path: path.to_path_buf(),
                language,
            }));
        }
    }
}

/// Repository-relative path joined with `/` regardless of platform
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn scan_relative(root: &Path) -> Vec<String> {
        let scanner = SourceScanner::new(root, &IndexConfig::default());
        scanner
            .scan()
            .map(|f| f.unwrap().relative)
            .collect::<Vec<_>>()
    }

    #[test]
    fn test_yields_supported_extensions_only() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app.py");
        touch(dir.path(), "web/index.ts");
        touch(dir.path(), "README.md");
        touch(dir.path(), "Main.java");

        let files = scan_relative(dir.path());
        assert_eq!(files, vec!["app.py", "web/index.ts"]);
    }

    #[test]
    fn test_hidden_segments_prune_subtree() {
        let dir = tempdir().unwrap();
        touch(dir.path(), ".git/hooks/pre_commit.py");
        touch(dir.path(), "pkg/.cache/gen.py");
        touch(dir.path(), ".hidden.py");
        touch(dir.path(), "pkg/visible.py");

        let files = scan_relative(dir.path());
        assert_eq!(files, vec!["pkg/visible.py"]);
    }

    #[test]
    fn test_vendor_and_build_dirs_excluded() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "node_modules/lib/index.js");
        touch(dir.path(), "target/debug/build.rs");
        touch(dir.path(), "web/dist/bundle.js");
        touch(dir.path(), "src/main.rs");

        let files = scan_relative(dir.path());
        assert_eq!(files, vec!["src/main.rs"]);
    }

    #[test]
    fn test_file_named_like_excluded_dir_is_kept() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/target.py");

        let files = scan_relative(dir.path());
        assert_eq!(files, vec!["src/target.py"]);
    }

    #[test]
    fn test_root_inside_hidden_directory_still_scans() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".workspace").join("repo");
        touch(&root, "lib.go");

        let files = scan_relative(&root);
        assert_eq!(files, vec!["lib.go"]);
    }

    #[test]
    fn test_missing_root_yields_error() {
        let dir = tempdir().unwrap();
        let scanner = SourceScanner::new(dir.path().join("nope"), &IndexConfig::default());
        let results: Vec<_> = scanner.scan().collect();
        assert!(results.iter().any(|r| r.is_err()));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        let path = Path::new("/repo/a/b/c.py");
        assert_eq!(relative_path(root, path), "a/b/c.py");
    }
}
