//! repograph: approximate structural index of a multi-language source tree
//!
//! Builds a graph of declared symbols (functions and classes) and the
//! name-resolved relations between them (calls, imports, inheritance), stored
//! in SQLite, and answers questions over it.
//!
//! ## Features
//!
//! - Precise Python extraction via tree-sitter, with scope attribution
//! - Line-pattern extraction for JavaScript, TypeScript, Rust and Go
//! - Exact queries: callers of a name, impacts of a name, most referenced symbols
//! - Heuristic evidence retrieval for free-text questions
//! - Incremental re-indexing keyed on content hashes
//!
//! ## Reports
//!
//! - Architecture overview
//! - PR impact summary between two revisions
//! - Migration guide between two revisions

pub mod cli;
pub mod db;
pub mod error;
pub mod evidence;
pub mod extraction;
pub mod graph;
pub mod report;
pub mod scanner;
pub mod types;
pub mod vcs;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use db::Database;
use error::{GraphError, Result};
use extraction::Analyzer;
use scanner::SourceScanner;
use types::{FileAnalysis, Language};

/// Configuration for indexing
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Root directory to index
    pub root: PathBuf,
    /// Directory names whose subtrees are never scanned
    pub exclude_dirs: Vec<String>,
    /// Whether to follow gitignore rules
    pub respect_gitignore: bool,
    /// Clear the whole store before indexing
    pub reset: bool,
    /// Without reset, re-analyze every file and keep earlier rows
    /// instead of skipping unchanged files and purging changed ones
    pub append_history: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude_dirs: vec![
                "node_modules".to_string(),
                "target".to_string(),
                "dist".to_string(),
                "build".to_string(),
                "__pycache__".to_string(),
                "venv".to_string(),
                "vendor".to_string(),
            ],
            respect_gitignore: false,
            reset: true,
            append_history: false,
        }
    }
}

/// Statistics from indexing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Files in the store after the run
    pub files: u64,
    /// Symbols in the store after the run
    pub symbols: u64,
    /// Relations in the store after the run
    pub relations: u64,
    /// Files analyzed during this run
    pub analyzed: u64,
    /// Unchanged files skipped during this run
    pub skipped: u64,
    /// Files that could not be read or parsed
    pub failed: u64,
}

/// Index a repository into the database.
///
/// The whole run is one transaction: on error nothing it wrote is kept.
pub fn index_repository(db: &mut Database, config: &IndexConfig) -> Result<IndexStats> {
    let root = config
        .root
        .canonicalize()
        .map_err(|_| GraphError::InvalidRoot(config.root.clone()))?;
    if !root.is_dir() {
        return Err(GraphError::InvalidRoot(config.root.clone()));
    }
    info!("Indexing repository at {}", root.display());

    db.begin_transaction()?;
    let mut stats = match index_files(db, &root, config) {
        Ok(stats) => stats,
        Err(err) => {
            if let Err(rollback_err) = db.rollback() {
                warn!("Rollback failed: {}", rollback_err);
            }
            return Err(err);
        }
    };
    db.commit()?;

    let totals = db.stats()?;
    stats.files = totals.files;
    stats.symbols = totals.symbols;
    stats.relations = totals.relations;

    info!(
        "Indexed {} files, {} symbols, {} relations ({} analyzed, {} unchanged, {} failed)",
        stats.files, stats.symbols, stats.relations, stats.analyzed, stats.skipped, stats.failed
    );
    Ok(stats)
}

fn index_files(db: &mut Database, root: &Path, config: &IndexConfig) -> Result<IndexStats> {
    if config.reset {
        db.reset()?;
    }
    let purge_changed = !config.reset && !config.append_history;

    let mut stats = IndexStats::default();
    let mut analyzers: HashMap<Language, Option<Analyzer>> = HashMap::new();

    for file in SourceScanner::new(root, config).scan() {
        let file = file?;
        let content = std::fs::read_to_string(&file.path);
        let content_hash = content.as_ref().ok().map(|c| hash_content(c));

        if purge_changed {
            if let Some(existing) = db.get_file(&file.relative)? {
                if content_hash.is_some() && existing.content_hash == content_hash {
                    debug!("Skipping unchanged file: {}", file.relative);
                    stats.skipped += 1;
                    continue;
                }
                db.clear_file(existing.id)?;
            }
        }

        debug!("Indexing: {}", file.relative);
        let analysis = match &content {
            Ok(text) => match analyzers
                .entry(file.language)
                .or_insert_with(|| Analyzer::for_language(file.language))
            {
                Some(analyzer) => analyzer.analyze(text),
                None => FileAnalysis::failed(file.language, "unsupported language"),
            },
            Err(err) => FileAnalysis::failed(file.language, format!("read failed: {}", err)),
        };
        stats.analyzed += 1;
        if let Some(ref err) = analysis.error {
            debug!("Recovered from failure in {}: {}", file.relative, err);
            stats.failed += 1;
        }

        let file_id = db.upsert_file(&file.relative, file.language, content_hash.as_deref())?;

        // Extraction indices map to store ids by position
        let mut symbol_ids = Vec::with_capacity(analysis.symbols.len());
        for symbol in &analysis.symbols {
            symbol_ids.push(db.insert_symbol(file_id, &symbol.name, symbol.kind, symbol.lineno)?);
        }

        for relation in &analysis.relations {
            let src = relation.source.and_then(|i| symbol_ids.get(i).copied());
            db.insert_relation(file_id, src, &relation.target, relation.kind, relation.lineno)?;
        }
    }

    Ok(stats)
}

/// SHA-256 of the file contents, hex encoded
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hash_content_is_stable() {
        assert_eq!(hash_content("abc"), hash_content("abc"));
        assert_ne!(hash_content("abc"), hash_content("abd"));
        assert_eq!(hash_content("").len(), 64);
    }

    #[test]
    fn test_invalid_root() {
        let mut db = Database::in_memory().unwrap();
        let config = IndexConfig {
            root: PathBuf::from("/definitely/not/a/repo"),
            ..Default::default()
        };
        assert!(matches!(
            index_repository(&mut db, &config),
            Err(GraphError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let mut db = Database::in_memory().unwrap();
        let config = IndexConfig {
            root: file,
            ..Default::default()
        };
        assert!(index_repository(&mut db, &config).is_err());
    }

    #[test]
    fn test_counts_analyzed_and_failed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("ok.py"), "def ok():\n    pass\n").unwrap();
        std::fs::write(dir.path().join("bad.py"), "def bad(:\n").unwrap();

        let mut db = Database::in_memory().unwrap();
        let config = IndexConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        let stats = index_repository(&mut db, &config).unwrap();
        assert_eq!(stats.analyzed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.symbols, 1);
    }
}
