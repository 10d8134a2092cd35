//! Database path and initialization utilities

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::db::Database;

const DB_DIR: &str = ".repograph";
const DB_FILE: &str = "graph.db";

/// Get the default database path for a repository root
pub fn database_path(repo_root: &Path) -> PathBuf {
    repo_root.join(DB_DIR).join(DB_FILE)
}

/// Use the explicit path if given, otherwise the repository default
pub fn resolve_database_path(explicit: Option<&Path>, repo_root: &Path) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| database_path(repo_root))
}

/// Open or create the database, creating its directory first
pub fn open_or_create_database(db_path: &Path) -> Result<Database> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }
    }
    Database::open(db_path).with_context(|| format!("Could not open {}", db_path.display()))
}

/// Open a database that an earlier `index` run must have created
pub fn open_existing_database(db_path: &Path) -> Result<Database> {
    if !db_path.exists() {
        bail!(
            "No index found at {}. Run 'repograph index' first.",
            db_path.display()
        );
    }
    Database::open(db_path).with_context(|| format!("Could not open {}", db_path.display()))
}

/// Canonicalize and validate a path
pub fn canonicalize_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Invalid path: {}", path.display()))
}
