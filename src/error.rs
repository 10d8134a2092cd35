//! Error types for repograph

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid repository root: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("`{command}` failed: {stderr}")]
    Vcs { command: String, stderr: String },
}
