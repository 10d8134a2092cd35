//! Version-control diff collaborator
//!
//! Reports need two views of a revision range: the name-status listing and
//! the stat summary. Any failure is fatal and surfaces as
//! [`GraphError::Vcs`]; nothing is retried.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{GraphError, Result};

/// Source of diffs between two revisions
pub trait DiffProvider {
    /// `git diff --name-status` style output: one `STATUS\tPATH[\tPATH]` per line
    fn name_status(&self, base: &str, head: &str) -> Result<String>;

    /// Human-readable diff stat summary
    fn stat(&self, base: &str, head: &str) -> Result<String>;
}

/// Diff provider backed by the `git` executable
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn diff(&self, flag: &str, base: &str, head: &str) -> Result<String> {
        let range = format!("{}..{}", base, head);
        let command = format!("git -C {} diff {} {}", self.repo.display(), flag, range);
        debug!("Running {}", command);

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .arg("diff")
            .arg(flag)
            .arg(&range)
            .output()
            .map_err(|source| GraphError::Io {
                path: self.repo.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GraphError::Vcs {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DiffProvider for GitCli {
    fn name_status(&self, base: &str, head: &str) -> Result<String> {
        self.diff("--name-status", base, head)
    }

    fn stat(&self, base: &str, head: &str) -> Result<String> {
        self.diff("--stat", base, head)
    }
}

/// One entry of a name-status listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Status letter(s), e.g. `M`, `A`, `D`, `R100`
    pub status: String,
    /// Path after the change; the new path for renames and copies
    pub path: String,
}

/// Parse name-status output, skipping blank or malformed lines
pub fn parse_name_status(output: &str) -> Vec<ChangedFile> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.trim_end().split('\t');
            let status = fields.next()?.trim();
            let path = fields.last()?.trim();
            if status.is_empty() || path.is_empty() {
                return None;
            }
            Some(ChangedFile {
                status: status.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}
