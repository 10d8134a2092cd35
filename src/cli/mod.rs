//! CLI command implementations
//!
//! Handles all command-line interface operations:
//! - index: Index a repository
//! - callers / impacts / top: Exact graph queries
//! - ask: Evidence-backed answer to a question
//! - docs / pr-impact / migration-guide: Markdown reports
//! - status: Show index statistics

mod commands;
mod db_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::*;
pub use db_utils::*;

#[derive(Parser, Debug)]
#[command(
    name = "repograph",
    version,
    about = "Structural code graph with callers, impact and evidence queries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Graph database path (default: <repo>/.repograph/graph.db)
    #[arg(long, global = true, env = "REPOGRAPH_DB")]
    pub db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a repository (full rebuild unless --incremental)
    Index {
        /// Repository root
        #[arg(default_value = ".")]
        repo: PathBuf,
        /// Skip unchanged files and re-analyze changed ones
        #[arg(long)]
        incremental: bool,
        /// With --incremental, keep earlier rows for changed files
        #[arg(long, requires = "incremental")]
        append_history: bool,
    },

    /// Find call sites of a symbol name
    Callers {
        symbol: String,
        #[arg(long)]
        json: bool,
    },

    /// Find every relation that references a symbol name
    Impacts {
        symbol: String,
        #[arg(long)]
        json: bool,
    },

    /// Show the most referenced symbols
    Top {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },

    /// Ask a natural-language question about the code
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Number of evidence items
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
        #[arg(long)]
        json: bool,
    },

    /// Generate an architecture overview
    Docs {
        #[arg(long, default_value = "ARCHITECTURE.generated.md")]
        out: PathBuf,
    },

    /// Summarize the impact of changes between two revisions
    PrImpact {
        repo: PathBuf,
        #[arg(long)]
        base: String,
        #[arg(long)]
        head: String,
    },

    /// Generate a migration guide between two revisions
    MigrationGuide {
        repo: PathBuf,
        from: String,
        to: String,
    },

    /// Show index statistics
    Status,
}
