//! repograph: structural code graph for a source tree
//!
//! Usage:
//!   repograph index [repo]                  Build the graph (full rebuild)
//!   repograph index [repo] --incremental    Re-analyze changed files only
//!   repograph callers <symbol>              Who calls this name
//!   repograph impacts <symbol>              What references this name
//!   repograph ask <question...>             Evidence for a free-text question
//!   repograph docs --out FILE               Architecture overview
//!   repograph pr-impact <repo> --base A --head B
//!   repograph migration-guide <repo> <from> <to>

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use repograph::cli::{
    ask_command, callers_command, docs_command, impacts_command, index_command,
    migration_guide_command, pr_impact_command, resolve_database_path, status_command,
    top_command, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let db = cli.db.as_deref();
    let cwd_db = || resolve_database_path(db, Path::new("."));

    match cli.command {
        Commands::Index {
            repo,
            incremental,
            append_history,
        } => {
            let db_path = resolve_database_path(db, &repo);
            index_command(&repo, &db_path, incremental, append_history)?;
        }
        Commands::Callers { symbol, json } => callers_command(&cwd_db(), &symbol, json)?,
        Commands::Impacts { symbol, json } => impacts_command(&cwd_db(), &symbol, json)?,
        Commands::Top { limit, json } => top_command(&cwd_db(), limit, json)?,
        Commands::Ask {
            question,
            limit,
            json,
        } => ask_command(&cwd_db(), &question.join(" "), limit, json)?,
        Commands::Docs { out } => docs_command(&cwd_db(), &out)?,
        Commands::PrImpact { repo, base, head } => {
            let db_path = resolve_database_path(db, &repo);
            pr_impact_command(&repo, &db_path, &base, &head)?;
        }
        Commands::MigrationGuide { repo, from, to } => {
            migration_guide_command(&repo, &from, &to)?;
        }
        Commands::Status => status_command(&cwd_db())?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
