//! Command implementations for CLI operations

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::evidence::{format_answer, EvidenceRetriever, RetrievalOptions};
use crate::graph::Graph;
use crate::report;
use crate::vcs::GitCli;
use crate::{index_repository, IndexConfig};

use super::db_utils::{canonicalize_path, open_existing_database, open_or_create_database};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_line(lineno: Option<u32>) -> String {
    lineno.map_or_else(|| "?".to_string(), |l| l.to_string())
}

/// Index a repository into the given database
pub fn index_command(
    repo: &Path,
    db_path: &Path,
    incremental: bool,
    append_history: bool,
) -> Result<()> {
    let root = canonicalize_path(repo)?;
    let mut db = open_or_create_database(db_path)?;

    let config = IndexConfig {
        root: root.clone(),
        reset: !incremental,
        append_history,
        ..Default::default()
    };
    let stats = index_repository(&mut db, &config)
        .with_context(|| format!("Indexing {} failed", root.display()))?;

    println!("Indexed repo: {}", root.display());
    println!("DB: {}", db_path.display());
    println!(
        "Files={} Symbols={} Relations={}",
        stats.files, stats.symbols, stats.relations
    );
    if incremental {
        println!(
            "  Analyzed: {}  Unchanged: {}",
            stats.analyzed, stats.skipped
        );
    }
    if stats.failed > 0 {
        println!("  Unparseable files: {}", stats.failed);
    }

    Ok(())
}

/// List the call sites of a name
pub fn callers_command(db_path: &Path, symbol: &str, json: bool) -> Result<()> {
    let db = open_existing_database(db_path)?;
    let rows = Graph::new(&db).callers_of(symbol)?;

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No callers found.");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}:{} caller={}",
            row.path,
            display_line(row.lineno),
            row.caller.as_deref().unwrap_or("None")
        );
    }
    Ok(())
}

/// List every relation pointing at a name
pub fn impacts_command(db_path: &Path, symbol: &str, json: bool) -> Result<()> {
    let db = open_existing_database(db_path)?;
    let report = Graph::new(&db).impact_report(symbol)?;

    if json {
        return print_json(&report);
    }
    if report.total == 0 {
        println!("No impacts found.");
        return Ok(());
    }
    for rows in report.by_relation.values() {
        for row in rows {
            println!(
                "{}:{} type={} dependent={}",
                row.path,
                display_line(row.lineno),
                row.relation_type.as_str(),
                row.dependent.as_deref().unwrap_or("None")
            );
        }
    }
    if report.is_dangling() {
        println!("(`{}` is not declared in any indexed file)", symbol);
    }
    Ok(())
}

/// Show the most referenced symbols
pub fn top_command(db_path: &Path, limit: u32, json: bool) -> Result<()> {
    let db = open_existing_database(db_path)?;
    let top = Graph::new(&db).top_symbols(limit)?;

    if json {
        return print_json(&top);
    }
    if top.is_empty() {
        println!("No symbols indexed yet.");
        return Ok(());
    }
    for symbol in top {
        println!(
            "{:>6}  {} ({})",
            symbol.inbound_refs,
            symbol.name,
            symbol.kind.as_str()
        );
    }
    Ok(())
}

/// Answer a free-text question from graph evidence
pub fn ask_command(db_path: &Path, question: &str, limit: u32, json: bool) -> Result<()> {
    let db = open_existing_database(db_path)?;
    let evidence = EvidenceRetriever::new(&db).retrieve(question, &RetrievalOptions { limit })?;

    if json {
        return print_json(&evidence);
    }
    println!("{}", format_answer(question, &evidence));
    Ok(())
}

/// Write the architecture overview
pub fn docs_command(db_path: &Path, out: &Path) -> Result<()> {
    let db = open_existing_database(db_path)?;
    report::write_architecture_doc(&db, out)?;
    println!("Wrote: {}", out.display());
    Ok(())
}

/// Summarize a revision range against the index
pub fn pr_impact_command(repo: &Path, db_path: &Path, base: &str, head: &str) -> Result<()> {
    let root = canonicalize_path(repo)?;
    let db = open_existing_database(db_path)?;
    let text = report::pr_impact(&db, &GitCli::new(root), base, head)?;
    println!("{}", text);
    Ok(())
}

/// Print upgrade notes between two revisions
pub fn migration_guide_command(repo: &Path, from: &str, to: &str) -> Result<()> {
    let root = canonicalize_path(repo)?;
    let text = report::migration_guide(&GitCli::new(root), from, to)?;
    println!("{}", text);
    Ok(())
}

/// Show index statistics
pub fn status_command(db_path: &Path) -> Result<()> {
    let db = open_existing_database(db_path)?;
    let stats = db.stats()?;

    println!("repograph Index Status");
    println!("======================");
    println!("Database: {}", db_path.display());
    println!("Files: {}", stats.files);
    println!("Symbols: {}", stats.symbols);
    println!("Relations: {}", stats.relations);

    if !stats.languages.is_empty() {
        println!("\nLanguages:");
        for (lang, count) in &stats.languages {
            println!("  {}: {} files", lang.as_str(), count);
        }
    }

    Ok(())
}
