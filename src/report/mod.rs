//! Markdown reports built on the code graph
//!
//! - Architecture overview: store totals plus the most referenced symbols
//! - PR impact: changed files and the names they reference
//! - Migration guide: diff summary between two revisions

use std::path::Path;

use tracing::info;

use crate::db::Database;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::vcs::{parse_name_status, DiffProvider};

/// Symbols listed in the architecture overview
pub const ARCHITECTURE_TOP_SYMBOLS: u32 = 20;

/// Referenced names listed in a PR impact summary
pub const PR_IMPACT_LIMIT: u32 = 200;

/// Render the architecture overview
pub fn architecture_doc(db: &Database) -> Result<String> {
    let stats = db.stats()?;
    let top = Graph::new(db).top_symbols(ARCHITECTURE_TOP_SYMBOLS)?;

    let mut lines = vec![
        "# Generated Architecture Overview".to_string(),
        String::new(),
        format!("- Files indexed: **{}**", stats.files),
        format!("- Symbols indexed: **{}**", stats.symbols),
        format!("- Relations indexed: **{}**", stats.relations),
    ];
    for (language, count) in &stats.languages {
        lines.push(format!("  - {}: {} files", language.as_str(), count));
    }
    lines.push(String::new());
    lines.push("## Most referenced symbols".to_string());
    lines.push(String::new());

    if top.is_empty() {
        lines.push("No symbols indexed yet.".to_string());
    } else {
        for symbol in top {
            lines.push(format!(
                "- `{}` ({}) - inbound refs: {}",
                symbol.name,
                symbol.kind.as_str(),
                symbol.inbound_refs
            ));
        }
    }

    Ok(lines.join("\n") + "\n")
}

/// Render the architecture overview and write it to `out`
pub fn write_architecture_doc(db: &Database, out: &Path) -> Result<()> {
    let doc = architecture_doc(db)?;
    std::fs::write(out, doc).map_err(|source| GraphError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    info!("Wrote architecture overview to {}", out.display());
    Ok(())
}

/// Summarize which indexed names a revision range touches
pub fn pr_impact(
    db: &Database,
    diff: &dyn DiffProvider,
    base: &str,
    head: &str,
) -> Result<String> {
    let changed: Vec<String> = parse_name_status(&diff.name_status(base, head)?)
        .into_iter()
        .map(|f| f.path)
        .collect();
    if changed.is_empty() {
        return Ok("No file changes found between refs.".to_string());
    }

    let impacted = db.relation_targets_in_files(&changed, PR_IMPACT_LIMIT)?;

    let mut lines = vec![
        "# PR Impact Summary".to_string(),
        String::new(),
        "## Changed files".to_string(),
    ];
    lines.extend(changed.iter().map(|p| format!("- `{}`", p)));
    lines.push(String::new());
    lines.push("## Potentially impacted symbols".to_string());

    if impacted.is_empty() {
        lines.push("- No impacted symbols found in index for changed files.".to_string());
    } else {
        lines.extend(impacted.iter().map(|s| format!("- `{}`", s)));
    }

    Ok(lines.join("\n"))
}

/// Render upgrade notes between two revisions
pub fn migration_guide(diff: &dyn DiffProvider, from: &str, to: &str) -> Result<String> {
    let summary = diff.stat(from, to)?;
    let changed = diff.name_status(from, to)?;

    let or_default = |text: &str, fallback: &str| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    };

    let lines = [
        format!("# Migration Guide: {} -> {}", from, to),
        String::new(),
        "## Diff Summary".to_string(),
        or_default(&summary, "No changes."),
        String::new(),
        "## Changed Files".to_string(),
        "```".to_string(),
        or_default(&changed, "No changed files."),
        "```".to_string(),
        String::new(),
        "## Suggested Upgrade Steps".to_string(),
        "1. Review breaking API or schema changes in modified modules.".to_string(),
        "2. Re-run indexing and inspect impacted symbols.".to_string(),
        "3. Run targeted tests around changed files first, then full suite.".to_string(),
    ];
    Ok(lines.join("\n"))
}
