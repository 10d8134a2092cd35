//! Code extraction module
//!
//! Turns a source file into declared symbols and outgoing relations.
//! Python gets a full tree-sitter walk with scope tracking; the remaining
//! languages are scanned line by line against a few declaration patterns.
//!
//! Analysis never fails: unparseable or unsupported input yields an empty
//! [`FileAnalysis`] with `error` set, so one bad file cannot abort a run.

mod languages;
mod python;

use crate::types::{ExtractedRelation, ExtractedSymbol, FileAnalysis, Language, RelationKind};

pub use python::PythonAnalyzer;

/// Per-language analyzer dispatch
pub enum Analyzer {
    /// Syntax-tree traversal
    Precise(PythonAnalyzer),
    /// Line-pattern matching
    Approximate(Language),
}

impl Analyzer {
    pub fn for_language(language: Language) -> Option<Self> {
        match language {
            Language::Python => Some(Analyzer::Precise(PythonAnalyzer::new())),
            Language::Unknown => None,
            other => Some(Analyzer::Approximate(other)),
        }
    }

    pub fn analyze(&mut self, content: &str) -> FileAnalysis {
        match self {
            Analyzer::Precise(analyzer) => analyzer.analyze(content),
            Analyzer::Approximate(language) => analyze_lines(*language, content),
        }
    }
}

/// Analyze in-memory content for the given language
pub fn analyze(content: &str, language: Language) -> FileAnalysis {
    match Analyzer::for_language(language) {
        Some(mut analyzer) => analyzer.analyze(content),
        None => FileAnalysis::failed(language, "unsupported language"),
    }
}

/// Approximate extraction: anchored declaration patterns per stripped line.
/// No scope is tracked, so every relation has a null source.
fn analyze_lines(language: Language, content: &str) -> FileAnalysis {
    let mut result = FileAnalysis::empty(language);
    let Some(patterns) = languages::get_patterns(language) else {
        return result;
    };

    for (idx, line) in content.lines().enumerate() {
        let lineno = Some(idx as u32 + 1);
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        for (kind, name) in patterns.declarations(stripped) {
            result.symbols.push(ExtractedSymbol { name, kind, lineno });
        }

        for target in patterns.imports(stripped) {
            result.relations.push(ExtractedRelation {
                target,
                kind: RelationKind::Imports,
                lineno,
                source: None,
            });
        }
    }

    result
}
