//! Line-pattern tables for languages without a syntax-tree analyzer

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Language, SymbolKind};

/// Declaration and import shapes for one language.
///
/// Declaration patterns are anchored at the start of the stripped line;
/// import patterns may match anywhere in it. Every pattern exposes the
/// name or module path as capture group 1.
pub struct LinePatterns {
    functions: Vec<Regex>,
    classes: Vec<Regex>,
    imports: Vec<Regex>,
}

impl LinePatterns {
    fn compile(functions: &[&str], classes: &[&str], imports: &[&str]) -> Self {
        let build = |sources: &[&str]| {
            sources
                .iter()
                .filter_map(|src| Regex::new(src).ok())
                .collect::<Vec<_>>()
        };
        Self {
            functions: build(functions),
            classes: build(classes),
            imports: build(imports),
        }
    }

    /// Symbols declared on this line
    pub fn declarations(&self, line: &str) -> Vec<(SymbolKind, String)> {
        let mut found = Vec::new();
        for (kind, patterns) in [
            (SymbolKind::Function, &self.functions),
            (SymbolKind::Class, &self.classes),
        ] {
            if let Some(name) = patterns.iter().find_map(|re| capture(re, line)) {
                found.push((kind, name));
            }
        }
        found
    }

    /// Module paths referenced by import shapes on this line
    pub fn imports(&self, line: &str) -> Vec<String> {
        self.imports
            .iter()
            .filter_map(|re| capture(re, line))
            .collect()
    }
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Get the line patterns for a given Language
pub fn get_patterns(lang: Language) -> Option<&'static LinePatterns> {
    match lang {
        Language::JavaScript | Language::TypeScript => Some(&*ECMASCRIPT_PATTERNS),
        Language::Rust => Some(&*RUST_PATTERNS),
        Language::Go => Some(&*GO_PATTERNS),
        _ => None,
    }
}

const IDENT: &str = r"([A-Za-z_][A-Za-z0-9_]*)";

static ECMASCRIPT_PATTERNS: Lazy<LinePatterns> = Lazy::new(|| {
    LinePatterns::compile(
        &[format!(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\*?\s+{IDENT}").as_str()],
        &[format!(r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+{IDENT}").as_str()],
        &[
            r#"from\s+["']([^"']+)["']"#,
            r#"require\(\s*["']([^"']+)["']\s*\)"#,
        ],
    )
});

static RUST_PATTERNS: Lazy<LinePatterns> = Lazy::new(|| {
    LinePatterns::compile(
        &[format!(
            r"^(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+\S+\s+)?fn\s+{IDENT}"
        )
        .as_str()],
        &[format!(r"^(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+{IDENT}").as_str()],
        &[r"^(?:pub(?:\([^)]*\))?\s+)?use\s+([A-Za-z_][A-Za-z0-9_:]*[A-Za-z0-9_])"],
    )
});

static GO_PATTERNS: Lazy<LinePatterns> = Lazy::new(|| {
    LinePatterns::compile(
        &[
            format!(r"^func\s+{IDENT}").as_str(),
            format!(r"^func\s+\([^)]*\)\s*{IDENT}").as_str(),
        ],
        &[format!(r"^type\s+{IDENT}\s+struct").as_str()],
        &[r#"^import\s+(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]+)""#],
    )
});
