//! Core type definitions for repograph
//!
//! Defines the fundamental types for representing code structure:
//! - Symbols: declared functions and classes
//! - Relations: name-resolved references (calls, imports, inheritance)
//! - Languages: the supported extension table
//! - Query rows returned by the graph and evidence APIs

use serde::{Deserialize, Serialize};

/// Kind of declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "function" => Some(SymbolKind::Function),
            "class" => Some(SymbolKind::Class),
            _ => None,
        }
    }
}

/// Kind of reference from a symbol (or module scope) to a destination name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Source calls a function or method by name
    Calls,
    /// Bare declaration, used for evidence rows without a matching relation
    Declares,
    /// Source imports a module path
    Imports,
    /// Source class derives from a base class
    Inherits,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Calls => "calls",
            RelationKind::Imports => "imports",
            RelationKind::Inherits => "inherits",
            RelationKind::Declares => "declares",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "calls" => Some(RelationKind::Calls),
            "imports" => Some(RelationKind::Imports),
            "inherits" => Some(RelationKind::Inherits),
            "declares" => Some(RelationKind::Declares),
            _ => None,
        }
    }
}

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Language::Python,
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "rs" => Language::Rust,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "python" => Language::Python,
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "rust" => Language::Rust,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Unknown => "unknown",
        }
    }

    /// Whether a full syntax tree is available for this language
    pub fn is_precise(&self) -> bool {
        matches!(self, Language::Python)
    }
}

/// A symbol found during extraction, before it has a store id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub lineno: Option<u32>,
}

/// A relation found during extraction.
///
/// `source` indexes into the same file's symbol list; `None` means the
/// reference was issued at module scope (or by an analyzer that does not
/// track scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRelation {
    pub target: String,
    pub kind: RelationKind,
    pub lineno: Option<u32>,
    pub source: Option<usize>,
}

/// Result of analyzing one source file
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub language: Language,
    pub symbols: Vec<ExtractedSymbol>,
    pub relations: Vec<ExtractedRelation>,
    /// Set when the file could not be read or parsed; symbols and relations are empty
    pub error: Option<String>,
}

impl FileAnalysis {
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            symbols: Vec::new(),
            relations: Vec::new(),
            error: None,
        }
    }

    pub fn failed(language: Language, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty(language)
        }
    }
}

/// Metadata about an indexed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub language: Language,
    pub content_hash: Option<String>,
}

/// A declared symbol as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: i64,
    pub path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub lineno: Option<u32>,
}

/// One call site of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerRow {
    pub path: String,
    /// Enclosing function/class of the call site, `None` at module scope
    pub caller: Option<String>,
    pub lineno: Option<u32>,
}

/// One relation of any kind pointing at a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRow {
    pub path: String,
    pub dependent: Option<String>,
    pub relation_type: RelationKind,
    pub lineno: Option<u32>,
}

/// A symbol ranked by how often its name is referenced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub inbound_refs: u64,
}

/// How an evidence item was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Matched the question's terms and was scored
    Ranked,
    /// No terms could be extracted; unranked symbol listing
    Top,
    /// Terms matched nothing; small symbol listing
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Ranked => "ranked",
            Provenance::Top => "top",
            Provenance::Fallback => "fallback",
        }
    }
}

/// A symbol paired with the relation that made it relevant to a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub path: String,
    pub symbol: String,
    pub kind: SymbolKind,
    pub relation_type: RelationKind,
    /// Destination name of the joined relation, if any
    pub target: Option<String>,
    pub lineno: Option<u32>,
    pub score: u32,
    pub provenance: Provenance,
}

/// Store totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub files: u64,
    pub symbols: u64,
    pub relations: u64,
    pub languages: Vec<(Language, u64)>,
}
