//! Evidence retrieval for free-text questions
//!
//! Grounds a question in the code graph by:
//! - Expanding it into search terms (topic keyword groups plus plain tokens)
//! - Fetching symbol/relation rows matching any term
//! - Ranking them with a simple additive relevance score
//!
//! Falls back to plain symbol listings so a non-empty store always yields
//! some evidence.

use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::types::{EvidenceItem, Provenance, RelationKind, SymbolRecord};

/// Maximum number of search terms taken from one question
pub const MAX_TERMS: usize = 10;

/// Listing size when terms match nothing
pub const FALLBACK_LIMIT: u32 = 10;

/// Candidates fetched per requested result
const CANDIDATE_FACTOR: u32 = 3;

/// Topic labels and the words that trigger them
const TOPICS: &[(&str, &[&str])] = &[
    ("authentication", &["auth", "login", "token", "oauth", "jwt"]),
    ("checkout", &["checkout", "cart", "payment", "order"]),
    ("database", &["database", "sql", "query", "schema"]),
    ("configuration", &["config", "settings", "environment"]),
];

const STOP_WORDS: &[&str] = &[
    "the", "and", "are", "was", "were", "been", "being", "have", "has", "had", "does", "did",
    "will", "would", "could", "should", "can", "for", "with", "from", "into", "this", "that",
    "these", "those", "there", "here", "what", "where", "when", "which", "who", "whom", "why",
    "how", "all", "any", "our", "your", "you", "its", "not", "but", "about", "show", "tell",
    "find", "code", "list",
];

/// Options for evidence retrieval
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Number of ranked items to return
    pub limit: u32,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Ranks graph rows against a free-text question
pub struct EvidenceRetriever<'a> {
    db: &'a Database,
}

impl<'a> EvidenceRetriever<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Retrieve evidence for a question
    pub fn retrieve(&self, question: &str, options: &RetrievalOptions) -> Result<Vec<EvidenceItem>> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let terms = extract_terms(question);
        debug!("Evidence terms for {:?}: {:?}", question, terms);

        if terms.is_empty() {
            let symbols = self.db.list_symbols(options.limit)?;
            return Ok(listing(symbols, Provenance::Top));
        }

        let candidates = self
            .db
            .evidence_candidates(&terms, options.limit.saturating_mul(CANDIDATE_FACTOR))?;
        if candidates.is_empty() {
            let symbols = self.db.list_symbols(FALLBACK_LIMIT)?;
            return Ok(listing(symbols, Provenance::Fallback));
        }

        let mut ranked: Vec<EvidenceItem> = candidates
            .into_iter()
            .map(|mut item| {
                item.score = score(&item, &terms);
                item
            })
            .collect();
        // sort_by is stable, so equal scores keep query order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(options.limit as usize);
        Ok(ranked)
    }
}

/// Retrieve evidence with default options
pub fn retrieve_evidence(db: &Database, question: &str) -> Result<Vec<EvidenceItem>> {
    EvidenceRetriever::new(db).retrieve(question, &RetrievalOptions::default())
}

/// Expand a question into at most [`MAX_TERMS`] lower-case search terms
pub fn extract_terms(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    let mut terms: Vec<String> = Vec::new();
    let mut push = |term: &str| {
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    };

    for &(label, triggers) in TOPICS {
        if triggers.iter().any(|t| lowered.contains(*t)) {
            push(label);
            for &trigger in triggers {
                push(trigger);
            }
        }
    }

    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() >= 3 && !STOP_WORDS.contains(&token) {
            push(token);
        }
    }

    terms.truncate(MAX_TERMS);
    terms
}

/// 2 per term in the symbol name, else 1 per term elsewhere in the row,
/// plus 2 for calls/imports rows.
fn score(item: &EvidenceItem, terms: &[String]) -> u32 {
    let name = item.symbol.to_lowercase();
    let haystack = format!(
        "{} {} {}",
        name,
        item.path.to_lowercase(),
        item.relation_type.as_str()
    );

    let mut score = 0;
    for term in terms {
        if name.contains(term.as_str()) {
            score += 2;
        } else if haystack.contains(term.as_str()) {
            score += 1;
        }
    }
    if matches!(item.relation_type, RelationKind::Calls | RelationKind::Imports) {
        score += 2;
    }
    score
}

fn listing(symbols: Vec<SymbolRecord>, provenance: Provenance) -> Vec<EvidenceItem> {
    symbols
        .into_iter()
        .map(|s| EvidenceItem {
            path: s.path,
            symbol: s.name,
            kind: s.kind,
            relation_type: RelationKind::Declares,
            target: None,
            lineno: s.lineno,
            score: 0,
            provenance,
        })
        .collect()
}

/// Render a heuristic markdown answer from retrieved evidence
pub fn format_answer(question: &str, evidence: &[EvidenceItem]) -> String {
    if evidence.is_empty() {
        return "No indexed symbols found yet. Run indexing first.".to_string();
    }

    let mut output = String::new();
    output.push_str("## Relevant components\n\n");
    output.push_str(&format!("Question: {}\n\n", question.trim()));

    match evidence[0].provenance {
        Provenance::Ranked => {}
        Provenance::Top => {
            output.push_str("_No search terms in the question; listing indexed symbols._\n\n")
        }
        Provenance::Fallback => {
            output.push_str("_Nothing matched the question; listing indexed symbols._\n\n")
        }
    }

    for item in evidence {
        let location = match item.lineno {
            Some(line) => format!("{}:{}", item.path, line),
            None => item.path.clone(),
        };
        output.push_str(&format!(
            "- `{}` ({}) in `{}`",
            item.symbol,
            item.kind.as_str(),
            location
        ));
        if let Some(ref target) = item.target {
            output.push_str(&format!(" {} `{}`", item.relation_type.as_str(), target));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, SymbolKind};

    fn item(symbol: &str, path: &str, relation_type: RelationKind) -> EvidenceItem {
        EvidenceItem {
            path: path.to_string(),
            symbol: symbol.to_string(),
            kind: SymbolKind::Function,
            relation_type,
            target: None,
            lineno: Some(1),
            score: 0,
            provenance: Provenance::Ranked,
        }
    }

    #[test]
    fn test_extract_terms_expands_topics() {
        let terms = extract_terms("Where does authentication happen?");
        assert_eq!(
            terms,
            vec!["authentication", "auth", "login", "token", "oauth", "jwt", "happen"]
        );
    }

    #[test]
    fn test_extract_terms_drops_stop_words_and_short_tokens() {
        let terms = extract_terms("What is the DB migration for?");
        assert_eq!(terms, vec!["migration"]);
        assert!(extract_terms("how is it?").is_empty());
    }

    #[test]
    fn test_extract_terms_caps_at_ten() {
        let terms = extract_terms("auth checkout alpha bravo charlie");
        assert_eq!(terms.len(), MAX_TERMS);
        assert_eq!(terms[0], "authentication");
        assert_eq!(terms[6], "checkout");
    }

    #[test]
    fn test_score_prefers_name_matches() {
        let terms = vec!["parser".to_string()];
        let in_name = item("parser_main", "src/app.py", RelationKind::Declares);
        let in_path = item("main", "src/parser.py", RelationKind::Declares);
        assert_eq!(score(&in_name, &terms), 2);
        assert_eq!(score(&in_path, &terms), 1);
        assert!(score(&in_name, &terms) >= score(&in_path, &terms));
    }

    #[test]
    fn test_score_bonus_for_flow_relations() {
        let terms = vec!["zzz".to_string()];
        assert_eq!(score(&item("a", "a.py", RelationKind::Calls), &terms), 2);
        assert_eq!(score(&item("a", "a.py", RelationKind::Imports), &terms), 2);
        assert_eq!(score(&item("a", "a.py", RelationKind::Inherits), &terms), 0);
    }

    #[test]
    fn test_retrieve_ranks_name_match_first() {
        let db = Database::in_memory().unwrap();
        let f = db.upsert_file("billing/payment_views.py", Language::Python, None).unwrap();
        let g = db.upsert_file("core.py", Language::Python, None).unwrap();
        db.insert_symbol(f, "render", SymbolKind::Function, Some(1))
            .unwrap();
        db.insert_symbol(g, "take_payment", SymbolKind::Function, Some(1))
            .unwrap();

        let evidence = retrieve_evidence(&db, "payment").unwrap();
        let names: Vec<_> = evidence.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(names, vec!["take_payment", "render"]);
        assert!(evidence.iter().all(|e| e.provenance == Provenance::Ranked));
    }

    #[test]
    fn test_retrieve_without_terms_lists_top() {
        let db = Database::in_memory().unwrap();
        let f = db.upsert_file("a.py", Language::Python, None).unwrap();
        db.insert_symbol(f, "zeta", SymbolKind::Function, Some(1))
            .unwrap();
        db.insert_symbol(f, "alpha", SymbolKind::Function, Some(2))
            .unwrap();

        let evidence = retrieve_evidence(&db, "how is it?").unwrap();
        let names: Vec<_> = evidence.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(evidence.iter().all(|e| e.provenance == Provenance::Top));
    }

    #[test]
    fn test_retrieve_without_matches_falls_back() {
        let db = Database::in_memory().unwrap();
        let f = db.upsert_file("a.py", Language::Python, None).unwrap();
        for i in 0..12 {
            db.insert_symbol(f, &format!("fn_{:02}", i), SymbolKind::Function, Some(i))
                .unwrap();
        }

        let evidence = retrieve_evidence(&db, "kubernetes").unwrap();
        assert_eq!(evidence.len(), FALLBACK_LIMIT as usize);
        assert_eq!(evidence[0].symbol, "fn_00");
        assert_eq!(evidence[0].provenance, Provenance::Fallback);
    }

    #[test]
    fn test_retrieve_with_zero_limit_is_empty() {
        let db = Database::in_memory().unwrap();
        let f = db.upsert_file("shop.py", Language::Python, None).unwrap();
        db.insert_symbol(f, "payment", SymbolKind::Function, Some(1))
            .unwrap();

        let evidence = EvidenceRetriever::new(&db)
            .retrieve("payment", &RetrievalOptions { limit: 0 })
            .unwrap();
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_retrieve_on_empty_store() {
        let db = Database::in_memory().unwrap();
        assert!(retrieve_evidence(&db, "anything at all").unwrap().is_empty());
        assert!(retrieve_evidence(&db, "").unwrap().is_empty());
    }

    #[test]
    fn test_format_answer() {
        let mut call = item("checkout", "shop.py", RelationKind::Calls);
        call.target = Some("helper".to_string());
        call.lineno = Some(3);
        let text = format_answer("where is checkout?", &[call]);
        assert!(text.starts_with("## Relevant components"));
        assert!(text.contains("- `checkout` (function) in `shop.py:3` calls `helper`"));

        let empty = format_answer("anything", &[]);
        assert!(empty.starts_with("No indexed symbols found yet"));
    }
}
