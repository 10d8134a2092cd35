//! Graph query operations
//!
//! Provides read-only traversals over the name-resolved relation graph:
//! - Finding callers of a name
//! - Impact analysis (every relation pointing at a name)
//! - Most referenced symbols

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Database;
use crate::error::Result;
use crate::types::{CallerRow, ImpactRow, RelationKind, SymbolRecord, TopSymbol};

/// Graph operations on the code database
pub struct Graph<'a> {
    db: &'a Database,
}

impl<'a> Graph<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Find every call site whose destination is `name`
    pub fn callers_of(&self, name: &str) -> Result<Vec<CallerRow>> {
        self.db.callers_of(name)
    }

    /// Find every relation of any type whose destination is `name`
    pub fn impacts_of(&self, name: &str) -> Result<Vec<ImpactRow>> {
        self.db.impacts_of(name)
    }

    /// Most referenced symbols, at most `limit`
    pub fn top_symbols(&self, limit: u32) -> Result<Vec<TopSymbol>> {
        self.db.top_symbols(limit)
    }

    /// Analyze what would be affected if `name` changed
    pub fn impact_report(&self, name: &str) -> Result<ImpactReport> {
        let declarations = self.db.find_symbols(name)?;

        let mut by_relation: BTreeMap<RelationKind, Vec<ImpactRow>> = BTreeMap::new();
        let mut total = 0;
        for row in self.db.impacts_of(name)? {
            total += 1;
            by_relation.entry(row.relation_type).or_default().push(row);
        }

        Ok(ImpactReport {
            name: name.to_string(),
            declarations,
            by_relation,
            total,
        })
    }
}

/// Result of impact analysis
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub name: String,
    /// Where `name` is declared; empty when every reference is dangling
    pub declarations: Vec<SymbolRecord>,
    pub by_relation: BTreeMap<RelationKind, Vec<ImpactRow>>,
    pub total: usize,
}

impl ImpactReport {
    pub fn is_dangling(&self) -> bool {
        self.declarations.is_empty()
    }
}
