//! Database module for repograph
//!
//! Handles SQLite storage for the code graph including:
//! - Idempotent schema creation
//! - Full reset and per-file purge
//! - Get-or-create writes for files and symbols, append-only relations
//! - Read-only query operations

mod schema;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::types::{
    CallerRow, EvidenceItem, FileRecord, GraphStats, ImpactRow, Language, Provenance,
    RelationKind, SymbolKind, SymbolRecord, TopSymbol,
};

/// Database handle for the code graph
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize the database schema; safe on an existing store
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    /// Delete every relation, symbol and file, in that order, atomically
    pub fn reset(&mut self) -> Result<()> {
        let sp = self.conn.savepoint()?;
        sp.execute("DELETE FROM relations", [])?;
        sp.execute("DELETE FROM symbols", [])?;
        sp.execute("DELETE FROM files", [])?;
        sp.commit()?;
        Ok(())
    }

    // =========================================================================
    // File Operations
    // =========================================================================

    /// Get-or-create a file row by path and return its id.
    /// An existing row keeps its id; language and hash are refreshed.
    pub fn upsert_file(
        &self,
        path: &str,
        language: Language,
        content_hash: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO files (path, language, content_hash)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(path) DO UPDATE SET
                language = excluded.language,
                content_hash = excluded.content_hash
            "#,
            params![path, language.as_str(), content_hash],
        )?;
        let id = self
            .conn
            .query_row("SELECT id FROM files WHERE path = ?1", params![path], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    /// Get a file record by path
    pub fn get_file(&self, path: &str) -> Result<Option<FileRecord>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, path, language, content_hash FROM files WHERE path = ?1",
                params![path],
                |row| {
                    Ok(FileRecord {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        language: Language::from_str(&row.get::<_, String>(2)?),
                        content_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Remove a file's symbols and relations, keeping the file row
    pub fn clear_file(&self, file_id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM relations WHERE file_id = ?1", params![file_id])?;
        self.conn
            .execute("DELETE FROM symbols WHERE file_id = ?1", params![file_id])?;
        Ok(())
    }

    // =========================================================================
    // Symbol and Relation Writes
    // =========================================================================

    /// Get-or-create a symbol keyed by (file, name, kind, line)
    pub fn insert_symbol(
        &self,
        file_id: i64,
        name: &str,
        kind: SymbolKind,
        lineno: Option<u32>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO symbols (file_id, name, kind, lineno) VALUES (?1, ?2, ?3, ?4)",
            params![file_id, name, kind.as_str(), lineno],
        )?;
        let id = self.conn.query_row(
            r#"
            SELECT id FROM symbols
            WHERE file_id = ?1 AND name = ?2 AND kind = ?3 AND lineno IS ?4
            ORDER BY id
            LIMIT 1
            "#,
            params![file_id, name, kind.as_str(), lineno],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Append a relation; no deduplication
    pub fn insert_relation(
        &self,
        file_id: i64,
        src_symbol_id: Option<i64>,
        dst_symbol_name: &str,
        relation_type: RelationKind,
        lineno: Option<u32>,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO relations (src_symbol_id, dst_symbol_name, relation_type, file_id, lineno)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                src_symbol_id,
                dst_symbol_name,
                relation_type.as_str(),
                file_id,
                lineno
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // Graph Queries
    // =========================================================================

    /// Call sites whose destination is `name`, by path then line
    pub fn callers_of(&self, name: &str) -> Result<Vec<CallerRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT f.path, s.name, r.lineno
            FROM relations r
            LEFT JOIN symbols s ON s.id = r.src_symbol_id
            JOIN files f ON f.id = r.file_id
            WHERE r.relation_type = 'calls' AND r.dst_symbol_name = ?1
            ORDER BY f.path, r.lineno, r.id
            "#,
        )?;
        let rows = stmt.query_map(params![name], |row| {
            Ok(CallerRow {
                path: row.get(0)?,
                caller: row.get(1)?,
                lineno: get_lineno(row, 2)?,
            })
        })?;

        let mut callers = Vec::new();
        for row in rows {
            callers.push(row?);
        }
        Ok(callers)
    }

    /// Relations of any type whose destination is `name`, by type then path
    pub fn impacts_of(&self, name: &str) -> Result<Vec<ImpactRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT f.path, s.name, r.relation_type, r.lineno
            FROM relations r
            LEFT JOIN symbols s ON s.id = r.src_symbol_id
            JOIN files f ON f.id = r.file_id
            WHERE r.dst_symbol_name = ?1
            ORDER BY r.relation_type, f.path, r.lineno, r.id
            "#,
        )?;
        let rows = stmt.query_map(params![name], |row| {
            Ok(ImpactRow {
                path: row.get(0)?,
                dependent: row.get(1)?,
                relation_type: get_relation_kind(row, 2)?,
                lineno: get_lineno(row, 3)?,
            })
        })?;

        let mut impacts = Vec::new();
        for row in rows {
            impacts.push(row?);
        }
        Ok(impacts)
    }

    /// Symbols ranked by inbound references to their name
    pub fn top_symbols(&self, limit: u32) -> Result<Vec<TopSymbol>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.name, s.kind, COUNT(r.id) AS inbound_refs
            FROM symbols s
            LEFT JOIN relations r ON r.dst_symbol_name = s.name
            GROUP BY s.id
            ORDER BY inbound_refs DESC, s.name ASC, s.id ASC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TopSymbol {
                name: row.get(0)?,
                kind: get_symbol_kind(row, 1)?,
                inbound_refs: row.get::<_, i64>(2)? as u64,
            })
        })?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    /// Declarations of an exact name
    pub fn find_symbols(&self, name: &str) -> Result<Vec<SymbolRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, f.path, s.name, s.kind, s.lineno
            FROM symbols s
            JOIN files f ON f.id = s.file_id
            WHERE s.name = ?1
            ORDER BY f.path, s.lineno
            "#,
        )?;
        let rows = stmt.query_map(params![name], Self::row_to_symbol)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    /// Symbols in name order
    pub fn list_symbols(&self, limit: u32) -> Result<Vec<SymbolRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, f.path, s.name, s.kind, s.lineno
            FROM symbols s
            JOIN files f ON f.id = s.file_id
            ORDER BY s.name, f.path, s.lineno, s.id
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_symbol)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    fn row_to_symbol(row: &rusqlite::Row) -> rusqlite::Result<SymbolRecord> {
        Ok(SymbolRecord {
            id: row.get(0)?,
            path: row.get(1)?,
            name: row.get(2)?,
            kind: get_symbol_kind(row, 3)?,
            lineno: get_lineno(row, 4)?,
        })
    }

    /// Symbol/relation rows where any term is a case-insensitive substring of
    /// the symbol name, the file path, or the relation destination.
    ///
    /// Each symbol is joined to the relations it issued; a symbol without any
    /// comes back once with the synthetic `declares` type. Terms must already
    /// be lower-case.
    pub fn evidence_candidates(&self, terms: &[String], limit: u32) -> Result<Vec<EvidenceItem>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let clauses: Vec<String> = (1..=terms.len())
            .map(|i| {
                format!(
                    "instr(lower(s.name), ?{i}) > 0 \
                     OR instr(lower(f.path), ?{i}) > 0 \
                     OR instr(lower(COALESCE(r.dst_symbol_name, '')), ?{i}) > 0"
                )
            })
            .collect();
        let sql = format!(
            r#"
            SELECT f.path, s.name, s.kind,
                   COALESCE(r.relation_type, 'declares'),
                   r.dst_symbol_name,
                   COALESCE(r.lineno, s.lineno)
            FROM symbols s
            JOIN files f ON f.id = s.file_id
            LEFT JOIN relations r ON r.src_symbol_id = s.id
            WHERE {}
            ORDER BY f.path, s.lineno, s.id, r.lineno, r.id
            LIMIT ?{}
            "#,
            clauses.join(" OR "),
            terms.len() + 1
        );

        let mut values: Vec<Value> = terms.iter().map(|t| Value::Text(t.clone())).collect();
        values.push(Value::Integer(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(EvidenceItem {
                path: row.get(0)?,
                symbol: row.get(1)?,
                kind: get_symbol_kind(row, 2)?,
                relation_type: get_relation_kind(row, 3)?,
                target: row.get(4)?,
                lineno: get_lineno(row, 5)?,
                score: 0,
                provenance: Provenance::Ranked,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Distinct relation destinations recorded in the given files
    pub fn relation_targets_in_files(&self, paths: &[String], limit: u32) -> Result<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=paths.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT DISTINCT r.dst_symbol_name
            FROM files f
            JOIN relations r ON r.file_id = f.id
            WHERE f.path IN ({})
            ORDER BY r.dst_symbol_name
            LIMIT ?{}
            "#,
            placeholders,
            paths.len() + 1
        );

        let mut values: Vec<Value> = paths.iter().map(|p| Value::Text(p.clone())).collect();
        values.push(Value::Integer(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| row.get(0))?;

        let mut targets = Vec::new();
        for row in rows {
            targets.push(row?);
        }
        Ok(targets)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Get store totals
    pub fn stats(&self) -> Result<GraphStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        };

        let mut stmt = self
            .conn
            .prepare("SELECT language, COUNT(*) FROM files GROUP BY language ORDER BY language")?;
        let lang_rows = stmt.query_map([], |row| {
            let lang: String = row.get(0)?;
            let n: i64 = row.get(1)?;
            Ok((Language::from_str(&lang), n as u64))
        })?;
        let mut languages = Vec::new();
        for row in lang_rows {
            languages.push(row?);
        }

        Ok(GraphStats {
            files: count("files")?,
            symbols: count("symbols")?,
            relations: count("relations")?,
            languages,
        })
    }

    /// Begin a transaction
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }
}

fn get_lineno(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<u32>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|l| l as u32))
}

fn get_symbol_kind(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<SymbolKind> {
    Ok(SymbolKind::from_str(&row.get::<_, String>(idx)?).unwrap_or(SymbolKind::Function))
}

fn get_relation_kind(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<RelationKind> {
    Ok(RelationKind::from_str(&row.get::<_, String>(idx)?).unwrap_or(RelationKind::Declares))
}
