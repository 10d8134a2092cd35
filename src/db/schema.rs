//! Database schema definition

pub const SCHEMA: &str = r#"
-- Files table: one row per distinct repository-relative path
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    path TEXT UNIQUE NOT NULL,
    language TEXT NOT NULL,
    content_hash TEXT
);

-- Symbols table: declared functions and classes
CREATE TABLE IF NOT EXISTS symbols (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    lineno INTEGER,
    UNIQUE(file_id, name, kind, lineno),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

-- Relations table: references resolved by destination name, never by id
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY,
    src_symbol_id INTEGER,
    dst_symbol_name TEXT NOT NULL,
    relation_type TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    lineno INTEGER,
    FOREIGN KEY (src_symbol_id) REFERENCES symbols(id),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

-- Indexes for both query directions
CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
CREATE INDEX IF NOT EXISTS idx_relations_dst ON relations(dst_symbol_name);
CREATE INDEX IF NOT EXISTS idx_relations_src ON relations(src_symbol_id);
CREATE INDEX IF NOT EXISTS idx_relations_file ON relations(file_id);
"#;
