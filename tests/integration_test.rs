//! Integration tests for repograph
//!
//! These tests verify the end-to-end workflow of indexing a repository on
//! disk and querying the resulting graph.

use std::fs;
use std::path::Path;

use repograph::db::Database;
use repograph::evidence::{retrieve_evidence, EvidenceRetriever, RetrievalOptions};
use repograph::graph::Graph;
use repograph::types::{Provenance, RelationKind};
use repograph::{index_repository, IndexConfig, IndexStats};
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn config(root: &Path) -> IndexConfig {
    IndexConfig {
        root: root.to_path_buf(),
        ..Default::default()
    }
}

fn incremental(root: &Path) -> IndexConfig {
    IndexConfig {
        reset: false,
        ..config(root)
    }
}

/// Index the files into a fresh in-memory store
fn index_files(files: &[(&str, &str)]) -> (TempDir, Database, IndexStats) {
    let dir = tempdir().unwrap();
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    let mut db = Database::in_memory().unwrap();
    let stats = index_repository(&mut db, &config(dir.path())).unwrap();
    (dir, db, stats)
}

#[test]
fn test_authentication_end_to_end() {
    let (_dir, db, stats) = index_files(&[(
        "auth.py",
        "def authenticate_user(token):\n    return token is not None\n",
    )]);
    assert_eq!((stats.files, stats.symbols, stats.relations), (1, 1, 0));

    let graph = Graph::new(&db);
    assert!(graph.callers_of("authenticate_user").unwrap().is_empty());
    assert!(graph.impacts_of("authenticate_user").unwrap().is_empty());

    let evidence = retrieve_evidence(&db, "where does authentication happen").unwrap();
    assert!(!evidence.is_empty());
    assert_eq!(evidence[0].symbol, "authenticate_user");
    assert_eq!(evidence[0].provenance, Provenance::Ranked);
}

#[test]
fn test_checkout_calls_helper_across_files() {
    let (_dir, db, _) = index_files(&[
        ("a.py", "from b import helper\n\ndef checkout():\n    helper()\n"),
        ("b.py", "def helper():\n    return 1\n"),
    ]);

    let callers = Graph::new(&db).callers_of("helper").unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].caller.as_deref(), Some("checkout"));
    assert_eq!(callers[0].path, "a.py");
    assert_eq!(callers[0].lineno, Some(4));
}

#[test]
fn test_full_reset_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "app.py", "import os\n\nclass A:\n    def run(self):\n        os.getcwd()\n");
    write(dir.path(), "web/index.js", "import x from './x';\nexport function main() {}\n");

    let mut db = Database::in_memory().unwrap();
    let first = index_repository(&mut db, &config(dir.path())).unwrap();
    let second = index_repository(&mut db, &config(dir.path())).unwrap();
    assert_eq!(
        (first.files, first.symbols, first.relations),
        (second.files, second.symbols, second.relations)
    );
    assert_eq!(first.files, 2);
}

#[test]
fn test_nested_scope_attribution() {
    let (_dir, db, _) = index_files(&[(
        "nested.py",
        "def outer():\n    def inner():\n        target()\n    inner()\n",
    )]);
    let graph = Graph::new(&db);

    let target = graph.callers_of("target").unwrap();
    assert_eq!(target[0].caller.as_deref(), Some("inner"));
    assert_eq!(target[0].lineno, Some(3));

    let inner = graph.callers_of("inner").unwrap();
    assert_eq!(inner[0].caller.as_deref(), Some("outer"));
    assert_eq!(inner[0].lineno, Some(4));
}

#[test]
fn test_decorator_calls_belong_to_decorated_function() {
    let (_dir, db, _) = index_files(&[(
        "app.py",
        "@app.route('/')\ndef index():\n    return render()\n",
    )]);

    let callers = Graph::new(&db).callers_of("route").unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].caller.as_deref(), Some("index"));
    assert_eq!(callers[0].lineno, Some(1));
}

#[test]
fn test_dangling_relations_are_queryable() {
    let (_dir, db, _) = index_files(&[(
        "main.py",
        "import requests\n\ndef fetch():\n    requests.get('x')\n    print('done')\n",
    )]);
    let graph = Graph::new(&db);

    let impacts = graph.impacts_of("requests").unwrap();
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].relation_type, RelationKind::Imports);
    assert!(impacts[0].dependent.is_none());

    let printers = graph.callers_of("print").unwrap();
    assert_eq!(printers[0].caller.as_deref(), Some("fetch"));

    let report = graph.impact_report("print").unwrap();
    assert!(report.is_dangling());
    assert_eq!(report.total, 1);
}

#[test]
fn test_invalid_file_does_not_abort_run() {
    let (_dir, db, stats) = index_files(&[
        ("good_one.py", "def one():\n    two()\n"),
        ("good_two.py", "def two():\n    pass\n"),
        ("broken.py", "def broken(:\n    nope(\n"),
    ]);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.files, 3);
    assert_eq!(stats.symbols, 2);
    assert_eq!(stats.relations, 1);
    assert!(Graph::new(&db).callers_of("nope").unwrap().is_empty());
}

#[test]
fn test_scanner_skips_hidden_and_vendor_directories() {
    let (_dir, db, stats) = index_files(&[
        ("src/app.py", "def app():\n    pass\n"),
        (".hidden/secret.py", "def secret():\n    pass\n"),
        ("node_modules/pkg/index.js", "function dep() {}\n"),
        ("venv/lib/site.py", "def site():\n    pass\n"),
        ("notes.txt", "def not_code(): pass\n"),
    ]);
    assert_eq!(stats.files, 1);
    assert_eq!(db.stats().unwrap().symbols, 1);
}

#[test]
fn test_mixed_languages_are_indexed() {
    let (_dir, db, _) = index_files(&[
        ("api.py", "def handler():\n    pass\n"),
        ("lib.rs", "pub fn parse() {}\npub struct Token;\n"),
        ("main.go", "package main\n\nfunc main() {}\n"),
        ("ui.ts", "export class Widget {}\n"),
    ]);
    let stats = db.stats().unwrap();
    assert_eq!(stats.files, 4);
    assert_eq!(stats.symbols, 5);
    assert_eq!(stats.languages.len(), 4);
}

#[test]
fn test_evidence_fallbacks() {
    let (_dir, db, _) = index_files(&[("util.py", "def zeta():\n    pass\n\ndef alpha():\n    pass\n")]);

    let top = retrieve_evidence(&db, "why is it so?").unwrap();
    assert_eq!(top[0].symbol, "alpha");
    assert!(top.iter().all(|e| e.provenance == Provenance::Top));

    let fallback = retrieve_evidence(&db, "kubernetes scheduling").unwrap();
    assert_eq!(fallback.len(), 2);
    assert!(fallback.iter().all(|e| e.provenance == Provenance::Fallback));
}

#[test]
fn test_evidence_prefers_flow_relations() {
    let (_dir, db, _) = index_files(&[(
        "billing.py",
        "def payment_total():\n    pass\n\ndef submit_payment():\n    payment_total()\n",
    )]);

    let evidence = EvidenceRetriever::new(&db)
        .retrieve("payment", &RetrievalOptions { limit: 1 })
        .unwrap();
    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].symbol, "submit_payment");
    assert_eq!(evidence[0].relation_type, RelationKind::Calls);
}

#[test]
fn test_incremental_skips_unchanged_and_purges_changed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.py", "def keep():\n    pass\n");
    write(dir.path(), "edit.py", "def old_name():\n    helper()\n");

    let mut db = Database::in_memory().unwrap();
    index_repository(&mut db, &config(dir.path())).unwrap();

    write(dir.path(), "edit.py", "def new_name():\n    helper()\n");
    let stats = index_repository(&mut db, &incremental(dir.path())).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.analyzed, 1);
    assert_eq!((stats.files, stats.symbols, stats.relations), (2, 2, 1));

    let graph = Graph::new(&db);
    let callers = graph.callers_of("helper").unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].caller.as_deref(), Some("new_name"));
    assert!(db.find_symbols("old_name").unwrap().is_empty());
}

#[test]
fn test_incremental_keeps_vanished_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.py", "def a():\n    pass\n");
    write(dir.path(), "b.py", "def b():\n    pass\n");

    let mut db = Database::in_memory().unwrap();
    index_repository(&mut db, &config(dir.path())).unwrap();
    fs::remove_file(dir.path().join("b.py")).unwrap();

    let stats = index_repository(&mut db, &incremental(dir.path())).unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(db.find_symbols("b").unwrap().len(), 1);

    let full = index_repository(&mut db, &config(dir.path())).unwrap();
    assert_eq!(full.files, 1);
}

#[test]
fn test_append_history_accumulates_relations() {
    let dir = tempdir().unwrap();
    write(dir.path(), "app.py", "def run():\n    work()\n");

    let mut db = Database::in_memory().unwrap();
    index_repository(&mut db, &config(dir.path())).unwrap();

    let history = IndexConfig {
        append_history: true,
        ..incremental(dir.path())
    };
    let stats = index_repository(&mut db, &history).unwrap();
    assert_eq!(stats.skipped, 0);
    // symbols are get-or-create, relations are appended
    assert_eq!((stats.symbols, stats.relations), (1, 2));
}

#[test]
fn test_store_persists_between_connections() {
    let repo = tempdir().unwrap();
    write(repo.path(), "a.py", "def a():\n    b()\n");
    let store = tempdir().unwrap();
    let db_path = store.path().join("graph.db");

    {
        let mut db = Database::open(&db_path).unwrap();
        index_repository(&mut db, &config(repo.path())).unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    let callers = Graph::new(&db).callers_of("b").unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].caller.as_deref(), Some("a"));
}
