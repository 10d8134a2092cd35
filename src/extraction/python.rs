//! Python extraction over a tree-sitter syntax tree
//!
//! Walks the whole tree depth-first, carrying an explicit stack of the
//! enclosing function/class declarations. Calls and imports are attributed
//! to the innermost entry on that stack.

use tree_sitter::{Node, Parser};

use crate::types::{
    ExtractedRelation, ExtractedSymbol, FileAnalysis, Language, RelationKind, SymbolKind,
};

/// Extracts symbols and relations from Python source
pub struct PythonAnalyzer {
    parser: Parser,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn analyze(&mut self, content: &str) -> FileAnalysis {
        if self
            .parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .is_err()
        {
            return FileAnalysis::failed(Language::Python, "failed to set parser language");
        }

        let Some(tree) = self.parser.parse(content, None) else {
            return FileAnalysis::failed(Language::Python, "failed to parse file");
        };

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return FileAnalysis::failed(
                Language::Python,
                format!("syntax error near line {}", line),
            );
        }

        let mut visitor = ScopeVisitor {
            source: content,
            result: FileAnalysis::empty(Language::Python),
            scope: Vec::new(),
        };
        visitor.visit(root);
        visitor.result
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn first_error_line(node: Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row as u32 + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_line)
}

struct ScopeVisitor<'a> {
    source: &'a str,
    result: FileAnalysis,
    /// Indices into `result.symbols` of the enclosing declarations
    scope: Vec<usize>,
}

impl<'a> ScopeVisitor<'a> {
    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_definition(node, SymbolKind::Function, &[]),
            "class_definition" => self.visit_definition(node, SymbolKind::Class, &[]),
            "decorated_definition" => self.visit_decorated(node),
            "import_statement" => self.visit_import(node),
            "import_from_statement" => self.visit_import_from(node),
            "call" => {
                self.visit_call(node);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Decorators run inside the scope of the declaration they decorate
    fn visit_decorated(&mut self, node: Node) {
        let kind = match node.child_by_field_name("definition") {
            Some(def) if def.kind() == "function_definition" => Some((def, SymbolKind::Function)),
            Some(def) if def.kind() == "class_definition" => Some((def, SymbolKind::Class)),
            _ => None,
        };
        let Some((definition, kind)) = kind else {
            self.visit_children(node);
            return;
        };

        let mut cursor = node.walk();
        let decorators: Vec<Node> = node
            .children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .collect();
        self.visit_definition(definition, kind, &decorators);
    }

    fn visit_definition(&mut self, node: Node, kind: SymbolKind, decorators: &[Node]) {
        let Some(name) = node
            .child_by_field_name("name")
            .and_then(|n| self.text(n))
        else {
            for decorator in decorators {
                self.visit(*decorator);
            }
            self.visit_children(node);
            return;
        };

        let lineno = line_of(node);
        let index = self.result.symbols.len();
        self.result.symbols.push(ExtractedSymbol {
            name: name.to_string(),
            kind,
            lineno,
        });

        if kind == SymbolKind::Class {
            if let Some(bases) = node.child_by_field_name("superclasses") {
                let mut cursor = bases.walk();
                for base in bases.named_children(&mut cursor) {
                    if base.kind() != "identifier" {
                        continue;
                    }
                    if let Some(base_name) = self.text(base) {
                        self.result.relations.push(ExtractedRelation {
                            target: base_name.to_string(),
                            kind: RelationKind::Inherits,
                            lineno,
                            source: Some(index),
                        });
                    }
                }
            }
        }

        self.scope.push(index);
        for decorator in decorators {
            self.visit(*decorator);
        }
        self.visit_children(node);
        self.scope.pop();
    }

    fn visit_import(&mut self, node: Node) {
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| self.imported_name(n))
            .collect();

        for name in names {
            self.push_relation(name, RelationKind::Imports, line_of(node));
        }
    }

    fn visit_import_from(&mut self, node: Node) {
        let module = node
            .child_by_field_name("module_name")
            .map(|m| self.module_path(m))
            .unwrap_or_default();

        let mut names: Vec<String> = {
            let mut cursor = node.walk();
            node.children_by_field_name("name", &mut cursor)
                .filter_map(|n| self.imported_name(n))
                .collect()
        };
        let mut cursor = node.walk();
        if node
            .children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        for name in names {
            let full = if module.is_empty() {
                name
            } else {
                format!("{}.{}", module, name)
            };
            self.push_relation(full, RelationKind::Imports, line_of(node));
        }
    }

    fn visit_call(&mut self, node: Node) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let called = match function.kind() {
            "identifier" => self.text(function),
            // obj.method() -> method
            "attribute" => function
                .child_by_field_name("attribute")
                .and_then(|a| self.text(a)),
            _ => None,
        };
        if let Some(name) = called {
            self.push_relation(name.to_string(), RelationKind::Calls, line_of(node));
        }
    }

    fn push_relation(&mut self, target: String, kind: RelationKind, lineno: Option<u32>) {
        self.result.relations.push(ExtractedRelation {
            target,
            kind,
            lineno,
            source: self.scope.last().copied(),
        });
    }

    /// `a.b` or the dotted name of `a.b as c`
    fn imported_name(&self, node: Node) -> Option<String> {
        let target = if node.kind() == "aliased_import" {
            node.child_by_field_name("name")?
        } else {
            node
        };
        self.text(target).map(str::to_string)
    }

    /// Module of a from-import; leading dots of relative imports are dropped
    fn module_path(&self, node: Node) -> String {
        if node.kind() != "relative_import" {
            return self.text(node).unwrap_or_default().to_string();
        }
        let mut cursor = node.walk();
        let dotted = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "dotted_name");
        dotted
            .and_then(|d| self.text(d))
            .unwrap_or_default()
            .to_string()
    }

    fn text(&self, node: Node) -> Option<&'a str> {
        node.utf8_text(self.source.as_bytes()).ok()
    }
}

fn line_of(node: Node) -> Option<u32> {
    Some(node.start_position().row as u32 + 1)
}
