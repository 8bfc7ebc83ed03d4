// ABOUTME: Import, export and class-heritage symbol extraction for one file
// ABOUTME: Produces the raw material for dependency graph nodes and edges

use super::utils::{child_by_kind, has_token, named_children, node_text, string_literal};
use contextgraph_core::{EdgeKind, ExportKind, ExportRef, ImportKind, ImportRef};
use std::collections::HashMap;
use tree_sitter::Node;

/// One module referenced by the file, with the local names it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    pub specifier: String,
    pub type_only: bool,
}

/// A base class or implemented interface named in a class heritage clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeritageReference {
    pub symbol: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default)]
pub struct FileSymbols {
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportRef>,
    /// Modules in first-seen order; `type_only` when every binding from it is a type.
    pub modules: Vec<ModuleReference>,
    /// Local binding name to the module specifier it came from.
    pub bindings: HashMap<String, String>,
    pub heritage: Vec<HeritageReference>,
}

impl FileSymbols {
    fn note_module(&mut self, specifier: &str, type_only: bool) {
        match self.modules.iter_mut().find(|m| m.specifier == specifier) {
            Some(existing) => existing.type_only &= type_only,
            None => self.modules.push(ModuleReference {
                specifier: specifier.to_string(),
                type_only,
            }),
        }
    }

    /// Module a heritage symbol was imported from, if any.
    pub fn module_for(&self, symbol: &str) -> Option<&str> {
        self.bindings.get(symbol).map(String::as_str)
    }
}

pub fn extract_symbols(root: &Node, content: &str) -> FileSymbols {
    let mut symbols = FileSymbols::default();
    let local_kinds = local_declaration_kinds(root, content);

    for stmt in named_children(root) {
        match stmt.kind() {
            "import_statement" => collect_import(&stmt, content, &mut symbols),
            "export_statement" => collect_export(&stmt, content, &local_kinds, &mut symbols),
            _ => {}
        }
    }

    collect_heritage(root, content, &mut symbols);
    symbols
}

fn collect_import(stmt: &Node, content: &str, symbols: &mut FileSymbols) {
    let Some(source) = stmt.child_by_field_name("source") else {
        return;
    };
    let specifier = string_literal(&source, content);
    let statement_type_only = has_token(stmt, "type");

    let Some(clause) = child_by_kind(stmt, "import_clause") else {
        // Side-effect import: `import './polyfills'`.
        symbols.imports.push(ImportRef {
            name: "*".to_string(),
            path: specifier.clone(),
            kind: ImportKind::Value,
        });
        symbols.note_module(&specifier, false);
        return;
    };

    let mut all_types = true;
    for part in named_children(&clause) {
        match part.kind() {
            "identifier" => {
                let name = node_text(&part, content).to_string();
                let kind = if statement_type_only {
                    ImportKind::Type
                } else {
                    ImportKind::Value
                };
                all_types &= kind == ImportKind::Type;
                symbols.bindings.insert(name.clone(), specifier.clone());
                symbols.imports.push(ImportRef {
                    name,
                    path: specifier.clone(),
                    kind,
                });
            }
            "namespace_import" => {
                if let Some(ident) = child_by_kind(&part, "identifier") {
                    let name = node_text(&ident, content).to_string();
                    let kind = if statement_type_only {
                        ImportKind::Type
                    } else {
                        ImportKind::Namespace
                    };
                    all_types &= kind == ImportKind::Type;
                    symbols.bindings.insert(name.clone(), specifier.clone());
                    symbols.imports.push(ImportRef {
                        name,
                        path: specifier.clone(),
                        kind,
                    });
                }
            }
            "named_imports" => {
                for spec in named_children(&part) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name_node) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let name = string_literal(&name_node, content);
                    let local = spec
                        .child_by_field_name("alias")
                        .map(|a| node_text(&a, content).to_string())
                        .unwrap_or_else(|| name.clone());
                    let kind = if statement_type_only || has_token(&spec, "type") {
                        ImportKind::Type
                    } else {
                        ImportKind::Value
                    };
                    all_types &= kind == ImportKind::Type;
                    symbols.bindings.insert(local, specifier.clone());
                    symbols.imports.push(ImportRef {
                        name,
                        path: specifier.clone(),
                        kind,
                    });
                }
            }
            _ => {}
        }
    }
    symbols.note_module(&specifier, all_types);
}

fn collect_export(
    stmt: &Node,
    content: &str,
    local_kinds: &HashMap<String, ExportKind>,
    symbols: &mut FileSymbols,
) {
    let is_default = has_token(stmt, "default");
    let source = stmt
        .child_by_field_name("source")
        .map(|s| string_literal(&s, content));

    if let Some(declaration) = stmt.child_by_field_name("declaration") {
        for (name, kind) in declared_names(&declaration, content) {
            let kind = if is_default { ExportKind::Default } else { kind };
            symbols.exports.push(ExportRef { name, kind });
        }
        return;
    }

    if is_default {
        let name = stmt
            .child_by_field_name("value")
            .filter(|v| v.kind() == "identifier")
            .map(|v| node_text(&v, content).to_string())
            .unwrap_or_else(|| "default".to_string());
        symbols.exports.push(ExportRef {
            name,
            kind: ExportKind::Default,
        });
        return;
    }

    let type_only = has_token(stmt, "type");
    match child_by_kind(stmt, "export_clause") {
        Some(clause) => {
            for spec in named_children(&clause) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let Some(name_node) = spec.child_by_field_name("name") else {
                    continue;
                };
                let name = string_literal(&name_node, content);
                let exported = spec
                    .child_by_field_name("alias")
                    .map(|a| string_literal(&a, content))
                    .unwrap_or_else(|| name.clone());

                match &source {
                    Some(specifier) => {
                        let kind = if type_only || has_token(&spec, "type") {
                            ImportKind::Type
                        } else {
                            ImportKind::Value
                        };
                        symbols.imports.push(ImportRef {
                            name,
                            path: specifier.clone(),
                            kind,
                        });
                        symbols.exports.push(ExportRef {
                            name: exported,
                            kind: ExportKind::ReExport,
                        });
                    }
                    None => {
                        let kind = local_kinds
                            .get(&name)
                            .copied()
                            .unwrap_or(ExportKind::Variable);
                        symbols.exports.push(ExportRef {
                            name: exported,
                            kind,
                        });
                    }
                }
            }
            if let Some(specifier) = &source {
                symbols.note_module(specifier, type_only);
            }
        }
        None => {
            // `export * from './x'` and `export * as ns from './x'`.
            if let Some(specifier) = &source {
                let name = child_by_kind(stmt, "namespace_export")
                    .and_then(|ns| named_children(&ns).into_iter().next())
                    .map(|n| string_literal(&n, content))
                    .unwrap_or_else(|| "*".to_string());
                symbols.imports.push(ImportRef {
                    name: name.clone(),
                    path: specifier.clone(),
                    kind: ImportKind::Namespace,
                });
                symbols.exports.push(ExportRef {
                    name,
                    kind: ExportKind::ReExport,
                });
                symbols.note_module(specifier, false);
            }
        }
    }
}

/// Names introduced by a declaration node with their export classification.
fn declared_names(declaration: &Node, content: &str) -> Vec<(String, ExportKind)> {
    let name_of = |node: &Node| {
        node.child_by_field_name("name")
            .map(|n| node_text(&n, content).to_string())
    };
    let kind = match declaration.kind() {
        "class_declaration" | "abstract_class_declaration" | "class" => ExportKind::Class,
        "interface_declaration" => ExportKind::Interface,
        "type_alias_declaration" => ExportKind::Type,
        "enum_declaration" => ExportKind::Enum,
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            ExportKind::Function
        }
        "lexical_declaration" | "variable_declaration" => {
            return named_children(declaration)
                .iter()
                .filter(|d| d.kind() == "variable_declarator")
                .filter_map(|d| name_of(d))
                .map(|n| (n, ExportKind::Variable))
                .collect();
        }
        _ => return Vec::new(),
    };
    name_of(declaration)
        .map(|n| vec![(n, kind)])
        .unwrap_or_default()
}

/// Top-level declarations, so `export { Foo }` can be classified.
fn local_declaration_kinds(root: &Node, content: &str) -> HashMap<String, ExportKind> {
    let mut kinds = HashMap::new();
    for stmt in named_children(root) {
        let decl = if stmt.kind() == "export_statement" {
            match stmt.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            stmt
        };
        for (name, kind) in declared_names(&decl, content) {
            kinds.insert(name, kind);
        }
    }
    kinds
}

fn collect_heritage(node: &Node, content: &str, symbols: &mut FileSymbols) {
    for child in named_children(node) {
        if child.kind() == "class_heritage" {
            for clause in named_children(&child) {
                match clause.kind() {
                    "extends_clause" => {
                        for value in named_children(&clause) {
                            if value.kind() == "type_arguments" {
                                continue;
                            }
                            symbols.heritage.push(HeritageReference {
                                symbol: heritage_symbol(&value, content),
                                kind: EdgeKind::Extend,
                            });
                        }
                    }
                    "implements_clause" => {
                        for ty in named_children(&clause) {
                            symbols.heritage.push(HeritageReference {
                                symbol: heritage_symbol(&ty, content),
                                kind: EdgeKind::Implement,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        collect_heritage(&child, content, symbols);
    }
}

/// Local binding a heritage expression starts from: `Base`, `ns.Base` -> `ns`,
/// `Base<T>` -> `Base`.
fn heritage_symbol(node: &Node, content: &str) -> String {
    let target = match node.kind() {
        "generic_type" => node.child_by_field_name("name").unwrap_or(*node),
        _ => *node,
    };
    let text = node_text(&target, content);
    let head = text.split(['.', '<', '(']).next().unwrap_or(text);
    head.trim().to_string()
}
