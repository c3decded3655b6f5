// src/python.rs
//! Python front-end (tree-sitter).
//!
//! A type definition is a top-level `class` statement (decorated or not) or
//! an assignment `Name = factory(...)` whose callee ends in one of the
//! configured type factories. Generated protobuf modules declare messages the
//! second way. Bodies of top-level `if` / `try` / `with` are searched too;
//! function and class bodies are not.

use tree_sitter::{Node, Parser, Tree};

use crate::{
    config::Language,
    error::{LoadError, UnitError},
    loader::{read_source, LoadResult, Reflect, UnitLoader},
    unit::CandidateUnit,
};

pub struct PythonLoader {
    factories: Vec<String>,
}

impl PythonLoader {
    pub fn new(factories: Vec<String>) -> Self {
        Self { factories }
    }

    fn parse_unit(&self, unit: &CandidateUnit) -> Result<PythonUnit, LoadError> {
        let source = read_source(&unit.location)?;
        let tree = parse(&source)?;
        Ok(PythonUnit {
            source,
            tree,
            factories: self.factories.clone(),
        })
    }
}

impl UnitLoader for PythonLoader {
    fn language(&self) -> Language {
        Language::Python
    }

    fn load(&self, unit: &CandidateUnit) -> LoadResult {
        match self.parse_unit(unit) {
            Ok(parsed) => LoadResult::Loaded(Box::new(parsed)),
            Err(err) => LoadResult::Failed(err.into()),
        }
    }
}

/// Parse `source`; any error or missing node in the tree fails the load.
pub fn parse(source: &str) -> Result<Tree, LoadError> {
    // fresh parser per unit
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| LoadError::Parser(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| LoadError::Parser("parse cancelled".into()))?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let pos = bad.start_position();
        let message = if bad.is_missing() {
            format!("missing `{}`", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(LoadError::Syntax {
            line: pos.row + 1,
            column: pos.column + 1,
            message,
        });
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() {
            return Some(child);
        }
        if child.has_error() {
            return first_error(child).or(Some(child));
        }
    }
    None
}

pub struct PythonUnit {
    source: String,
    tree: Tree,
    factories: Vec<String>,
}

impl Reflect for PythonUnit {
    fn type_definitions(&self) -> Result<Vec<String>, UnitError> {
        let mut out = Vec::new();
        self.collect(self.tree.root_node(), &mut out)?;
        Ok(out)
    }
}

impl PythonUnit {
    fn collect(&self, node: Node<'_>, out: &mut Vec<String>) -> Result<(), UnitError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "class_definition" => out.push(self.class_name(child)?),
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field_name("definition") {
                        if def.kind() == "class_definition" {
                            out.push(self.class_name(def)?);
                        }
                    }
                }
                "expression_statement" => self.factory_assignments(child, out),
                "if_statement" | "try_statement" | "with_statement" | "block"
                | "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
                | "finally_clause" => self.collect(child, out)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn class_name(&self, class: Node<'_>) -> Result<String, UnitError> {
        class
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source.as_bytes()).ok())
            .map(str::to_string)
            .ok_or_else(|| {
                UnitError::Reflection(format!(
                    "class without a readable name at line {}",
                    class.start_position().row + 1
                ))
            })
    }

    /// `Name = _reflection.GeneratedProtocolMessageType(...)` and friends.
    fn factory_assignments(&self, stmt: Node<'_>, out: &mut Vec<String>) {
        let src = self.source.as_bytes();
        let mut cursor = stmt.walk();
        for expr in stmt.named_children(&mut cursor) {
            if expr.kind() != "assignment" {
                continue;
            }
            let (Some(left), Some(right)) = (
                expr.child_by_field_name("left"),
                expr.child_by_field_name("right"),
            ) else {
                continue;
            };
            if left.kind() != "identifier" || right.kind() != "call" {
                continue;
            }
            let Some(callee) = right.child_by_field_name("function") else {
                continue;
            };
            let callee_name = match callee.kind() {
                "identifier" => callee.utf8_text(src).ok(),
                "attribute" => callee
                    .child_by_field_name("attribute")
                    .and_then(|a| a.utf8_text(src).ok()),
                _ => None,
            };
            let is_factory = callee_name.is_some_and(|c| self.factories.iter().any(|f| f == c));
            if is_factory {
                if let Ok(name) = left.utf8_text(src) {
                    out.push(name.to_string());
                }
            }
        }
    }
}
