//! Structural detector: tree-sitter C parse plus function-level checks.
//!
//! A source that does not parse cleanly yields exactly one `syntax_error`
//! finding and nothing else. Otherwise every function definition with a
//! non-`void` return type is checked for a `return` among the immediate
//! statements of its body. Returns nested in branches or loops are not
//! considered; this is a shallow check, not control-flow analysis.

use crate::detector::Detector;
use crate::error::DetectError;
use cscout_core::{BugCategory, DetectorKind, Finding, Taxonomy};
use std::sync::Arc;
use tree_sitter::{Node, Parser, Tree};

/// Node kinds the detector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    FunctionDefinition,
    ReturnStatement,
    /// Any other `*_statement` node.
    Statement,
    Other,
}

impl NodeKind {
    fn of(node: &Node<'_>) -> Self {
        match node.kind() {
            "function_definition" => NodeKind::FunctionDefinition,
            "return_statement" => NodeKind::ReturnStatement,
            kind if kind.ends_with("_statement") => NodeKind::Statement,
            _ => NodeKind::Other,
        }
    }
}

/// Tree-sitter based detector for C sources.
pub struct StructuralDetector {
    taxonomy: Arc<Taxonomy>,
}

impl StructuralDetector {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Parse C source into a tree.
    pub fn parse(source: &str) -> Result<Tree, DetectError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| DetectError::Grammar(e.to_string()))?;
        parser.parse(source, None).ok_or(DetectError::NoTree)
    }

    /// Scan source text, reporting a parse failure as a finding.
    pub fn scan_source(&self, source: &str) -> Result<Vec<Finding>, DetectError> {
        let tree = Self::parse(source)?;
        let root = tree.root_node();

        if let Err(DetectError::Parse {
            line,
            column,
            message,
        }) = check_syntax(root, source)
        {
            tracing::debug!(line, column, %message, "Source failed to parse");
            let description = format!("Syntax error: {message} at line {line}, column {column}");
            return Ok(vec![Finding::new(
                &self.taxonomy,
                BugCategory::SyntaxError,
                0,
                description,
                DetectorKind::Structural,
            )]);
        }

        let mut findings = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match NodeKind::of(&node) {
                NodeKind::FunctionDefinition => {
                    if let Some(finding) = self.check_function(node, source) {
                        findings.push(finding);
                    }
                }
                NodeKind::ReturnStatement | NodeKind::Statement | NodeKind::Other => {
                    let mut cursor = node.walk();
                    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        Ok(findings)
    }

    fn check_function(&self, node: Node<'_>, source: &str) -> Option<Finding> {
        if returns_void(node, source) {
            return None;
        }
        let body = node.child_by_field_name("body")?;

        let mut cursor = body.walk();
        let has_return = body
            .named_children(&mut cursor)
            .any(|stmt| NodeKind::of(&stmt) == NodeKind::ReturnStatement);
        if has_return {
            return None;
        }

        let name = function_name(node, source);
        Some(Finding::new(
            &self.taxonomy,
            BugCategory::MissingReturn,
            node.start_position().row + 1,
            format!("Function {name} might not return a value"),
            DetectorKind::Structural,
        ))
    }
}

/// Find the first syntax problem: an ERROR or MISSING node, or a statement
/// sitting directly at file scope. A lone `;` at file scope is an empty
/// declaration and is accepted.
fn check_syntax(root: Node<'_>, source: &str) -> Result<(), DetectError> {
    if root.has_error()
        && let Some(bad) = first_error(root)
    {
        let message = if bad.is_missing() {
            format!("missing `{}`", bad.kind())
        } else {
            format!("unexpected `{}`", snippet(&source[bad.byte_range()]))
        };
        return Err(parse_error(bad, message));
    }

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if is_empty_statement(child) {
            continue;
        }
        if matches!(
            NodeKind::of(&child),
            NodeKind::Statement | NodeKind::ReturnStatement
        ) {
            return Err(parse_error(child, "statement outside of a function".into()));
        }
    }
    Ok(())
}

fn is_empty_statement(node: Node<'_>) -> bool {
    node.kind() == "expression_statement" && node.named_child_count() == 0
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn parse_error(node: Node<'_>, message: String) -> DetectError {
    let pos = node.start_position();
    DetectError::Parse {
        line: pos.row + 1,
        column: pos.column + 1,
        message,
    }
}

/// First line of `text`, capped at 40 characters.
fn snippet(text: &str) -> String {
    let first = text.lines().next().unwrap_or("").trim();
    if first.chars().count() > 40 {
        let cut: String = first.chars().take(40).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}

/// `void f()` returns nothing; `void *f()` returns a pointer.
fn returns_void(function: Node<'_>, source: &str) -> bool {
    let is_void_type = function
        .child_by_field_name("type")
        .is_some_and(|ty| source[ty.byte_range()].trim() == "void");
    let declarator_is_function = function
        .child_by_field_name("declarator")
        .is_some_and(|decl| decl.kind() == "function_declarator");
    is_void_type && declarator_is_function
}

fn function_name(function: Node<'_>, source: &str) -> String {
    let mut current = function.child_by_field_name("declarator");
    while let Some(node) = current {
        if node.kind() == "identifier" {
            return source[node.byte_range()].to_string();
        }
        current = node
            .child_by_field_name("declarator")
            .or_else(|| node.named_child(0));
    }
    "<anonymous>".to_string()
}

impl Detector for StructuralDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Structural
    }

    fn detect(&self, source_text: &str) -> Result<Vec<Finding>, DetectError> {
        self.scan_source(source_text)
    }
}
