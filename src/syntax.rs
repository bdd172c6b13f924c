use crate::error::SourceError;
use crate::source_import::python_parser;
use serde::Serialize;
use std::fmt;
use tree_sitter::Node;

/// A spot where generated code does not parse as Python
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxIssue {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Parse generated code and report every error or missing node
pub fn check(code: &str) -> Result<Vec<SyntaxIssue>, SourceError> {
    let mut parser = python_parser()?;
    let tree = parser.parse(code, None).ok_or(SourceError::Parse)?;
    let root = tree.root_node();

    let mut issues = Vec::new();
    if root.has_error() {
        collect_issues(root, code.as_bytes(), &mut issues);
    }
    Ok(issues)
}

fn collect_issues(node: Node, bytes: &[u8], issues: &mut Vec<SyntaxIssue>) {
    let position = node.start_position();
    if node.is_missing() {
        issues.push(SyntaxIssue {
            line: position.row + 1,
            column: position.column + 1,
            message: format!("missing {}", node.kind()),
        });
        return;
    }
    if node.is_error() {
        let snippet = node
            .utf8_text(bytes)
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .trim();
        issues.push(SyntaxIssue {
            line: position.row + 1,
            column: position.column + 1,
            message: format!("invalid syntax near `{}`", snippet),
        });
        return;
    }
    if !node.has_error() {
        return;
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect_issues(child, bytes, issues);
        }
    }
}
