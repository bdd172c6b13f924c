use super::{BlockGraph, BlockId};
use crate::palette::placeholders;
use std::collections::HashMap;
use std::fmt;

/// Kind of graph diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    DanglingReference,
    ScopeEndOnPlainBlock,
    MissingScopeEnd,
    SharedScopeEnd,
    UnfilledPlaceholder,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DanglingReference => "Dangling reference",
            DiagnosticKind::ScopeEndOnPlainBlock => "Scope end on plain block",
            DiagnosticKind::MissingScopeEnd => "Missing scope end",
            DiagnosticKind::SharedScopeEnd => "Shared scope end",
            DiagnosticKind::UnfilledPlaceholder => "Unfilled placeholder",
        }
    }
}

/// Advisory finding about a graph. Generation never depends on these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub block: BlockId,
    pub message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, block: &BlockId, message: impl Into<String>) -> Self {
        Self {
            kind,
            block: block.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind.as_str(), self.block, self.message)
    }
}

/// Collect diagnostics for a graph snapshot, in block order then edge order
pub fn validate(graph: &BlockGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for block in graph.blocks() {
        if block.requires_indentation() && graph.scope_end(&block.id).is_none() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingScopeEnd,
                &block.id,
                format!("{} block has no end block; its body will not be indented", block.kind),
            ));
        }

        let names = placeholders(&block.content);
        if !names.is_empty() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnfilledPlaceholder,
                &block.id,
                format!("content still contains {}", names.iter().map(|n| format!("{{{n}}}")).collect::<Vec<_>>().join(", ")),
            ));
        }
    }

    let relations = [
        ("sequence", graph.sequence_edges().collect::<Vec<_>>()),
        ("end", graph.scope_end_edges().collect()),
        ("continue", graph.continue_line_edges().collect()),
    ];
    for (relation, edges) in &relations {
        for (from, to) in edges {
            for endpoint in [*from, *to] {
                if !graph.contains(endpoint) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DanglingReference,
                        endpoint,
                        format!("{relation} connection {from} -> {to} refers to a missing block"),
                    ));
                }
            }
        }
    }

    let mut openers_by_closer: HashMap<&BlockId, Vec<&BlockId>> = HashMap::new();
    for (opener, closer) in graph.scope_end_edges() {
        if let Some(block) = graph.block(opener) {
            if !block.requires_indentation() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ScopeEndOnPlainBlock,
                    opener,
                    format!("{} blocks do not open a scope; the end connection is ignored", block.kind),
                ));
            }
        }
        openers_by_closer.entry(closer).or_default().push(opener);
    }
    for (closer, _) in graph.scope_end_edges() {
        let Some(openers) = openers_by_closer.remove(closer) else {
            continue;
        };
        if openers.len() > 1 {
            let names: Vec<String> = openers.iter().map(|id| id.to_string()).collect();
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::SharedScopeEnd,
                closer,
                format!("closes the scopes of {}", names.join(", ")),
            ));
        }
    }

    diagnostics
}
