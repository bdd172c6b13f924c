use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProjectError;

/// Kind of block placed on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Statement,
    #[serde(rename = "function")]
    FunctionCall,
    Control,
    Loop,
    Io,
    Variable,
    Operator,
    Import,
    Gui,
    Class,
    Method,
    Defining,
}

impl BlockKind {
    pub const ALL: [BlockKind; 12] = [
        BlockKind::Statement,
        BlockKind::FunctionCall,
        BlockKind::Control,
        BlockKind::Loop,
        BlockKind::Io,
        BlockKind::Variable,
        BlockKind::Operator,
        BlockKind::Import,
        BlockKind::Gui,
        BlockKind::Class,
        BlockKind::Method,
        BlockKind::Defining,
    ];

    /// Whether blocks of this kind open an indented scope closed by a scope-end block.
    ///
    /// Function calls never do; only definitions, control flow, loops, classes and
    /// methods indent their body.
    pub fn requires_indentation(self) -> bool {
        match self {
            BlockKind::Control
            | BlockKind::Loop
            | BlockKind::Defining
            | BlockKind::Class
            | BlockKind::Method => true,
            BlockKind::Statement
            | BlockKind::FunctionCall
            | BlockKind::Io
            | BlockKind::Variable
            | BlockKind::Operator
            | BlockKind::Import
            | BlockKind::Gui => false,
        }
    }

    /// Name used in project files and block packages
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Statement => "statement",
            BlockKind::FunctionCall => "function",
            BlockKind::Control => "control",
            BlockKind::Loop => "loop",
            BlockKind::Io => "io",
            BlockKind::Variable => "variable",
            BlockKind::Operator => "operator",
            BlockKind::Import => "import",
            BlockKind::Gui => "gui",
            BlockKind::Class => "class",
            BlockKind::Method => "method",
            BlockKind::Defining => "defining",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProjectError::UnknownKind(s.to_string()))
    }
}
