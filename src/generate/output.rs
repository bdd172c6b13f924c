use crate::graph::BlockId;
use serde::Serialize;

/// Indentation unit for one scope level
pub const INDENT: &str = "    ";

/// Generated line -> originating block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    /// 0-based line in the generated code
    pub gen_line: usize,
    pub block: BlockId,
}

/// One emitted line, tagged with the block that started it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'g> {
    pub text: String,
    pub block: &'g BlockId,
}

impl<'g> Line<'g> {
    pub fn indented(block: &'g BlockId, indent: usize, content: &str) -> Self {
        Self {
            text: format!("{}{}", INDENT.repeat(indent), content),
            block,
        }
    }

    /// Append a continued line's text onto this one, separated by a single space
    pub fn merge(&mut self, continued: &str) {
        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        self.text.push(' ');
        self.text.push_str(continued.trim());
    }
}

/// Output buffer that accumulates generated code with mappings
pub struct Output {
    lines: Vec<String>,
    line_number: usize,
    mappings: Vec<Mapping>,
}

impl Output {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            line_number: 0,
            mappings: Vec::new(),
        }
    }

    /// Add text without mapping
    pub fn push(&mut self, text: &str) {
        self.line_number += text.split('\n').count();
        self.lines.push(text.to_string());
    }

    /// Add text with block mapping. Multi-line text maps every line to `block`.
    pub fn push_mapped(&mut self, text: &str, block: &BlockId) {
        let start = self.line_number;
        self.push(text);
        for gen_line in start..self.line_number {
            self.mappings.push(Mapping {
                gen_line,
                block: block.clone(),
            });
        }
    }

    /// Finish and return the generated code
    pub fn finish(self) -> (String, Vec<Mapping>) {
        (self.lines.join("\n"), self.mappings)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
