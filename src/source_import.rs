//! Seed a project from an existing Python file.

use crate::error::SourceError;
use crate::graph::{BlockGraph, BlockKind};
use tree_sitter::{Node, Parser};

/// What could be recovered from a Python source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonSource {
    /// One normalized statement per imported name, in document order
    pub imports: Vec<String>,
    pub metadata: SourceMetadata,
    /// Name of the first class defined in the file
    pub class_name: Option<String>,
}

/// Header comments written by GUI frame exports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    pub frame_name: Option<String>,
    pub window_title: Option<String>,
    pub window_size: Option<String>,
}

impl PythonSource {
    /// Name for a project seeded from this file: the window title, else the first class
    pub fn project_name(&self) -> Option<&str> {
        self.metadata
            .window_title
            .as_deref()
            .or(self.class_name.as_deref())
    }

    /// Graph with one import block per import statement
    pub fn into_graph(self) -> BlockGraph {
        let mut graph = BlockGraph::new();
        for import in self.imports {
            graph.add_block(BlockKind::Import, "Import", import);
        }
        graph
    }
}

pub(crate) fn python_parser() -> Result<Parser, SourceError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
    Ok(parser)
}

/// Scan Python source for imports, header metadata and the first class name
pub fn parse_python(source: &str) -> Result<PythonSource, SourceError> {
    let mut parser = python_parser()?;
    let tree = parser.parse(source, None).ok_or(SourceError::Parse)?;
    let root = tree.root_node();
    if root.has_error() {
        log::warn!("Python source contains syntax errors; scanning what parsed");
    }

    let bytes = source.as_bytes();
    let mut result = PythonSource {
        metadata: parse_metadata(source),
        ..PythonSource::default()
    };
    collect(root, bytes, &mut result);
    Ok(result)
}

fn parse_metadata(source: &str) -> SourceMetadata {
    let mut metadata = SourceMetadata::default();
    for line in source.lines() {
        if let Some(value) = line.strip_prefix("# Frame:") {
            metadata.frame_name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("# Window Title:") {
            metadata.window_title = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("# Window Size:") {
            metadata.window_size = Some(value.trim().to_string());
        }
    }
    metadata
}

fn text<'s>(node: Node, bytes: &'s [u8]) -> &'s str {
    node.utf8_text(bytes).unwrap_or_default()
}

fn collect(node: Node, bytes: &[u8], result: &mut PythonSource) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                result.imports.push(format!("import {}", text(name, bytes)));
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|m| text(m, bytes))
                .unwrap_or_default();
            let mut cursor = node.walk();
            let names: Vec<&str> = node
                .children_by_field_name("name", &mut cursor)
                .map(|name| text(name, bytes))
                .collect();
            if names.is_empty() {
                // `from x import *` has no name field
                for i in 0..node.child_count() {
                    if let Some(child) = node.child(i) {
                        if child.kind() == "wildcard_import" {
                            result.imports.push(format!("from {} import *", module));
                        }
                    }
                }
            }
            for name in names {
                result.imports.push(format!("from {} import {}", module, name));
            }
        }
        "class_definition" if result.class_name.is_none() => {
            if let Some(name) = node.child_by_field_name("name") {
                result.class_name = Some(text(name, bytes).to_string());
            }
        }
        _ => {}
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect(child, bytes, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imports_in_document_order() {
        let source = "import os, sys\nfrom tkinter import ttk, messagebox as mb\nimport numpy as np\n\ndef f():\n    import json\n";
        let parsed = parse_python(source).unwrap();
        assert_eq!(
            parsed.imports,
            vec![
                "import os",
                "import sys",
                "from tkinter import ttk",
                "from tkinter import messagebox as mb",
                "import numpy as np",
                "import json",
            ]
        );
    }

    #[test]
    fn test_relative_and_wildcard_imports() {
        let parsed = parse_python("from . import views\nfrom os.path import *\n").unwrap();
        assert_eq!(
            parsed.imports,
            vec!["from . import views", "from os.path import *"]
        );
    }

    #[test]
    fn test_metadata_and_class() {
        let source = "# Frame: Main\n# Window Title: Demo\n# Window Size: 400x300\nimport tkinter as tk\n\nclass App:\n    pass\n\nclass Other:\n    pass\n";
        let parsed = parse_python(source).unwrap();
        assert_eq!(parsed.metadata.frame_name.as_deref(), Some("Main"));
        assert_eq!(parsed.metadata.window_title.as_deref(), Some("Demo"));
        assert_eq!(parsed.metadata.window_size.as_deref(), Some("400x300"));
        assert_eq!(parsed.class_name.as_deref(), Some("App"));
        assert_eq!(parsed.project_name(), Some("Demo"));
    }

    #[test]
    fn test_project_name_falls_back_to_class() {
        let parsed = parse_python("import os

class Editor:
    pass
").unwrap();
        assert_eq!(parsed.project_name(), Some("Editor"));
        assert_eq!(parse_python("import os
").unwrap().project_name(), None);
    }

    #[test]
    fn test_into_graph_creates_import_blocks() {
        let graph = parse_python("import os\nimport re\n").unwrap().into_graph();
        let blocks: Vec<_> = graph.blocks().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Import && b.text == "Import"));
        assert_eq!(blocks[1].content, "import re");
    }
}
