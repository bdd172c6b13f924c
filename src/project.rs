//! `.aide` project files.
//!
//! The `*_lines` arrays are the source of truth for edges; the per-block
//! `connections`, `end_connection`, `continue_connection` and
//! `prev_connections` fields are written for the editor and ignored on load.
//! Canvas fields (`x`, `y`, `width`, `height`, `color`, ...) are carried through
//! untouched.

use crate::error::ProjectError;
use crate::graph::{Block, BlockGraph, BlockId, BlockKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// File extension of project files
pub const EXTENSION: &str = "aide";

#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    project_name: String,
    #[serde(default)]
    blocks: IndexMap<BlockId, BlockRecord>,
    #[serde(default)]
    block_counter: u64,
    #[serde(default)]
    sequence_lines: Vec<(BlockId, BlockId)>,
    #[serde(default)]
    end_lines: Vec<(BlockId, BlockId)>,
    #[serde(default)]
    continue_lines: Vec<(BlockId, BlockId)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockRecord {
    id: BlockId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default)]
    connections: Vec<BlockId>,
    #[serde(default)]
    end_connection: Option<BlockId>,
    #[serde(default)]
    continue_connection: Option<BlockId>,
    #[serde(default)]
    prev_connections: Vec<BlockId>,
    #[serde(flatten)]
    canvas: Map<String, Value>,
}

/// A named block graph plus the canvas state saved alongside it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub name: String,
    pub graph: BlockGraph,
    /// Per-block canvas fields, opaque to the generator
    pub canvas: IndexMap<BlockId, Map<String, Value>>,
}

impl Project {
    pub fn new(name: impl Into<String>, graph: BlockGraph) -> Self {
        Self {
            name: name.into(),
            graph,
            canvas: IndexMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let file: ProjectFile = serde_json::from_str(json)?;

        let mut graph = BlockGraph::new();
        graph.next_id = file.block_counter;
        let mut canvas = IndexMap::new();
        for (key, record) in file.blocks {
            if key != record.id {
                log::warn!("block stored under {} has id {}, using the key", key, record.id);
            }
            let kind: BlockKind = record.kind.parse()?;
            if !record.canvas.is_empty() {
                canvas.insert(key.clone(), record.canvas);
            }
            graph.insert_block(Block {
                id: key,
                kind,
                text: record.text,
                content: record.content,
                template: record.template,
            });
        }

        for (from, to) in file.sequence_lines {
            graph.push_sequence(from, to);
        }
        for (opener, closer) in file.end_lines {
            graph.push_scope_end(opener, closer);
        }
        for (from, to) in file.continue_lines {
            graph.push_continue_line(from, to);
        }

        Ok(Self {
            name: file.project_name,
            graph,
            canvas,
        })
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        let graph = &self.graph;
        let blocks = graph
            .blocks()
            .map(|block| {
                let record = BlockRecord {
                    id: block.id.clone(),
                    kind: block.kind.as_str().to_string(),
                    text: block.text.clone(),
                    content: block.content.clone(),
                    template: block.template.clone(),
                    connections: graph.successors(&block.id).to_vec(),
                    end_connection: graph.scope_end(&block.id).cloned(),
                    continue_connection: graph.continue_line(&block.id).cloned(),
                    prev_connections: graph.continue_sources(&block.id).to_vec(),
                    canvas: self.canvas.get(&block.id).cloned().unwrap_or_default(),
                };
                (block.id.clone(), record)
            })
            .collect();

        let file = ProjectFile {
            project_name: self.name.clone(),
            blocks,
            block_counter: graph.next_id(),
            sequence_lines: pairs(graph.sequence_edges()),
            end_lines: pairs(graph.scope_end_edges()),
            continue_lines: pairs(graph.continue_line_edges()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| ProjectError::io(path, e))
    }
}

fn pairs<'a>(edges: impl Iterator<Item = (&'a BlockId, &'a BlockId)>) -> Vec<(BlockId, BlockId)> {
    edges.map(|(a, b)| (a.clone(), b.clone())).collect()
}
