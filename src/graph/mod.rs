mod kind;
pub mod validate;

pub use kind::BlockKind;
pub use validate::{Diagnostic, DiagnosticKind, validate};

use crate::error::GraphError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable block identifier, never reissued within a graph's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Counter value encoded in a generated `block_<n>` id
    fn counter_value(&self) -> Option<u64> {
        self.0.strip_prefix("block_")?.parse().ok()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A node in the block graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Label shown on the canvas
    pub text: String,
    /// Literal source lines, without indentation
    pub content: String,
    /// Palette template the block was created from
    pub template: Option<String>,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            kind,
            text: content.clone(),
            content,
            template: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn requires_indentation(&self) -> bool {
        self.kind.requires_indentation()
    }
}

/// Blocks plus the three edge relations drawn between them.
///
/// Blocks keep insertion order, which is the order the generator uses when it
/// picks starting blocks and drains unreached ones. Edge relations may refer to
/// ids that are not (or no longer) blocks when a graph was loaded from disk;
/// readers must tolerate that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockGraph {
    pub(crate) blocks: IndexMap<BlockId, Block>,
    pub(crate) sequence: IndexMap<BlockId, Vec<BlockId>>,
    pub(crate) scope_end: IndexMap<BlockId, BlockId>,
    pub(crate) continue_line: IndexMap<BlockId, BlockId>,
    pub(crate) continue_sources: IndexMap<BlockId, Vec<BlockId>>,
    pub(crate) next_id: u64,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Blocks in insertion order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Counter used for the next fresh id
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Sequence successors of `id`, in the order the edges were drawn
    pub fn successors(&self, id: &BlockId) -> &[BlockId] {
        self.sequence.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All sequence edges as (from, to) pairs
    pub fn sequence_edges(&self) -> impl Iterator<Item = (&BlockId, &BlockId)> {
        self.sequence
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    pub fn has_incoming_sequence(&self, id: &BlockId) -> bool {
        self.sequence.values().any(|targets| targets.contains(id))
    }

    /// Block that closes the scope opened by `opener`
    pub fn scope_end(&self, opener: &BlockId) -> Option<&BlockId> {
        self.scope_end.get(opener)
    }

    pub fn scope_end_edges(&self) -> impl Iterator<Item = (&BlockId, &BlockId)> {
        self.scope_end.iter()
    }

    /// Whether some opener names `id` as its scope end
    pub fn is_scope_end_target(&self, id: &BlockId) -> bool {
        self.scope_end.values().any(|closer| closer == id)
    }

    /// Block whose content continues on the same line as `id`
    pub fn continue_line(&self, id: &BlockId) -> Option<&BlockId> {
        self.continue_line.get(id)
    }

    pub fn continue_line_edges(&self) -> impl Iterator<Item = (&BlockId, &BlockId)> {
        self.continue_line.iter()
    }

    /// Blocks continuing onto `id` (editor display only)
    pub fn continue_sources(&self, id: &BlockId) -> &[BlockId] {
        self.continue_sources
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Immutable copy handed to the generator
    pub fn snapshot(&self) -> BlockGraph {
        self.clone()
    }

    fn fresh_id(&mut self) -> BlockId {
        loop {
            let id = BlockId(format!("block_{}", self.next_id));
            self.next_id += 1;
            if !self.blocks.contains_key(&id) {
                return id;
            }
        }
    }

    fn require(&self, id: &BlockId) -> Result<&Block, GraphError> {
        self.blocks
            .get(id)
            .ok_or_else(|| GraphError::UnknownBlock(id.clone()))
    }

    fn require_pair(&self, from: &BlockId, to: &BlockId) -> Result<(), GraphError> {
        self.require(from)?;
        self.require(to)?;
        if from == to {
            return Err(GraphError::SelfConnection(from.clone()));
        }
        Ok(())
    }

    /// Create a block with a fresh id
    pub fn add_block(
        &mut self,
        kind: BlockKind,
        text: impl Into<String>,
        content: impl Into<String>,
    ) -> BlockId {
        let id = self.fresh_id();
        let block = Block {
            id: id.clone(),
            kind,
            text: text.into(),
            content: content.into(),
            template: None,
        };
        self.blocks.insert(id.clone(), block);
        id
    }

    /// Insert a block under its own id, replacing any block with the same id in place
    pub fn insert_block(&mut self, block: Block) {
        if let Some(n) = block.id.counter_value() {
            if n >= self.next_id {
                self.next_id = n + 1;
            }
        }
        self.blocks.insert(block.id.clone(), block);
    }

    /// Remove a block together with every edge touching it
    pub fn remove_block(&mut self, id: &BlockId) -> Option<Block> {
        let block = self.blocks.shift_remove(id)?;

        self.sequence.shift_remove(id);
        for targets in self.sequence.values_mut() {
            targets.retain(|to| to != id);
        }
        self.sequence.retain(|_, targets| !targets.is_empty());

        self.scope_end.shift_remove(id);
        self.scope_end.retain(|_, closer| closer != id);

        if let Some(target) = self.continue_line.shift_remove(id) {
            self.drop_continue_source(&target, id);
        }
        self.continue_line.retain(|_, target| target != id);
        self.continue_sources.shift_remove(id);

        Some(block)
    }

    /// Copy a block's kind and content under a fresh id, without its edges
    pub fn duplicate_block(&mut self, id: &BlockId) -> Result<BlockId, GraphError> {
        let original = self.require(id)?.clone();
        let new_id = self.fresh_id();
        self.blocks.insert(
            new_id.clone(),
            Block {
                id: new_id.clone(),
                ..original
            },
        );
        Ok(new_id)
    }

    /// Replace a block's content. Short literal content also becomes the label.
    pub fn set_content(&mut self, id: &BlockId, content: impl Into<String>) -> Result<(), GraphError> {
        let block = self
            .blocks
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownBlock(id.clone()))?;
        block.content = content.into();
        if !block.content.contains('{') && block.content.chars().count() < 30 {
            block.text = block.content.clone();
        }
        Ok(())
    }

    pub fn connect_sequence(&mut self, from: &BlockId, to: &BlockId) -> Result<(), GraphError> {
        self.require_pair(from, to)?;
        self.push_sequence(from.clone(), to.clone());
        Ok(())
    }

    /// Remove every outgoing sequence edge of `from`
    pub fn disconnect_sequence(&mut self, from: &BlockId) -> Vec<BlockId> {
        self.sequence.shift_remove(from).unwrap_or_default()
    }

    pub fn set_scope_end(&mut self, opener: &BlockId, closer: &BlockId) -> Result<(), GraphError> {
        self.require_pair(opener, closer)?;
        let block = self.require(opener)?;
        if !block.requires_indentation() {
            return Err(GraphError::NotScopeOpening {
                id: opener.clone(),
                kind: block.kind,
            });
        }
        self.scope_end.insert(opener.clone(), closer.clone());
        Ok(())
    }

    pub fn clear_scope_end(&mut self, opener: &BlockId) -> Option<BlockId> {
        self.scope_end.shift_remove(opener)
    }

    pub fn set_continue_line(&mut self, from: &BlockId, to: &BlockId) -> Result<(), GraphError> {
        self.require_pair(from, to)?;
        self.push_continue_line(from.clone(), to.clone());
        Ok(())
    }

    pub fn clear_continue_line(&mut self, from: &BlockId) -> Option<BlockId> {
        let target = self.continue_line.shift_remove(from)?;
        self.drop_continue_source(&target, from);
        Some(target)
    }

    /// Add a sequence edge without checking its endpoints
    pub(crate) fn push_sequence(&mut self, from: BlockId, to: BlockId) {
        let targets = self.sequence.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// Add a scope-end mapping without checking its endpoints
    pub(crate) fn push_scope_end(&mut self, opener: BlockId, closer: BlockId) {
        self.scope_end.insert(opener, closer);
    }

    /// Add a continue-line mapping without checking its endpoints
    pub(crate) fn push_continue_line(&mut self, from: BlockId, to: BlockId) {
        if let Some(previous) = self.continue_line.insert(from.clone(), to.clone()) {
            self.drop_continue_source(&previous, &from);
        }
        let sources = self.continue_sources.entry(to).or_default();
        if !sources.contains(&from) {
            sources.push(from);
        }
    }

    fn drop_continue_source(&mut self, target: &BlockId, source: &BlockId) {
        if let Some(sources) = self.continue_sources.get_mut(target) {
            sources.retain(|s| s != source);
            if sources.is_empty() {
                self.continue_sources.shift_remove(target);
            }
        }
    }
}
