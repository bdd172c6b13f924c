use super::output::Line;
use super::{GenerateOptions, GenerateResult, Generator, Output};
use crate::graph::{BlockGraph, BlockId};
use std::collections::HashSet;

/// Linearizes a block graph into indented Python source
pub struct PythonGenerator;

impl PythonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Blocks the traversal starts from.
    ///
    /// A start block has no incoming sequence edge and closes no scope. When no
    /// block qualifies (every block sits on a cycle), every block that closes no
    /// scope is used instead.
    pub fn start_blocks(graph: &BlockGraph) -> Vec<&BlockId> {
        let with_incoming: HashSet<&BlockId> = graph.sequence_edges().map(|(_, to)| to).collect();
        let closers: HashSet<&BlockId> = graph.scope_end_edges().map(|(_, closer)| closer).collect();

        let starts: Vec<&BlockId> = graph
            .blocks()
            .map(|block| &block.id)
            .filter(|id| !with_incoming.contains(id) && !closers.contains(id))
            .collect();
        if !starts.is_empty() {
            return starts;
        }

        graph
            .blocks()
            .map(|block| &block.id)
            .filter(|id| !closers.contains(id))
            .collect()
    }
}

impl Default for PythonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for PythonGenerator {
    fn generate(&self, graph: &BlockGraph, options: &GenerateOptions) -> GenerateResult {
        let mut output = Output::new();
        output.push(&format!(
            "# Python code generated from block project: {}",
            options.project_name
        ));
        output.push(&format!("# Generated on: {}", options.timestamp));
        output.push("");

        let start_blocks = Self::start_blocks(graph);
        log::debug!(
            "generating {} blocks from {} start blocks",
            graph.len(),
            start_blocks.len()
        );

        let mut traversal = Traversal::new(graph);
        for &start in &start_blocks {
            traversal.run(start);
        }
        for line in &traversal.lines {
            output.push_mapped(&line.text, line.block);
        }

        // Unreached blocks keep their raw content, unindented
        let mut orphans = Vec::new();
        for block in graph.blocks() {
            if traversal.visited.contains(&block.id) {
                continue;
            }
            log::debug!("block {} is not reachable, appending verbatim", block.id);
            output.push_mapped(&block.content, &block.id);
            orphans.push(block.id.clone());
        }

        let (code, mappings) = output.finish();
        GenerateResult {
            code,
            mappings,
            start_blocks: start_blocks.into_iter().cloned().collect(),
            orphans,
        }
    }
}

/// A scope opened by a block with a registered end block
#[derive(Debug, Clone, Copy)]
struct OpenScope<'g> {
    opener: &'g BlockId,
    /// Indent level of the opener, restored when its end block is emitted
    indent: usize,
}

/// Pending work of the depth-first pass
#[derive(Debug, Clone, Copy)]
enum Task<'g> {
    /// Emit a block at the given level
    Visit { id: &'g BlockId, indent: usize },
    /// Emit the successor at `next` of `id`, then the ones after it
    Successors { id: &'g BlockId, next: usize, body_indent: usize },
    /// The continuation chain started by a block is complete
    EndContinuation,
}

/// State of one depth-first emission pass
struct Traversal<'g> {
    graph: &'g BlockGraph,
    visited: HashSet<&'g BlockId>,
    scopes: Vec<OpenScope<'g>>,
    lines: Vec<Line<'g>>,
    /// The next produced line is appended to the last line instead of starting a new one
    merge_pending: bool,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g BlockGraph) -> Self {
        Self {
            graph,
            visited: HashSet::new(),
            scopes: Vec::new(),
            lines: Vec::new(),
            merge_pending: false,
        }
    }

    /// Whether `id` is the end block of `scope`
    fn closes(&self, scope: &OpenScope<'_>, id: &BlockId) -> bool {
        self.graph.scope_end(scope.opener) == Some(id)
    }

    /// Emit `start` and everything reachable from it at level 0.
    ///
    /// Each block is emitted at most once per pass; re-entry and references to
    /// missing blocks produce nothing.
    fn run(&mut self, start: &'g BlockId) {
        let mut tasks = vec![Task::Visit { id: start, indent: 0 }];

        let graph = self.graph;
        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit { id, indent } => self.visit(id, indent, &mut tasks),
                Task::Successors { id, next, body_indent } => {
                    let Some(target) = graph.successors(id).get(next) else {
                        continue;
                    };
                    tasks.push(Task::Successors { id, next: next + 1, body_indent });

                    // A sequence edge straight into an open scope's end block jumps back out
                    let level = self
                        .scopes
                        .iter()
                        .find(|scope| self.closes(scope, target))
                        .map_or(body_indent, |scope| scope.indent);
                    tasks.push(Task::Visit { id: target, indent: level });
                }
                Task::EndContinuation => self.merge_pending = false,
            }
        }
    }

    fn visit(&mut self, id: &BlockId, indent: usize, tasks: &mut Vec<Task<'g>>) {
        let graph = self.graph;
        let Some(block) = graph.block(id) else {
            log::trace!("skipping reference to missing block {}", id);
            return;
        };
        let id = &block.id;
        if !self.visited.insert(id) {
            return;
        }

        // An end block always lands on its opener's level, innermost scope first
        let mut indent = indent;
        if let Some(position) = self.scopes.iter().rposition(|scope| self.closes(scope, id)) {
            indent = self.scopes.remove(position).indent;
        }
        log::trace!("emitting {} at level {}", id, indent);

        let mut produced = false;
        for content in block.content.split('\n').filter(|line| !line.trim().is_empty()) {
            let line = Line::indented(id, indent, content);
            let merge_onto = if self.merge_pending { self.lines.last_mut() } else { None };
            match merge_onto {
                Some(last) => last.merge(&line.text),
                None => self.lines.push(line),
            }
            self.merge_pending = false;
            produced = true;
        }

        let body_indent = if block.requires_indentation() && graph.scope_end(id).is_some() {
            self.scopes.push(OpenScope { opener: id, indent });
            indent + 1
        } else {
            indent
        };

        // Pushed in reverse: the continuation chain runs before the successors
        tasks.push(Task::Successors { id, next: 0, body_indent });
        if let Some(target) = graph.continue_line(id) {
            if produced {
                self.merge_pending = true;
                tasks.push(Task::EndContinuation);
            }
            tasks.push(Task::Visit { id: target, indent });
        }
    }
}
