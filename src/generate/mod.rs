mod output;
mod python;

pub use output::{INDENT, Mapping, Output};
pub use python::PythonGenerator;

use crate::graph::{BlockGraph, BlockId};
use serde::Serialize;

/// Timestamp format used in the generated header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generator options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Project title written into the header comment
    pub project_name: String,
    /// Generation time written into the header comment
    pub timestamp: String,
}

impl GenerateOptions {
    /// Options for `project_name`, stamped with the current local time
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

/// Generation result
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub code: String,
    pub mappings: Vec<Mapping>,
    /// Blocks the traversal started from, in graph order
    pub start_blocks: Vec<BlockId>,
    /// Blocks never reached by the traversal, appended without indentation
    pub orphans: Vec<BlockId>,
}

/// Generator trait - converts a block graph snapshot to code
pub trait Generator {
    fn generate(&self, graph: &BlockGraph, options: &GenerateOptions) -> GenerateResult;
}
