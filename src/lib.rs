pub mod error;
pub mod generate;
pub mod graph;
pub mod palette;
pub mod project;
pub mod source_import;
pub mod syntax;

pub use error::{Error, GraphError, PaletteError, ProjectError, SourceError};
pub use generate::{GenerateOptions, GenerateResult, Generator, Mapping, PythonGenerator};
pub use graph::{Block, BlockGraph, BlockId, BlockKind, Diagnostic, DiagnosticKind, validate};
pub use palette::{BlockTemplate, Palette};
pub use project::Project;

/// Generate Python for a graph snapshot.
///
/// Never fails: dangling references are skipped, cycles are cut by emitting
/// each block once, and unreachable blocks are appended verbatim.
pub fn generate(graph: &BlockGraph, options: &GenerateOptions) -> GenerateResult {
    PythonGenerator::new().generate(graph, options)
}

/// Generate Python and return only the code
pub fn generate_code(graph: &BlockGraph, options: &GenerateOptions) -> String {
    generate(graph, options).code
}
