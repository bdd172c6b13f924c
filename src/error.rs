use crate::graph::{BlockId, BlockKind};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Rejected edit to a block graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    UnknownBlock(BlockId),
    SelfConnection(BlockId),
    NotScopeOpening { id: BlockId, kind: BlockKind },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::UnknownBlock(id) => write!(f, "Unknown block: {}", id),
            GraphError::SelfConnection(id) => write!(f, "Block {} cannot connect to itself", id),
            GraphError::NotScopeOpening { id, kind } => write!(
                f,
                "Block {} is a {} block, which does not take an end block",
                id, kind
            ),
        }
    }
}

impl std::error::Error for GraphError {}

/// Error reading or writing a project file
#[derive(Debug)]
pub enum ProjectError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    UnknownKind(String),
}

impl ProjectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProjectError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        ProjectError::Json(err)
    }
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ProjectError::Json(err) => write!(f, "Invalid project file: {}", err),
            ProjectError::UnknownKind(kind) => write!(f, "Unknown block type: {}", kind),
        }
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectError::Io { source, .. } => Some(source),
            ProjectError::Json(err) => Some(err),
            ProjectError::UnknownKind(_) => None,
        }
    }
}

/// Error merging a block package into the palette
#[derive(Debug)]
pub enum PaletteError {
    Json(serde_json::Error),
    MissingCategory,
}

impl From<serde_json::Error> for PaletteError {
    fn from(err: serde_json::Error) -> Self {
        PaletteError::Json(err)
    }
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::Json(err) => write!(f, "Invalid package file: {}", err),
            PaletteError::MissingCategory => write!(f, "A category name is required for this package"),
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::Json(err) => Some(err),
            PaletteError::MissingCategory => None,
        }
    }
}

/// Error running the Python grammar
#[derive(Debug)]
pub enum SourceError {
    Grammar(tree_sitter::LanguageError),
    Parse,
}

impl From<tree_sitter::LanguageError> for SourceError {
    fn from(err: tree_sitter::LanguageError) -> Self {
        SourceError::Grammar(err)
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Grammar(err) => write!(f, "Failed to load Python grammar: {}", err),
            SourceError::Parse => write!(f, "Python parser produced no tree"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Any error surfaced to the command line
#[derive(Debug)]
pub enum Error {
    Project(ProjectError),
    Palette(PaletteError),
    Source(SourceError),
    Io { path: PathBuf, source: io::Error },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ProjectError> for Error {
    fn from(err: ProjectError) -> Self {
        Error::Project(err)
    }
}

impl From<PaletteError> for Error {
    fn from(err: PaletteError) -> Self {
        Error::Palette(err)
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Error::Source(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Project(err) => write!(f, "{}", err),
            Error::Palette(err) => write!(f, "{}", err),
            Error::Source(err) => write!(f, "{}", err),
            Error::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for Error {}
