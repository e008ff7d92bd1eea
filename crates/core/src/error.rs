use crate::frontmatter::FrontmatterError;
use crate::resolve::ComponentNotFound;
use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that abort an MDX to Markdown conversion.
///
/// Every stage surfaces its own variant and nothing is retried: the first
/// error ends the call.
#[derive(Debug, Error)]
pub enum MdxError {
    /// The source document could not be read.
    #[error("{}: {source}", path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// A components-namespace import matched no file.
    #[error(transparent)]
    ComponentNotFound(#[from] ComponentNotFound),
    /// The frontmatter block was malformed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// Any other bundling failure (syntax, unresolved import, missing export).
    #[error("Bundle error{}: {message}", fmt_location(location))]
    Bundle {
        /// Error message
        message: String,
        /// Source location, when known
        location: Option<SourceLocation>,
    },
    /// Executing or rendering the compiled document failed.
    #[error("Render error: {message}")]
    Render {
        /// Error message
        message: String,
    },
}

impl MdxError {
    /// Create a bundle error without location
    pub fn bundle(message: impl Into<String>) -> Self {
        Self::Bundle {
            message: message.into(),
            location: None,
        }
    }

    /// Create a bundle error with location
    pub fn bundle_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Bundle {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

fn fmt_location(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" at {}", location),
        None => String::new(),
    }
}
