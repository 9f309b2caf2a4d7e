//! Error types for the preprocessor engine.

use std::path::PathBuf;

/// Result type alias for preprocessor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the preprocessor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input structure found during scanning.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// Structural violation found while flattening the tree.
    #[error("rendering error at line {line}, column {column}: {message}")]
    Render {
        message: String,
        line: u32,
        column: u32,
    },

    /// Failure raised by a transform handler, re-wrapped with the position
    /// of the block it was visiting.
    #[error("{message}")]
    Transform { message: String },

    /// An input- or output-stage handler aborted the pipeline.
    #[error("pipeline handler failed: {0}")]
    Handler(String),

    /// File I/O error.
    #[error("failed to read stylesheet '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a rendering error.
    pub fn render(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Render {
            message: message.into(),
            line,
            column,
        }
    }

    /// Wrap a transform handler failure.
    ///
    /// The original message is preserved verbatim; the block's start line is
    /// included when the block carries one (parsed blocks do, synthetic
    /// blocks do not).
    pub fn transform(original: impl std::fmt::Display, line: Option<u32>) -> Self {
        let message = match line {
            Some(line) => format!("transform handler failed at line {line}: {original}"),
            None => format!("transform handler failed: {original}"),
        };
        Self::Transform { message }
    }

    /// Create a handler contract error.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
