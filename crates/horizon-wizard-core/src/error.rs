//! Error types for Horizon Wizard core.

use thiserror::Error;

/// Errors raised when reading or writing the data document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The path was empty or contained an empty segment.
    #[error("invalid document path '{path}'")]
    InvalidPath { path: String },

    /// A segment of the path resolved to a value that cannot hold children.
    #[error("cannot write '{path}': '{segment}' is not an object")]
    NotAnObject { path: String, segment: String },

    /// The document root must be a JSON object.
    #[error("document root must be an object, got {kind}")]
    InvalidRoot { kind: &'static str },
}

impl DocumentError {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create a non-object segment error.
    pub fn not_an_object(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::NotAnObject {
            path: path.into(),
            segment: segment.into(),
        }
    }
}

/// A specialized Result type for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
