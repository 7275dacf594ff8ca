//! Error type shared by the scanner, parser and document model

use std::io;

use thiserror::Error;

/// Result alias used throughout the library modules
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while scanning, parsing or converting configuration files
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}, column {column}: unexpected character {ch:?}")]
    UnexpectedChar { ch: char, line: usize, column: usize },

    #[error("line {line}: unexpected token {text:?}")]
    UnexpectedToken { text: String, line: usize },

    #[error("line {line}: section header is missing a closing ']'")]
    UnterminatedSection { line: usize },

    #[error("line {line}: section name is empty")]
    EmptySectionName { line: usize },

    #[error("line {line}: expected '=' or '=>' after key {key:?}")]
    MissingAssign { key: String, line: usize },

    #[error("line {line}: assignment without a key")]
    EmptyKey { line: usize },

    #[error("section not found: {0}")]
    SectionNotFound(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid json document: {0}")]
    InvalidJson(String),

    #[error("invalid configuration name: {0:?}")]
    InvalidName(String),

    #[error("invalid device path: {0}")]
    InvalidDevicePath(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the error comes from malformed input rather than the environment
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedChar { .. }
                | Error::UnexpectedToken { .. }
                | Error::UnterminatedSection { .. }
                | Error::EmptySectionName { .. }
                | Error::MissingAssign { .. }
                | Error::EmptyKey { .. }
        )
    }
}
