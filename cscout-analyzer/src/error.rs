//! Error types for the analyzer crate.

use thiserror::Error;

/// Errors a detector can raise.
///
/// `Parse` never leaves the structural detector; it is turned into a
/// `syntax_error` finding. Everything else is isolated by the aggregator.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("{message} at line {line}, column {column}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("failed to load C grammar: {0}")]
    Grammar(String),
    #[error("parser returned no tree")]
    NoTree,
    #[error("{0}")]
    Other(String),
}

/// Errors from fix synthesis and preview.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("line {line} out of range (source has {count} lines)")]
    InvalidLine { line: usize, count: usize },
    #[error("conflicting fixes for line {0}")]
    Conflict(usize),
}
