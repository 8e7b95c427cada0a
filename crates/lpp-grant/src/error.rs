// error.rs: Error types for the grant-rule grammar.

use thiserror::Error;

/// A line that does not follow the grant-rule grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed grant rule at column {column}: {reason}")]
pub struct GrammarError {
    /// Zero-based byte offset where parsing stopped.
    pub column: usize,
    /// What the parser expected at that point.
    pub reason: String,
}

impl GrammarError {
    pub(crate) fn new(column: usize, reason: impl Into<String>) -> Self {
        Self {
            column,
            reason: reason.into(),
        }
    }
}
