//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the question tree's structure.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed question document at line {line}: {reason}")]
    MalformedDocument { line: usize, reason: String },

    #[error("question tree is inconsistent: {0}")]
    InternalConsistency(String),
}

impl DomainError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            line,
            reason: reason.into(),
        }
    }
}
