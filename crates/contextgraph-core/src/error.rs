use std::fmt;
use thiserror::Error;

/// Pipeline stage a wrapped failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Extract,
    Analyze,
    Diff,
    Persist,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Extract => "extraction",
            Operation::Analyze => "analysis",
            Operation::Diff => "diff",
            Operation::Persist => "persist",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum ContextGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid version id: {0:?}")]
    InvalidVersion(String),

    #[error("{operation} failed: {message}")]
    Stage { operation: Operation, message: String },

    #[error("version not found: {0}")]
    VersionNotFound(String),
}

impl ContextGraphError {
    pub fn stage(operation: Operation, message: impl fmt::Display) -> Self {
        ContextGraphError::Stage {
            operation,
            message: message.to_string(),
        }
    }

    /// The stage that produced this failure, when it was wrapped with one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ContextGraphError::Stage { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn is_version_not_found(&self) -> bool {
        matches!(self, ContextGraphError::VersionNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ContextGraphError>;

/// Wraps any displayable failure with the stage it happened in.
///
/// Errors that already carry a stage, and `VersionNotFound`, pass through
/// untouched so the innermost origin is preserved.
pub trait StageExt<T> {
    fn stage(self, operation: Operation) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, operation: Operation) -> Result<T> {
        self.map_err(|e| match e {
            e @ ContextGraphError::Stage { .. } | e @ ContextGraphError::VersionNotFound(_) => e,
            other => ContextGraphError::stage(operation, other),
        })
    }
}
