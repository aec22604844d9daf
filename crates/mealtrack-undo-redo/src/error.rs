//! Error types for the undo/redo system

use thiserror::Error;

/// Errors that can occur in the undo/redo system
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoRedoError {
    /// No more undos available
    #[error("No more undos available")]
    NoMoreUndos,

    /// No more redos available
    #[error("No more redos available")]
    NoMoreRedos,

    /// The object (or collection element) an entry refers to is gone
    #[error("Stale change target: {0}")]
    StaleTarget(String),
}

impl UndoRedoError {
    /// Create a new StaleTarget error with context
    pub fn stale_target(msg: impl Into<String>) -> Self {
        Self::StaleTarget(msg.into())
    }
}
