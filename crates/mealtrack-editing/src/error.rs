//! Error types for edit sessions and their collaborators

use mealtrack_undo_redo::UndoRedoError;
use thiserror::Error;
use uuid::Uuid;

use crate::commands::EditorCommand;

/// Errors reported by a repository collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No entity with this id is stored
    #[error("Entity not found: {0}")]
    NotFound(Uuid),

    /// The entity is referenced elsewhere and cannot be removed
    #[error("Entity is in use: {0}")]
    InUse(String),

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors that can occur while editing
///
/// Validation failures are not errors; they are reported through
/// [`FieldErrors`](crate::validation::FieldErrors).
#[derive(Debug, Error)]
pub enum EditError {
    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Undo/redo error
    #[error("History error: {0}")]
    History(#[from] UndoRedoError),

    /// Save requested while not dirty or not valid
    #[error("Cannot save (dirty: {dirty}, valid: {valid})")]
    CannotSave {
        /// Whether the session had changes
        dirty: bool,
        /// Whether the session passed validation
        valid: bool,
    },

    /// Delete requested on a new, invalid or in-use entity
    #[error("Cannot delete: {0}")]
    CannotDelete(String),

    /// Command executed while its `can_execute` was false
    #[error("Command not available: {0}")]
    CommandUnavailable(EditorCommand),

    /// The session was already closed
    #[error("Edit session is closed")]
    SessionClosed,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditError {
    /// Create a new InvalidConfig error with context
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for edit operations
pub type EditResult<T> = Result<T, EditError>;
