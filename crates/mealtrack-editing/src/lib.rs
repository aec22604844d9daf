#![warn(missing_docs)]

//! Edit sessions for mealtrack
//!
//! Dirty/validity tracking on top of the undo/redo log: every editable view
//! owns an [`EditSession`] that records edits, answers "changed since load or
//! save?" and "valid?", gates save/delete, and runs the close prompt state
//! machine.

pub mod close;
pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod repository;
pub mod session;
pub mod validation;

// Re-export public API
pub use close::{close_prompt, decide_close, Answer, CloseAction, ClosePrompt, ConfirmationService};
pub use collection::{
    totals_by_group, validate_servings, weighted_sum, GroupTotal, Serving, ServingSet,
};
pub use commands::{CommandOutcome, EditorCommand};
pub use config::{ConfigLoader, EditorConfig, PromptConfig};
pub use error::{EditError, EditResult, RepositoryError};
pub use repository::{name_is_unique, Entity, InMemoryRepository, Named, Repository, RepositoryEvent};
pub use session::{EditSession, Editable, SessionEvent};
pub use validation::{join_messages, required, FieldErrors, Validator, MESSAGE_SEPARATOR};
