#![warn(missing_docs)]

//! Undo/Redo System for mealtrack
//!
//! Field-level change entries, a linear undo/redo log with a done/undone
//! cursor, typed field accessors, and observable model handles whose
//! subscriptions are explicitly disposable.

pub mod change;
pub mod error;
pub mod field;
pub mod history;
pub mod observe;
pub mod tracked;

// Re-export public API
pub use change::{ChangeEntry, ChangeKind, ChangeSummary};
pub use error::UndoRedoError;
pub use field::{ChildField, CollectionField, Field, Keyed};
pub use history::{HistoryConfig, HistoryEntry, HistoryLog, SharedHistory};
pub use observe::{Observers, Subscription};
pub use tracked::{FieldId, Model, Tracked, WeakTracked};
