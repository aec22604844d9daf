//! Editor commands for the UI layer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::close::{CloseAction, ConfirmationService};
use crate::error::{EditError, EditResult};
use crate::session::{EditSession, Editable};

/// Command a view binds to a button or key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorCommand {
    /// Revert the last edit
    Undo,
    /// Re-apply the last undone edit
    Redo,
    /// Store the entity
    Save,
    /// Remove the entity
    Delete,
    /// Close the editor
    Close,
}

impl EditorCommand {
    /// Every command, in toolbar order
    pub const ALL: &'static [EditorCommand] = &[
        EditorCommand::Undo,
        EditorCommand::Redo,
        EditorCommand::Save,
        EditorCommand::Delete,
        EditorCommand::Close,
    ];
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EditorCommand::Undo => "undo",
            EditorCommand::Redo => "redo",
            EditorCommand::Save => "save",
            EditorCommand::Delete => "delete",
            EditorCommand::Close => "close",
        };
        write!(f, "{}", label)
    }
}

/// Result of a successfully executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An edit was reverted
    Undone,
    /// An edit was re-applied
    Redone,
    /// The entity was saved
    Saved,
    /// The entity was deleted and the session closed
    Deleted,
    /// The close request resolved to this action
    Close(CloseAction),
}

impl<M: Editable> EditSession<M> {
    /// Whether `command` is currently available
    pub fn can_execute(&self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Undo => self.can_undo(),
            EditorCommand::Redo => self.can_redo(),
            EditorCommand::Save => self.can_save(),
            EditorCommand::Delete => self.can_delete(),
            EditorCommand::Close => !self.is_closed(),
        }
    }

    /// Run `command`; unavailable commands fail without changing anything
    pub fn execute(
        &self,
        command: EditorCommand,
        prompts: &dyn ConfirmationService,
    ) -> EditResult<CommandOutcome> {
        if !self.can_execute(command) {
            tracing::debug!(%command, "command unavailable");
            return Err(EditError::CommandUnavailable(command));
        }
        match command {
            EditorCommand::Undo => self.undo().map(|_| CommandOutcome::Undone),
            EditorCommand::Redo => self.redo().map(|_| CommandOutcome::Redone),
            EditorCommand::Save => self.save().map(|_| CommandOutcome::Saved),
            EditorCommand::Delete => self.delete().map(|_| CommandOutcome::Deleted),
            EditorCommand::Close => self.close(prompts).map(CommandOutcome::Close),
        }
    }

    /// Availability of every command, in toolbar order
    pub fn available_commands(&self) -> Vec<(EditorCommand, bool)> {
        EditorCommand::ALL
            .iter()
            .map(|command| (*command, self.can_execute(*command)))
            .collect()
    }
}
