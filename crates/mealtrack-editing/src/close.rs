//! Close gating as a pure state machine
//!
//! The session asks [`close_prompt`] which question (if any) to put to the
//! user, forwards it to a [`ConfirmationService`], and feeds the answer to
//! [`decide_close`].

use serde::{Deserialize, Serialize};

/// User's answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// Yes
    Yes,
    /// No
    No,
    /// Cancel
    Cancel,
}

/// Prompts the user for confirmation
pub trait ConfirmationService {
    /// Two-way question; never answers `Cancel`
    fn ask_yes_no(&self, question: &str, caption: &str) -> Answer;

    /// Three-way question
    fn ask_yes_no_cancel(&self, question: &str, caption: &str) -> Answer;
}

/// Which question closing should ask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePrompt {
    /// Close straight away
    None,
    /// Save, discard or cancel
    SaveChanges,
    /// Discard or cancel
    DiscardChanges,
}

/// What closing resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseAction {
    /// Close without saving
    Close,
    /// Save first, then close
    SaveAndClose,
    /// Keep the session open
    Stay,
}

/// Question to ask before closing
pub fn close_prompt(is_dirty: bool, is_valid: bool) -> ClosePrompt {
    match (is_dirty, is_valid) {
        (false, _) => ClosePrompt::None,
        (true, true) => ClosePrompt::SaveChanges,
        (true, false) => ClosePrompt::DiscardChanges,
    }
}

/// Resolve a close request
///
/// A missing answer on a dirty session means no prompt was shown and the
/// session stays open. An invalid session is never saved.
pub fn decide_close(is_dirty: bool, is_valid: bool, answer: Option<Answer>) -> CloseAction {
    if !is_dirty {
        return CloseAction::Close;
    }
    match (is_valid, answer) {
        (true, Some(Answer::Yes)) => CloseAction::SaveAndClose,
        (true, Some(Answer::No)) => CloseAction::Close,
        (false, Some(Answer::Yes)) => CloseAction::Close,
        _ => CloseAction::Stay,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedPrompts;
    use super::*;
    use crate::repository::Repository;
    use crate::session::test_support::*;

    #[test]
    fn test_decide_close_table() {
        use Answer::*;
        use CloseAction::*;

        assert_eq!(decide_close(false, true, None), Close);
        assert_eq!(decide_close(false, false, None), Close);
        assert_eq!(decide_close(true, true, Some(Yes)), SaveAndClose);
        assert_eq!(decide_close(true, true, Some(No)), Close);
        assert_eq!(decide_close(true, true, Some(Cancel)), Stay);
        assert_eq!(decide_close(true, false, Some(Yes)), Close);
        assert_eq!(decide_close(true, false, Some(No)), Stay);
        assert_eq!(decide_close(true, false, Some(Cancel)), Stay);
    }

    #[test]
    fn test_close_prompt_choice() {
        assert_eq!(close_prompt(false, false), ClosePrompt::None);
        assert_eq!(close_prompt(true, true), ClosePrompt::SaveChanges);
        assert_eq!(close_prompt(true, false), ClosePrompt::DiscardChanges);
    }

    #[test]
    fn test_clean_session_closes_without_prompt() {
        let fx = stored(blend("Bob"));
        let prompts = ScriptedPrompts::answering(Answer::Cancel);

        assert_eq!(fx.session.close(&prompts).unwrap(), CloseAction::Close);
        assert!(prompts.asked.borrow().is_empty());
        assert!(fx.session.is_closed());
    }

    #[test]
    fn test_dirty_valid_yes_saves_and_closes() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Pete".to_string());
        let prompts = ScriptedPrompts::answering(Answer::Yes);

        assert_eq!(
            fx.session.close(&prompts).unwrap(),
            CloseAction::SaveAndClose
        );
        assert!(fx.session.is_closed());
        let id = fx.session.snapshot().id;
        assert_eq!(fx.repository.get(id).unwrap().name, "Pete");
        assert_eq!(
            prompts.asked.borrow()[0],
            (
                "Do you want to save the changes to Pete?".to_string(),
                "Unsaved Changes".to_string()
            )
        );
    }

    #[test]
    fn test_dirty_valid_no_closes_without_saving() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Pete".to_string());
        let prompts = ScriptedPrompts::answering(Answer::No);

        assert_eq!(fx.session.close(&prompts).unwrap(), CloseAction::Close);
        let id = fx.session.snapshot().id;
        assert_eq!(fx.repository.get(id).unwrap().name, "Bob");
    }

    #[test]
    fn test_dirty_valid_cancel_stays_open() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Pete".to_string());
        let prompts = ScriptedPrompts::answering(Answer::Cancel);

        assert_eq!(fx.session.close(&prompts).unwrap(), CloseAction::Stay);
        assert!(!fx.session.is_closed());
        assert!(fx.session.is_dirty());
    }

    #[test]
    fn test_dirty_invalid_yes_discards_without_saving() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), String::new());
        let prompts = ScriptedPrompts::answering(Answer::Yes);

        assert_eq!(fx.session.close(&prompts).unwrap(), CloseAction::Close);
        let id = fx.session.snapshot().id;
        assert_eq!(fx.repository.get(id).unwrap().name, "Bob");
        assert!(prompts.asked.borrow()[0].0.contains("has errors"));
    }

    #[test]
    fn test_dirty_invalid_no_stays_open() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), String::new());
        let prompts = ScriptedPrompts::answering(Answer::No);

        assert_eq!(fx.session.close(&prompts).unwrap(), CloseAction::Stay);
        assert!(!fx.session.is_closed());
    }

    #[test]
    fn test_closed_session_is_inert() {
        let fx = stored(blend("Bob"));
        let prompts = ScriptedPrompts::answering(Answer::Yes);
        fx.session.close(&prompts).unwrap();

        assert!(!fx.session.set(name(), "Pete".to_string()));
        assert!(!fx.session.can_undo());
        assert!(!fx.session.can_save());
        assert!(fx.session.close(&prompts).is_err());
    }
}
