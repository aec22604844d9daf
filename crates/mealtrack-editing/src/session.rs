//! Edit sessions: dirty tracking, validation and save gating for one entity
//!
//! An [`EditSession`] owns the observable handle to the entity being edited
//! and records every edit into a [`SharedHistory`]. Dirty and valid state are
//! derived on every query: dirty compares the entity's current
//! [`Editable::Baseline`] with the one captured at load/save time, valid
//! re-runs the [`Validator`].
//!
//! The session subscribes to its own model at construction. Undo/redo replay
//! mutates the model directly; that subscription is what turns a replayed
//! change into the same [`SessionEvent`]s a user edit produces. The
//! subscription is released on [`EditSession::close`] or drop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use mealtrack_undo_redo::{
    ChangeEntry, Field, Model, Observers, SharedHistory, Subscription, Tracked,
};

use crate::close::{close_prompt, decide_close, CloseAction, ClosePrompt, ConfirmationService};
use crate::config::PromptConfig;
use crate::error::{EditError, EditResult};
use crate::repository::{Entity, Named, Repository};
use crate::validation::{FieldErrors, Validator};

/// An entity that can be edited in a session
pub trait Editable: Model + Entity + Named {
    /// Snapshot of every tracked field, compared to decide dirtiness
    type Baseline: PartialEq + fmt::Debug;

    /// Capture the tracked fields as they are now
    fn baseline(&self) -> Self::Baseline;

    /// Fields whose validity or displayed value depends on `field`
    fn dependents(_field: Self::Field) -> &'static [Self::Field] {
        &[]
    }

    /// Whether `field` feeds the entity's derived totals
    fn affects_totals(_field: Self::Field) -> bool {
        false
    }
}

/// Notification published by a session for its UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent<F> {
    /// A field's value (or something it displays) changed
    Field(F),
    /// Derived totals may have changed
    Totals,
    /// `is_dirty` may have changed
    IsDirty,
    /// `is_valid` may have changed
    IsValid,
    /// `error` may have changed
    Error,
    /// `can_undo` / `can_redo` may have changed
    History,
    /// The entity was saved
    Saved,
    /// The entity was deleted
    Deleted,
    /// The session closed
    Closed,
}

fn forward_field_change<M: Editable>(events: &Observers<SessionEvent<M::Field>>, field: M::Field) {
    events.notify(&SessionEvent::Field(field));
    for dependent in M::dependents(field) {
        events.notify(&SessionEvent::Field(*dependent));
    }
    if M::affects_totals(field) {
        events.notify(&SessionEvent::Totals);
    }
    events.notify(&SessionEvent::IsDirty);
    events.notify(&SessionEvent::IsValid);
    events.notify(&SessionEvent::Error);
    events.notify(&SessionEvent::History);
}

/// Editing contract for one entity
pub struct EditSession<M: Editable> {
    pub(crate) model: Tracked<M>,
    pub(crate) history: SharedHistory,
    baseline: RefCell<M::Baseline>,
    repository: Rc<dyn Repository<M>>,
    validator: Rc<dyn Validator<M>>,
    prompts: PromptConfig,
    is_new: Cell<bool>,
    closed: Cell<bool>,
    events: Rc<Observers<SessionEvent<M::Field>>>,
    model_subscription: RefCell<Option<Subscription>>,
}

impl<M: Editable> EditSession<M> {
    /// Edit an entity loaded from the repository
    pub fn open(
        model: M,
        repository: Rc<dyn Repository<M>>,
        validator: Rc<dyn Validator<M>>,
        history: SharedHistory,
    ) -> Self {
        Self::new(model, false, repository, validator, history)
    }

    /// Edit a freshly constructed entity that is not stored yet
    pub fn create(
        model: M,
        repository: Rc<dyn Repository<M>>,
        validator: Rc<dyn Validator<M>>,
        history: SharedHistory,
    ) -> Self {
        Self::new(model, true, repository, validator, history)
    }

    fn new(
        model: M,
        is_new: bool,
        repository: Rc<dyn Repository<M>>,
        validator: Rc<dyn Validator<M>>,
        history: SharedHistory,
    ) -> Self {
        let model = Tracked::new(model);
        let baseline = model.with(|m| m.baseline());
        let events = Observers::new();

        let forward = Rc::clone(&events);
        let subscription = model.subscribe(move |field| forward_field_change::<M>(&forward, *field));

        tracing::debug!(id = %model.with(|m| m.id()), is_new, "edit session opened");

        EditSession {
            model,
            history,
            baseline: RefCell::new(baseline),
            repository,
            validator,
            prompts: PromptConfig::default(),
            is_new: Cell::new(is_new),
            closed: Cell::new(false),
            events,
            model_subscription: RefCell::new(Some(subscription)),
        }
    }

    /// Use these texts for close prompts
    pub fn with_prompts(mut self, prompts: PromptConfig) -> Self {
        self.prompts = prompts;
        self
    }

    /// Observable handle to the entity being edited
    pub fn model(&self) -> &Tracked<M> {
        &self.model
    }

    /// Clone of the entity as it is now
    pub fn snapshot(&self) -> M {
        self.model.snapshot()
    }

    /// Current value of a field
    pub fn get<V>(&self, field: Field<M, V>) -> V {
        self.model.with(|m| field.get(m))
    }

    /// Edit a field, recording the change; false when nothing changed
    pub fn set<V>(&self, field: Field<M, V>, value: V) -> bool
    where
        V: Clone + PartialEq + fmt::Debug + 'static,
    {
        if !self.accepts_edits() {
            return false;
        }
        let old = self.get(field);
        if old == value {
            return false;
        }
        self.history.record(ChangeEntry::modify(
            &self.model,
            field,
            old,
            value.clone(),
        ));
        self.model.mutate(field.id(), |m| field.set(m, value));
        true
    }

    pub(crate) fn accepts_edits(&self) -> bool {
        if self.closed.get() {
            tracing::warn!("edit ignored: session is closed");
            return false;
        }
        true
    }

    fn ensure_open(&self) -> EditResult<()> {
        if self.closed.get() {
            Err(EditError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Observe session notifications until the subscription is released
    pub fn subscribe(
        &self,
        listener: impl Fn(&SessionEvent<M::Field>) + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    fn publish(&self, event: SessionEvent<M::Field>) {
        self.events.notify(&event);
    }

    /// Whether any tracked field differs from the baseline
    pub fn is_dirty(&self) -> bool {
        let current = self.model.with(|m| m.baseline());
        current != *self.baseline.borrow()
    }

    /// Validation outcome for every field
    pub fn errors(&self) -> FieldErrors<M::Field> {
        self.model
            .with(|m| FieldErrors::collect(|field| self.validator.validate(m, field)))
    }

    /// Message for one field
    pub fn field_error(&self, field: M::Field) -> Option<String> {
        self.model
            .with(|m| self.validator.validate(m, field))
            .filter(|message| !message.is_empty())
    }

    /// Whether every field passes validation
    pub fn is_valid(&self) -> bool {
        self.errors().is_valid()
    }

    /// First validation message in field order
    pub fn error(&self) -> Option<String> {
        self.errors().first().map(str::to_string)
    }

    /// Whether the entity has never been saved
    pub fn is_new(&self) -> bool {
        self.is_new.get()
    }

    /// Whether the session was closed
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Display name used in prompts
    pub fn display_name(&self) -> String {
        self.model.with(|m| m.name().to_string())
    }

    /// Treat the current values as unchanged; history is left alone
    pub fn reset_baseline(&self) {
        let baseline = self.model.with(|m| m.baseline());
        *self.baseline.borrow_mut() = baseline;
        self.publish(SessionEvent::IsDirty);
    }

    /// Save is offered only for changed, valid entities
    pub fn can_save(&self) -> bool {
        !self.closed.get() && self.is_dirty() && self.is_valid()
    }

    /// Store the entity and make the stored state the new baseline
    ///
    /// Undo history survives: undoing afterwards moves to states older than
    /// the save and makes the session dirty again.
    pub fn save(&self) -> EditResult<()> {
        self.ensure_open()?;
        let dirty = self.is_dirty();
        let valid = self.is_valid();
        if !(dirty && valid) {
            return Err(EditError::CannotSave { dirty, valid });
        }

        let entity = self.snapshot();
        self.repository.save(&entity)?;
        self.is_new.set(false);
        self.reset_baseline();

        tracing::info!(id = %entity.id(), name = entity.name(), "entity saved");
        self.publish(SessionEvent::Saved);
        Ok(())
    }

    /// Delete is offered for stored, valid entities nothing else references
    pub fn can_delete(&self) -> bool {
        self.delete_blocker().is_none()
    }

    fn delete_blocker(&self) -> Option<&'static str> {
        if self.closed.get() {
            Some("the session is closed")
        } else if self.is_new.get() {
            Some("the entity has never been saved")
        } else if !self.is_valid() {
            Some("the entity is not valid")
        } else if self.model.with(|m| self.repository.is_used(m)) {
            Some("the entity is in use")
        } else {
            None
        }
    }

    /// Remove the entity from the repository and close the session
    pub fn delete(&self) -> EditResult<()> {
        if let Some(reason) = self.delete_blocker() {
            return Err(EditError::CannotDelete(reason.to_string()));
        }

        let entity = self.snapshot();
        self.repository.remove(&entity)?;
        tracing::info!(id = %entity.id(), name = entity.name(), "entity deleted");
        self.publish(SessionEvent::Deleted);
        self.finish_close();
        Ok(())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.closed.get() && self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.closed.get() && self.history.can_redo()
    }

    /// Revert the most recent edit
    pub fn undo(&self) -> EditResult<()> {
        self.ensure_open()?;
        self.history.undo()?;
        Ok(())
    }

    /// Re-apply the most recently undone edit
    pub fn redo(&self) -> EditResult<()> {
        self.ensure_open()?;
        self.history.redo()?;
        Ok(())
    }

    /// Close the session, asking about unsaved changes as needed
    ///
    /// Clean sessions close without a prompt. Dirty, valid sessions offer
    /// save / discard / cancel. Dirty, invalid sessions only offer discard or
    /// cancel, since saving cannot succeed.
    pub fn close(&self, prompts: &dyn ConfirmationService) -> EditResult<CloseAction> {
        self.ensure_open()?;
        let dirty = self.is_dirty();
        let valid = self.is_valid();
        let name = self.display_name();

        let answer = match close_prompt(dirty, valid) {
            ClosePrompt::None => None,
            ClosePrompt::SaveChanges => Some(prompts.ask_yes_no_cancel(
                &self.prompts.save_question_for(&name),
                &self.prompts.caption,
            )),
            ClosePrompt::DiscardChanges => Some(prompts.ask_yes_no(
                &self.prompts.discard_question_for(&name),
                &self.prompts.caption,
            )),
        };

        let action = decide_close(dirty, valid, answer);
        match action {
            CloseAction::SaveAndClose => {
                self.save()?;
                self.finish_close();
            }
            CloseAction::Close => self.finish_close(),
            CloseAction::Stay => {
                tracing::debug!(name = %name, "close cancelled");
            }
        }
        Ok(action)
    }

    fn finish_close(&self) {
        self.closed.set(true);
        if let Some(subscription) = self.model_subscription.borrow_mut().take() {
            subscription.dispose();
        }
        tracing::info!(id = %self.model.with(|m| m.id()), "edit session closed");
        self.publish(SessionEvent::Closed);
    }
}

impl<M: Editable + fmt::Debug> fmt::Debug for EditSession<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("model", &self.model)
            .field("baseline", &*self.baseline.borrow())
            .field("is_new", &self.is_new.get())
            .field("closed", &self.closed.get())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::collection::Serving;

    #[test]
    fn test_set_records_and_dirties() {
        let fx = stored(blend("Bob"));
        assert!(!fx.session.is_dirty());

        assert!(fx.session.set(name(), "Pete".to_string()));
        assert!(fx.session.is_dirty());
        assert!(fx.session.can_undo());
        assert_eq!(fx.history.len(), 1);
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let fx = stored(blend("Bob"));
        assert!(!fx.session.set(name(), "Bob".to_string()));
        assert!(fx.history.is_empty());
    }

    #[test]
    fn test_edit_back_to_baseline_is_clean() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Pete".to_string());
        fx.session.set(name(), "Bob".to_string());
        assert!(!fx.session.is_dirty());
        assert_eq!(fx.history.len(), 2);
    }

    #[test]
    fn test_undo_replay_does_not_grow_history() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Pete".to_string());
        fx.session.set(notes(), "hot".to_string());

        fx.session.undo().unwrap();
        fx.session.undo().unwrap();
        fx.session.redo().unwrap();

        assert_eq!(fx.history.len(), 2);
        assert_eq!(fx.session.get(name()), "Pete");
        assert_eq!(fx.session.get(notes()), "");
    }

    #[test]
    fn test_events_for_user_edit_and_replay_match() {
        let fx = stored(blend("Bob"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = fx.session.subscribe(move |event| sink.borrow_mut().push(*event));

        fx.session.set(name(), "Pete".to_string());
        let edit_events = seen.borrow_mut().drain(..).collect::<Vec<_>>();
        fx.session.undo().unwrap();
        let undo_events = seen.borrow_mut().drain(..).collect::<Vec<_>>();

        assert_eq!(edit_events, undo_events);
        assert_eq!(
            edit_events,
            vec![
                SessionEvent::Field(BlendField::Name),
                SessionEvent::Field(BlendField::Notes),
                SessionEvent::IsDirty,
                SessionEvent::IsValid,
                SessionEvent::Error,
                SessionEvent::History,
            ]
        );
    }

    #[test]
    fn test_validation_messages() {
        let fx = stored(blend("Bob"));
        fx.repository.save(&blend("Taken")).unwrap();

        fx.session.set(name(), String::new());
        assert!(!fx.session.is_valid());
        assert_eq!(fx.session.error().as_deref(), Some("A name is required."));

        fx.session.set(name(), "taken".to_string());
        assert_eq!(
            fx.session.field_error(BlendField::Name).as_deref(),
            Some("The name is already used.")
        );

        fx.session.set(name(), "Fresh".to_string());
        assert!(fx.session.is_valid());
        assert_eq!(fx.session.error(), None);
    }

    #[test]
    fn test_stored_fixture_starts_valid() {
        let fx = stored(blend("Bob"));
        assert!(fx.session.is_valid());
        assert!(fx.session.can_delete());
        assert!(!fx.session.can_save());
    }

    #[test]
    fn test_empty_spice_list_is_invalid() {
        let fx = stored(empty_blend("Bare"));
        assert!(!fx.session.is_valid());
        assert_eq!(
            fx.session.field_error(BlendField::Spices).as_deref(),
            Some("At least one spice is required.")
        );

        fx.session.add_item(spices(), Serving::new(spice("Nutmeg"), 1.0));
        assert!(fx.session.is_valid());
        assert!(fx.session.can_save());
    }

    #[test]
    fn test_uniqueness_is_requeried_every_time() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), "Curry".to_string());
        assert!(fx.session.is_valid());

        fx.repository.save(&blend("Curry")).unwrap();
        assert!(!fx.session.is_valid());
    }

    #[test]
    fn test_save_resets_baseline_and_keeps_history() {
        let fx = stored(blend("Bob"));
        assert!(!fx.session.can_save());

        fx.session.set(name(), "Pete".to_string());
        assert!(fx.session.can_save());
        fx.session.save().unwrap();

        assert!(!fx.session.is_dirty());
        assert!(fx.session.can_undo());
        let stored_name = fx.repository.get(fx.session.snapshot().id).unwrap().name;
        assert_eq!(stored_name, "Pete");

        fx.session.undo().unwrap();
        assert_eq!(fx.session.get(name()), "Bob");
        assert!(fx.session.is_dirty());
    }

    #[test]
    fn test_save_refused_when_invalid() {
        let fx = stored(blend("Bob"));
        fx.session.set(name(), String::new());
        assert!(matches!(
            fx.session.save(),
            Err(EditError::CannotSave {
                dirty: true,
                valid: false
            })
        ));
    }

    #[test]
    fn test_delete_gating() {
        let repository = Rc::new(crate::repository::InMemoryRepository::<Blend>::new());
        let fresh = EditSession::create(
            blend("New"),
            repository.clone(),
            blend_rules(repository.clone()),
            SharedHistory::new(),
        );
        assert!(fresh.is_new());
        assert!(!fresh.can_delete());

        let fx = stored(blend("Old"));
        assert!(fx.session.can_delete());
        fx.repository.set_usage_check(|_| true);
        assert!(!fx.session.can_delete());
        assert!(matches!(
            fx.session.delete(),
            Err(EditError::CannotDelete(_))
        ));

        fx.repository.set_usage_check(|_| false);
        fx.session.delete().unwrap();
        assert!(fx.repository.is_empty());
        assert!(fx.session.is_closed());
    }

    #[test]
    fn test_new_entity_save_clears_is_new() {
        let repository = Rc::new(crate::repository::InMemoryRepository::<Blend>::new());
        let session = EditSession::create(
            blend(""),
            repository.clone(),
            blend_rules(repository.clone()),
            SharedHistory::new(),
        );
        assert!(!session.can_save());
        session.set(name(), "Garam".to_string());
        session.save().unwrap();

        assert!(!session.is_new());
        assert_eq!(repository.len(), 1);
    }
}
