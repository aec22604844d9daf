//! Repository collaborator
//!
//! Edit sessions only need `contains`, `is_used` and uniqueness queries; the
//! rest of the trait is what the surrounding application uses to persist and
//! list entities. [`InMemoryRepository`] is the reference implementation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mealtrack_undo_redo::{Observers, Subscription};
use uuid::Uuid;

use crate::error::RepositoryError;

/// Something with a stable identity
pub trait Entity: Clone + 'static {
    /// Stable id, unchanged by edits
    fn id(&self) -> Uuid;
}

/// Something with a display name
pub trait Named {
    /// Display name
    fn name(&self) -> &str;
}

/// Storage for one kind of entity
pub trait Repository<E: Entity> {
    /// Insert or replace the entity with the same id
    fn save(&self, entity: &E) -> Result<(), RepositoryError>;

    /// Remove the entity with the same id
    fn remove(&self, entity: &E) -> Result<(), RepositoryError>;

    /// Whether an entity with the same id is stored
    fn contains(&self, entity: &E) -> bool;

    /// Whether other stored data references this entity
    fn is_used(&self, entity: &E) -> bool;

    /// Stored entity by id
    fn get(&self, id: Uuid) -> Option<E>;

    /// Every stored entity matching the predicate
    fn find_by(&self, predicate: &dyn Fn(&E) -> bool) -> Vec<E>;

    /// Every stored entity
    fn all(&self) -> Vec<E> {
        self.find_by(&|_| true)
    }
}

/// True when no *other* stored entity has the same name
///
/// Names are compared trimmed and case-insensitively. Queried on every call.
pub fn name_is_unique<E: Entity + Named>(repository: &dyn Repository<E>, entity: &E) -> bool {
    let id = entity.id();
    let name = entity.name().trim().to_lowercase();
    repository
        .find_by(&|other| other.id() != id && other.name().trim().to_lowercase() == name)
        .is_empty()
}

/// Change notification published by a repository
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryEvent<E> {
    /// A new entity was saved
    Added(E),
    /// An existing entity was saved again
    Modified(E),
    /// An entity was removed
    Deleted(E),
}

type UsageCheck<E> = Box<dyn Fn(&E) -> bool>;

/// Repository that keeps entities in insertion order in memory
pub struct InMemoryRepository<E: Entity> {
    items: RefCell<Vec<E>>,
    usage: RefCell<Option<UsageCheck<E>>>,
    events: Rc<Observers<RepositoryEvent<E>>>,
}

impl<E: Entity> InMemoryRepository<E> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Create a repository holding `items`
    pub fn with_items(items: impl IntoIterator<Item = E>) -> Self {
        InMemoryRepository {
            items: RefCell::new(items.into_iter().collect()),
            usage: RefCell::new(None),
            events: Observers::new(),
        }
    }

    /// Decide how `is_used` answers, e.g. by querying another repository
    pub fn set_usage_check(&self, check: impl Fn(&E) -> bool + 'static) {
        *self.usage.borrow_mut() = Some(Box::new(check));
    }

    /// Observe added/modified/deleted entities
    pub fn subscribe(&self, listener: impl Fn(&RepositoryEvent<E>) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn save(&self, entity: &E) -> Result<(), RepositoryError> {
        let id = entity.id();
        let event = {
            let mut items = self.items.borrow_mut();
            match items.iter_mut().find(|item| item.id() == id) {
                Some(existing) => {
                    *existing = entity.clone();
                    RepositoryEvent::Modified(entity.clone())
                }
                None => {
                    items.push(entity.clone());
                    RepositoryEvent::Added(entity.clone())
                }
            }
        };
        tracing::debug!(%id, "entity saved");
        self.events.notify(&event);
        Ok(())
    }

    fn remove(&self, entity: &E) -> Result<(), RepositoryError> {
        let id = entity.id();
        if self.is_used(entity) {
            return Err(RepositoryError::InUse(id.to_string()));
        }
        let removed = {
            let mut items = self.items.borrow_mut();
            let index = items
                .iter()
                .position(|item| item.id() == id)
                .ok_or(RepositoryError::NotFound(id))?;
            items.remove(index)
        };
        tracing::debug!(%id, "entity removed");
        self.events.notify(&RepositoryEvent::Deleted(removed));
        Ok(())
    }

    fn contains(&self, entity: &E) -> bool {
        let id = entity.id();
        self.items.borrow().iter().any(|item| item.id() == id)
    }

    fn is_used(&self, entity: &E) -> bool {
        self.usage
            .borrow()
            .as_ref()
            .map(|check| check(entity))
            .unwrap_or(false)
    }

    fn get(&self, id: Uuid) -> Option<E> {
        self.items.borrow().iter().find(|item| item.id() == id).cloned()
    }

    fn find_by(&self, predicate: &dyn Fn(&E) -> bool) -> Vec<E> {
        self.items
            .borrow()
            .iter()
            .filter(|item| predicate(*item))
            .cloned()
            .collect()
    }
}

impl<E: Entity> fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("len", &self.items.borrow().len())
            .finish()
    }
}
