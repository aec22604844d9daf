//! Invertible change entries

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UndoRedoError;
use crate::field::{ChildField, CollectionField, Field, Keyed};
use crate::tracked::{FieldId, Model, Tracked, WeakTracked};

/// Type of change made to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Scalar value replaced
    Modify,
    /// Element added to a collection field
    Add,
    /// Element removed from a collection field
    Remove,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Modify => write!(f, "Modify"),
            ChangeKind::Add => write!(f, "Add"),
            ChangeKind::Remove => write!(f, "Remove"),
        }
    }
}

/// The two directions of one recorded edit
trait Replay {
    fn apply(&self) -> Result<(), UndoRedoError>;
    fn revert(&self) -> Result<(), UndoRedoError>;
}

fn upgrade<T: Model>(target: &WeakTracked<T>, field: &str) -> Result<Tracked<T>, UndoRedoError> {
    target.upgrade().ok_or_else(|| {
        tracing::warn!(field, "change target was dropped while still referenced by history");
        UndoRedoError::stale_target(format!("{} target no longer exists", field))
    })
}

struct ModifyOp<T: Model, V> {
    target: WeakTracked<T>,
    field: Field<T, V>,
    old: V,
    new: V,
}

impl<T: Model, V: Clone> Replay for ModifyOp<T, V> {
    fn apply(&self) -> Result<(), UndoRedoError> {
        let target = upgrade(&self.target, self.field.id().name())?;
        let value = self.new.clone();
        target.mutate(self.field.id(), |model| self.field.set(model, value));
        Ok(())
    }

    fn revert(&self) -> Result<(), UndoRedoError> {
        let target = upgrade(&self.target, self.field.id().name())?;
        let value = self.old.clone();
        target.mutate(self.field.id(), |model| self.field.set(model, value));
        Ok(())
    }
}

/// Shared by Add and Remove: one inserts on the way forward, the other on the way back
struct MembershipOp<T: Model, E> {
    target: WeakTracked<T>,
    field: CollectionField<T, E>,
    item: E,
}

impl<T: Model, E: Keyed + Clone> MembershipOp<T, E> {
    fn insert(&self) -> Result<(), UndoRedoError> {
        let target = upgrade(&self.target, self.field.id().name())?;
        let item = self.item.clone();
        target.mutate(self.field.id(), |model| self.field.insert(model, item));
        Ok(())
    }

    fn remove(&self) -> Result<(), UndoRedoError> {
        let name = self.field.id().name();
        let target = upgrade(&self.target, name)?;
        let key = self.item.key();
        target.try_mutate(self.field.id(), |model| {
            self.field.remove(model, &key).map(|_| ()).ok_or_else(|| {
                tracing::warn!(field = name, key = ?key, "collection element missing during replay");
                UndoRedoError::stale_target(format!("{} has no element {:?}", name, key))
            })
        })
    }
}

struct AddOp<T: Model, E>(MembershipOp<T, E>);

impl<T: Model, E: Keyed + Clone> Replay for AddOp<T, E> {
    fn apply(&self) -> Result<(), UndoRedoError> {
        self.0.insert()
    }

    fn revert(&self) -> Result<(), UndoRedoError> {
        self.0.remove()
    }
}

struct RemoveOp<T: Model, E>(MembershipOp<T, E>);

impl<T: Model, E: Keyed + Clone> Replay for RemoveOp<T, E> {
    fn apply(&self) -> Result<(), UndoRedoError> {
        self.0.remove()
    }

    fn revert(&self) -> Result<(), UndoRedoError> {
        self.0.insert()
    }
}

struct ChildModifyOp<T: Model, E: Keyed, V> {
    target: WeakTracked<T>,
    field: ChildField<T, E, V>,
    key: E::Key,
    old: V,
    new: V,
}

impl<T: Model, E: Keyed, V: Clone> ChildModifyOp<T, E, V> {
    fn write(&self, value: &V) -> Result<(), UndoRedoError> {
        let collection = self.field.collection().id();
        let target = upgrade(&self.target, collection.name())?;
        let value = value.clone();
        // Notified as a change of the parent collection: aggregates depend on it
        target.try_mutate(collection, |model| {
            if self.field.set(model, &self.key, value) {
                Ok(())
            } else {
                tracing::warn!(
                    field = self.field.name(),
                    key = ?self.key,
                    "child element missing during replay"
                );
                Err(UndoRedoError::stale_target(format!(
                    "{} has no element {:?}",
                    collection.name(),
                    self.key
                )))
            }
        })
    }
}

impl<T: Model, E: Keyed, V: Clone> Replay for ChildModifyOp<T, E, V> {
    fn apply(&self) -> Result<(), UndoRedoError> {
        self.write(&self.new)
    }

    fn revert(&self) -> Result<(), UndoRedoError> {
        self.write(&self.old)
    }
}

/// One atomic, invertible edit of one field of one target
///
/// Entries hold only a weak reference to their target; the edited object is
/// owned by whoever opened the editor.
pub struct ChangeEntry {
    id: Uuid,
    timestamp: DateTime<Utc>,
    kind: ChangeKind,
    field: &'static str,
    description: String,
    replay: Box<dyn Replay>,
}

impl ChangeEntry {
    fn from_parts(
        kind: ChangeKind,
        field: &'static str,
        description: String,
        replay: Box<dyn Replay>,
    ) -> Self {
        ChangeEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            field,
            description,
            replay,
        }
    }

    /// Record a scalar change from `old` to `new`
    pub fn modify<T, V>(target: &Tracked<T>, field: Field<T, V>, old: V, new: V) -> Self
    where
        T: Model,
        V: Clone + fmt::Debug + 'static,
    {
        let name = field.id().name();
        let description = format!("{}: {:?} -> {:?}", name, old, new);
        Self::from_parts(
            ChangeKind::Modify,
            name,
            description,
            Box::new(ModifyOp {
                target: target.downgrade(),
                field,
                old,
                new,
            }),
        )
    }

    /// Record the addition of `item` to a collection field
    pub fn add<T, E>(target: &Tracked<T>, field: CollectionField<T, E>, item: E) -> Self
    where
        T: Model,
        E: Keyed + Clone + fmt::Debug + 'static,
    {
        let name = field.id().name();
        let description = format!("{}: add {:?}", name, item);
        Self::from_parts(
            ChangeKind::Add,
            name,
            description,
            Box::new(AddOp(MembershipOp {
                target: target.downgrade(),
                field,
                item,
            })),
        )
    }

    /// Record the removal of `item` from a collection field
    pub fn remove<T, E>(target: &Tracked<T>, field: CollectionField<T, E>, item: E) -> Self
    where
        T: Model,
        E: Keyed + Clone + fmt::Debug + 'static,
    {
        let name = field.id().name();
        let description = format!("{}: remove {:?}", name, item);
        Self::from_parts(
            ChangeKind::Remove,
            name,
            description,
            Box::new(RemoveOp(MembershipOp {
                target: target.downgrade(),
                field,
                item,
            })),
        )
    }

    /// Record a change to one field of the child keyed by `key`
    pub fn modify_child<T, E, V>(
        target: &Tracked<T>,
        field: ChildField<T, E, V>,
        key: E::Key,
        old: V,
        new: V,
    ) -> Self
    where
        T: Model,
        E: Keyed + 'static,
        V: Clone + fmt::Debug + 'static,
    {
        let name = field.collection().id().name();
        let description = format!("{}[{:?}].{}: {:?} -> {:?}", name, key, field.name(), old, new);
        Self::from_parts(
            ChangeKind::Modify,
            name,
            description,
            Box::new(ChildModifyOp {
                target: target.downgrade(),
                field,
                key,
                old,
                new,
            }),
        )
    }

    /// Perform the edit again
    pub fn apply(&self) -> Result<(), UndoRedoError> {
        self.replay.apply()
    }

    /// Restore the field to its state before the edit
    pub fn revert(&self) -> Result<(), UndoRedoError> {
        self.replay.revert()
    }

    /// Unique identifier for this entry
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the edit was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Kind of edit
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Name of the affected field
    pub fn field_name(&self) -> &'static str {
        self.field
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Serializable view of this entry
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            id: self.id,
            timestamp: self.timestamp,
            kind: self.kind,
            field: self.field.to_string(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("description", &self.description)
            .finish()
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.description
        )
    }
}

/// Detached, serializable description of a [`ChangeEntry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Entry id
    pub id: Uuid,
    /// When the edit was recorded
    pub timestamp: DateTime<Utc>,
    /// Kind of edit
    pub kind: ChangeKind,
    /// Name of the affected field
    pub field: String,
    /// Human-readable description
    pub description: String,
}
