//! Servings: list-valued fields of (entity, quantity) child records
//!
//! Adds, removes and child edits are recorded against the parent's observable
//! handle, so replaying any of them notifies the parent field and the session
//! recomputes totals and dirty state. Dirty comparison for a serving list goes
//! through [`ServingSet`], which ignores order and serving ids.

use std::fmt;

use mealtrack_undo_redo::{ChangeEntry, ChildField, CollectionField, Keyed};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::{Entity, Named};
use crate::session::{EditSession, Editable};
use crate::validation::join_messages;

/// One child record: a quantity of some entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serving<T> {
    /// Identity of the serving itself, distinct from the item's id
    pub id: Uuid,
    /// The entity served
    pub item: T,
    /// How much of it
    pub quantity: f64,
}

impl<T: Entity> Serving<T> {
    /// New serving with a fresh id
    pub fn new(item: T, quantity: f64) -> Self {
        Serving {
            id: Uuid::new_v4(),
            item,
            quantity,
        }
    }

    /// Id of the served entity
    pub fn item_id(&self) -> Uuid {
        self.item.id()
    }
}

impl<T: Entity + Named> Serving<T> {
    /// Message when the quantity is not positive
    pub fn validate(&self) -> Option<String> {
        if self.quantity > 0.0 {
            None
        } else {
            Some(format!(
                "The quantity of {} must be greater than zero.",
                self.item.name()
            ))
        }
    }
}

impl<T> Keyed for Serving<T> {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Order-independent content of a serving list
///
/// Two lists have equal sets when one is a permutation of the other by
/// (item id, quantity). Serving ids and every other item field are ignored.
/// Quantities compare by `total_cmp`, so a NaN quantity equals itself.
#[derive(Debug, Clone, Default)]
pub struct ServingSet(Vec<(Uuid, f64)>);

impl PartialEq for ServingSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| a.0 == b.0 && a.1.total_cmp(&b.1).is_eq())
    }
}

impl Eq for ServingSet {}

impl ServingSet {
    /// Signature of `servings`
    pub fn of<T: Entity>(servings: &[Serving<T>]) -> Self {
        let mut pairs: Vec<(Uuid, f64)> = servings
            .iter()
            .map(|serving| (serving.item_id(), serving.quantity))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
        ServingSet(pairs)
    }

    /// Number of servings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list was empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Summed quantity for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal<G> {
    /// The group
    pub group: G,
    /// Total quantity in the group
    pub quantity: f64,
}

/// Σ quantity × `per_unit(item)`
pub fn weighted_sum<T>(servings: &[Serving<T>], per_unit: impl Fn(&T) -> f64) -> f64 {
    servings
        .iter()
        .map(|serving| serving.quantity * per_unit(&serving.item))
        .sum()
}

/// Quantities summed per group, ordered by group name
///
/// `breakdown` maps an item to its (group, quantity per unit) pairs; each pair
/// contributes `serving.quantity × quantity` to the group. Groups with equal
/// names keep first-seen order.
pub fn totals_by_group<T, G>(
    servings: &[Serving<T>],
    breakdown: impl Fn(&T) -> Vec<(G, f64)>,
) -> Vec<GroupTotal<G>>
where
    G: Entity + Named,
{
    let mut totals: Vec<GroupTotal<G>> = Vec::new();
    for serving in servings {
        for (group, per_unit) in breakdown(&serving.item) {
            let amount = serving.quantity * per_unit;
            match totals.iter_mut().find(|total| total.group.id() == group.id()) {
                Some(total) => total.quantity += amount,
                None => totals.push(GroupTotal {
                    group,
                    quantity: amount,
                }),
            }
        }
    }
    totals.sort_by(|a, b| a.group.name().cmp(b.group.name()));
    totals
}

/// Child messages joined with two spaces, in list order
pub fn validate_servings<T>(
    servings: &[Serving<T>],
    describe: impl Fn(&Serving<T>) -> Option<String>,
) -> Option<String> {
    join_messages(servings.iter().map(describe))
}

impl<M: Editable> EditSession<M> {
    /// Current contents of a collection field
    pub fn items<E: Keyed + Clone>(&self, field: CollectionField<M, E>) -> Vec<E> {
        self.model.with(|m| field.items(m).to_vec())
    }

    /// Append a child, recording an Add entry on the parent field
    ///
    /// Returns false when the session is closed or a child with the same key
    /// is already present.
    pub fn add_item<E>(&self, field: CollectionField<M, E>, item: E) -> bool
    where
        E: Keyed + Clone + fmt::Debug + 'static,
    {
        if !self.accepts_edits() {
            return false;
        }
        if self.model.with(|m| field.contains(m, &item.key())) {
            tracing::warn!(key = ?item.key(), "add ignored: key already present");
            return false;
        }
        self.history
            .record(ChangeEntry::add(&self.model, field, item.clone()));
        self.model.mutate(field.id(), |m| field.insert(m, item));
        true
    }

    /// Remove the child with `key`, recording a Remove entry on the parent field
    pub fn remove_item<E>(&self, field: CollectionField<M, E>, key: &E::Key) -> Option<E>
    where
        E: Keyed + Clone + fmt::Debug + 'static,
    {
        if !self.accepts_edits() {
            return None;
        }
        let item = self.model.with(|m| field.find(m, key).cloned())?;
        self.history
            .record(ChangeEntry::remove(&self.model, field, item));
        self.model.mutate(field.id(), |m| field.remove(m, key))
    }

    /// Edit one field of the child with `key`
    ///
    /// Recorded as a child-scoped Modify entry; the parent collection field is
    /// notified. Returns false when the child is missing or nothing changed.
    pub fn set_item_field<E, V>(&self, field: ChildField<M, E, V>, key: &E::Key, value: V) -> bool
    where
        E: Keyed + 'static,
        V: Clone + PartialEq + fmt::Debug + 'static,
    {
        if !self.accepts_edits() {
            return false;
        }
        let Some(old) = self.model.with(|m| field.get(m, key)) else {
            return false;
        };
        if old == value {
            return false;
        }
        self.history.record(ChangeEntry::modify_child(
            &self.model,
            field,
            key.clone(),
            old,
            value.clone(),
        ));
        self.model
            .mutate(field.collection().id(), |m| field.set(m, key, value))
    }
}
