//! Typed field accessors
//!
//! An accessor is bound to one [`FieldId`](crate::tracked::FieldId) and a
//! getter/setter pair, so history entries never resolve fields by name.

use std::fmt;

use crate::tracked::Model;

/// Stable identity of a collection element
pub trait Keyed {
    /// Key type; must survive reordering of the collection
    type Key: Clone + Eq + fmt::Debug + 'static;

    /// This element's key
    fn key(&self) -> Self::Key;
}

/// Scalar field of `T` holding a `V`
pub struct Field<T: Model, V> {
    id: T::Field,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T: Model, V> Field<T, V> {
    /// Bind a field id to its getter and setter
    pub fn new(id: T::Field, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Field { id, get, set }
    }

    /// The field this accessor writes
    pub fn id(&self) -> T::Field {
        self.id
    }

    /// Read the field
    pub fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    /// Write the field
    pub fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

impl<T: Model, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Model, V> Copy for Field<T, V> {}

impl<T: Model, V> fmt::Debug for Field<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.id).finish()
    }
}

/// Collection-valued field of `T` holding `Vec<E>`
pub struct CollectionField<T: Model, E> {
    id: T::Field,
    items: fn(&T) -> &Vec<E>,
    items_mut: fn(&mut T) -> &mut Vec<E>,
}

impl<T: Model, E: Keyed> CollectionField<T, E> {
    /// Bind a field id to the collection it names
    pub fn new(
        id: T::Field,
        items: fn(&T) -> &Vec<E>,
        items_mut: fn(&mut T) -> &mut Vec<E>,
    ) -> Self {
        CollectionField {
            id,
            items,
            items_mut,
        }
    }

    /// The field this accessor writes
    pub fn id(&self) -> T::Field {
        self.id
    }

    /// Current elements
    pub fn items<'a>(&self, target: &'a T) -> &'a [E] {
        (self.items)(target)
    }

    /// Find an element by key
    pub fn find<'a>(&self, target: &'a T, key: &E::Key) -> Option<&'a E> {
        self.items(target).iter().find(|item| item.key() == *key)
    }

    /// Whether an element with this key is present
    pub fn contains(&self, target: &T, key: &E::Key) -> bool {
        self.find(target, key).is_some()
    }

    /// Append an element
    pub fn insert(&self, target: &mut T, item: E) {
        (self.items_mut)(target).push(item);
    }

    /// Remove the element with this key, wherever it currently sits
    pub fn remove(&self, target: &mut T, key: &E::Key) -> Option<E> {
        let items = (self.items_mut)(target);
        let index = items.iter().position(|item| item.key() == *key)?;
        Some(items.remove(index))
    }

    /// Mutable access to the element with this key
    pub fn find_mut<'a>(&self, target: &'a mut T, key: &E::Key) -> Option<&'a mut E> {
        (self.items_mut)(target)
            .iter_mut()
            .find(|item| item.key() == *key)
    }
}

impl<T: Model, E> Clone for CollectionField<T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Model, E> Copy for CollectionField<T, E> {}

impl<T: Model, E> fmt::Debug for CollectionField<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CollectionField").field(&self.id).finish()
    }
}

/// One field of the elements of a keyed collection
pub struct ChildField<T: Model, E, V> {
    collection: CollectionField<T, E>,
    name: &'static str,
    get: fn(&E) -> V,
    set: fn(&mut E, V),
}

impl<T: Model, E: Keyed, V> ChildField<T, E, V> {
    /// Bind a child getter/setter to its parent collection
    pub fn new(
        collection: CollectionField<T, E>,
        name: &'static str,
        get: fn(&E) -> V,
        set: fn(&mut E, V),
    ) -> Self {
        ChildField {
            collection,
            name,
            get,
            set,
        }
    }

    /// Parent collection accessor
    pub fn collection(&self) -> CollectionField<T, E> {
        self.collection
    }

    /// Name of the child field
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field of the child with this key
    pub fn get(&self, target: &T, key: &E::Key) -> Option<V> {
        self.collection.find(target, key).map(self.get)
    }

    /// Write the field of the child with this key; false if no such child
    pub fn set(&self, target: &mut T, key: &E::Key, value: V) -> bool {
        match self.collection.find_mut(target, key) {
            Some(child) => {
                (self.set)(child, value);
                true
            }
            None => false,
        }
    }
}

impl<T: Model, E, V> Clone for ChildField<T, E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Model, E, V> Copy for ChildField<T, E, V> {}

impl<T: Model, E, V> fmt::Debug for ChildField<T, E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildField")
            .field("collection", &self.collection)
            .field("name", &self.name)
            .finish()
    }
}
