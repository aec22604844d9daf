//! Observable model handles
//!
//! A [`Tracked`] value is the single place an edited model lives while an
//! editor is open. Writes go through [`Tracked::mutate`], which notifies
//! subscribers with the id of the field that changed. Replaying history uses
//! the same primitive, so anything observing the model sees undo/redo exactly
//! like a user edit.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::observe::{Observers, Subscription};

/// Closed, enumerable set of the fields of one model type
pub trait FieldId: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every field, in the order errors and notifications are reported
    const ALL: &'static [Self];

    /// Display name of the field
    fn name(self) -> &'static str;
}

/// A type whose fields can be edited and observed
pub trait Model: 'static {
    /// The model's field set
    type Field: FieldId;
}

struct Inner<T: Model> {
    value: RefCell<T>,
    observers: Rc<Observers<T::Field>>,
}

/// Shared, observable handle to a model
pub struct Tracked<T: Model> {
    inner: Rc<Inner<T>>,
}

impl<T: Model> Tracked<T> {
    /// Wrap a model
    pub fn new(value: T) -> Self {
        Tracked {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                observers: Observers::new(),
            }),
        }
    }

    /// Borrow the current value
    pub fn read(&self) -> Ref<'_, T> {
        self.inner.value.borrow()
    }

    /// Run a closure against the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Clone the current value
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Write to one field and notify subscribers
    ///
    /// The borrow is released before subscribers run.
    pub fn mutate<R>(&self, field: T::Field, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.inner.value.borrow_mut());
        self.notify(field);
        result
    }

    /// Like [`Tracked::mutate`], but only notifies when `f` succeeds
    pub fn try_mutate<R, E>(
        &self,
        field: T::Field,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E> {
        let result = f(&mut self.inner.value.borrow_mut())?;
        self.notify(field);
        Ok(result)
    }

    /// Tell subscribers a field changed
    pub fn notify(&self, field: T::Field) {
        self.inner.observers.notify(&field);
    }

    /// Observe field changes until the subscription is released
    pub fn subscribe(&self, listener: impl Fn(&T::Field) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    /// Non-owning handle, used by history entries
    pub fn downgrade(&self) -> WeakTracked<T> {
        WeakTracked {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same model
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Model> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Tracked {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Model + fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&*self.read()).finish()
    }
}

/// Weak counterpart of [`Tracked`]
pub struct WeakTracked<T: Model> {
    inner: Weak<Inner<T>>,
}

impl<T: Model> WeakTracked<T> {
    /// Recover a strong handle if the model is still alive
    pub fn upgrade(&self) -> Option<Tracked<T>> {
        self.inner.upgrade().map(|inner| Tracked { inner })
    }
}

impl<T: Model> Clone for WeakTracked<T> {
    fn clone(&self) -> Self {
        WeakTracked {
            inner: Weak::clone(&self.inner),
        }
    }
}
