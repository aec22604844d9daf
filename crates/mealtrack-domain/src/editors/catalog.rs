//! Food group and meal type editors
//!
//! Both entities are a name plus a description, so they share one editor.

use std::ops::Deref;
use std::rc::Rc;

use mealtrack_editing::{EditSession, Editable, InMemoryRepository, Validator};
use mealtrack_undo_redo::{Field, SharedHistory};

use super::unique_name_rule;
use crate::models::{fields, CatalogField, FoodGroup, MealType};
use crate::store::NutritionStore;

/// A named, described entity from one of the lookup catalogs
pub trait CatalogEntry: Editable<Field = CatalogField> {
    /// Lower-case noun used in messages
    const KIND: &'static str;

    /// Name accessor
    fn name_field() -> Field<Self, String>;

    /// Description accessor
    fn description_field() -> Field<Self, String>;

    /// Blank entity for a create-new editor
    fn blank() -> Self;

    /// Repository holding entities of this kind
    fn repository(store: &NutritionStore) -> Rc<InMemoryRepository<Self>>;
}

impl CatalogEntry for FoodGroup {
    const KIND: &'static str = "food group";

    fn name_field() -> Field<Self, String> {
        fields::food_group_name()
    }

    fn description_field() -> Field<Self, String> {
        fields::food_group_description()
    }

    fn blank() -> Self {
        FoodGroup::new("", "")
    }

    fn repository(store: &NutritionStore) -> Rc<InMemoryRepository<Self>> {
        Rc::clone(&store.food_groups)
    }
}

impl CatalogEntry for MealType {
    const KIND: &'static str = "meal type";

    fn name_field() -> Field<Self, String> {
        fields::meal_type_name()
    }

    fn description_field() -> Field<Self, String> {
        fields::meal_type_description()
    }

    fn blank() -> Self {
        MealType::new("", "")
    }

    fn repository(store: &NutritionStore) -> Rc<InMemoryRepository<Self>> {
        Rc::clone(&store.meal_types)
    }
}

/// Name is required and unique within its catalog
pub struct CatalogRules<T: CatalogEntry> {
    repository: Rc<InMemoryRepository<T>>,
}

impl<T: CatalogEntry> CatalogRules<T> {
    /// Rules checked against the entries in `repository`
    pub fn new(repository: Rc<InMemoryRepository<T>>) -> Self {
        CatalogRules { repository }
    }
}

impl<T: CatalogEntry> Validator<T> for CatalogRules<T> {
    fn validate(&self, entry: &T, field: CatalogField) -> Option<String> {
        match field {
            CatalogField::Name => unique_name_rule(&*self.repository, entry, T::KIND),
            CatalogField::Description => None,
        }
    }
}

/// Editor for a catalog entry
pub struct CatalogEditor<T: CatalogEntry> {
    session: EditSession<T>,
}

/// Editor for a [`FoodGroup`]
pub type FoodGroupEditor = CatalogEditor<FoodGroup>;

/// Editor for a [`MealType`]
pub type MealTypeEditor = CatalogEditor<MealType>;

impl<T: CatalogEntry> CatalogEditor<T> {
    /// Edit a stored entry
    pub fn open(entry: T, store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = T::repository(store);
        let rules = Rc::new(CatalogRules::new(Rc::clone(&repository)));
        CatalogEditor {
            session: EditSession::open(entry, repository, rules, history),
        }
    }

    /// Edit a new, blank entry
    pub fn create(store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = T::repository(store);
        let rules = Rc::new(CatalogRules::new(Rc::clone(&repository)));
        CatalogEditor {
            session: EditSession::create(T::blank(), repository, rules, history),
        }
    }

    /// Current name
    pub fn name(&self) -> String {
        self.session.get(T::name_field())
    }

    /// Rename; returns false when nothing changed
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        self.session.set(T::name_field(), name.into())
    }

    /// Current description
    pub fn description(&self) -> String {
        self.session.get(T::description_field())
    }

    /// Replace the description; returns false when nothing changed
    pub fn set_description(&self, description: impl Into<String>) -> bool {
        self.session.set(T::description_field(), description.into())
    }

    /// The underlying session
    pub fn session(&self) -> &EditSession<T> {
        &self.session
    }
}

impl<T: CatalogEntry> Deref for CatalogEditor<T> {
    type Target = EditSession<T>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealtrack_editing::Repository;

    #[test]
    fn test_new_food_group_needs_a_name() {
        let store = NutritionStore::new();
        let editor = FoodGroupEditor::create(&store, SharedHistory::new());

        assert!(editor.is_new());
        assert_eq!(editor.error().as_deref(), Some("A name is required."));
        assert!(!editor.can_save());

        editor.set_name("Vegetables");
        assert!(editor.can_save());
        editor.save().unwrap();
        assert_eq!(store.food_groups.len(), 1);
    }

    #[test]
    fn test_meal_type_name_must_be_unique() {
        let store = NutritionStore::new();
        store.meal_types.save(&MealType::new("Lunch", "")).unwrap();
        let dinner = MealType::new("Dinner", "");
        store.meal_types.save(&dinner).unwrap();

        let editor = MealTypeEditor::open(dinner, &store, SharedHistory::new());
        editor.set_name("lunch");
        assert_eq!(
            editor.field_error(CatalogField::Name).as_deref(),
            Some("Another meal type is already named lunch.")
        );

        editor.set_description("Evening");
        editor.undo().unwrap();
        editor.undo().unwrap();
        assert!(editor.is_valid());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_used_food_group_cannot_be_deleted() {
        let store = NutritionStore::new();
        let dairy = FoodGroup::new("Dairy", "");
        store.food_groups.save(&dairy).unwrap();
        store
            .food_items
            .save(&crate::models::FoodItem::new("Cheese", 110.0).with_serving(dairy.clone(), 1.0))
            .unwrap();

        let editor = FoodGroupEditor::open(dairy, &store, SharedHistory::new());
        assert!(!editor.can_delete());
        assert!(editor.delete().is_err());
    }
}
