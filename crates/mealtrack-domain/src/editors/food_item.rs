use std::ops::Deref;
use std::rc::Rc;

use mealtrack_editing::{
    validate_servings, EditSession, GroupTotal, InMemoryRepository, Serving, Validator,
};
use mealtrack_undo_redo::SharedHistory;
use uuid::Uuid;

use super::unique_name_rule;
use crate::models::{fields, FoodGroup, FoodItem, FoodItemField};
use crate::store::NutritionStore;

/// Business rules for food items
pub struct FoodItemRules {
    repository: Rc<InMemoryRepository<FoodItem>>,
}

impl FoodItemRules {
    /// Rules checked against the food items in `repository`
    pub fn new(repository: Rc<InMemoryRepository<FoodItem>>) -> Self {
        FoodItemRules { repository }
    }
}

impl Validator<FoodItem> for FoodItemRules {
    fn validate(&self, item: &FoodItem, field: FoodItemField) -> Option<String> {
        match field {
            FoodItemField::Name => unique_name_rule(&*self.repository, item, "food item"),
            FoodItemField::Description => None,
            FoodItemField::CaloriesPerServing if item.calories_per_serving < 0.0 => {
                Some("Calories per serving must not be negative.".to_string())
            }
            FoodItemField::CaloriesPerServing => None,
            FoodItemField::FoodGroupServings if item.food_group_servings.is_empty() => {
                Some("At least one food group serving is required.".to_string())
            }
            FoodItemField::FoodGroupServings => {
                validate_servings(&item.food_group_servings, Serving::validate)
            }
        }
    }
}

/// Editor for a [`FoodItem`] and its food group servings
pub struct FoodItemEditor {
    session: EditSession<FoodItem>,
}

impl FoodItemEditor {
    /// Edit a stored food item
    pub fn open(item: FoodItem, store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = Rc::clone(&store.food_items);
        let rules = Rc::new(FoodItemRules::new(Rc::clone(&repository)));
        FoodItemEditor {
            session: EditSession::open(item, repository, rules, history),
        }
    }

    /// Edit a new, blank food item
    pub fn create(store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = Rc::clone(&store.food_items);
        let rules = Rc::new(FoodItemRules::new(Rc::clone(&repository)));
        FoodItemEditor {
            session: EditSession::create(FoodItem::new("", 0.0), repository, rules, history),
        }
    }

    /// Current name
    pub fn name(&self) -> String {
        self.session.get(fields::food_item_name())
    }

    /// Rename; returns false when nothing changed
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        self.session.set(fields::food_item_name(), name.into())
    }

    /// Current description
    pub fn description(&self) -> String {
        self.session.get(fields::food_item_description())
    }

    /// Replace the description
    pub fn set_description(&self, description: impl Into<String>) -> bool {
        self.session.set(fields::food_item_description(), description.into())
    }

    /// Calories in one serving
    pub fn calories_per_serving(&self) -> f64 {
        self.session.get(fields::calories_per_serving())
    }

    /// Set calories per serving; negative values are accepted and reported as errors
    pub fn set_calories_per_serving(&self, calories: f64) -> bool {
        self.session.set(fields::calories_per_serving(), calories)
    }

    /// Copy of the current food group servings
    pub fn food_group_servings(&self) -> Vec<Serving<FoodGroup>> {
        self.session.items(fields::food_group_servings())
    }

    /// Add a serving of `group`; returns the new serving's id
    pub fn add_food_group(&self, group: FoodGroup, quantity: f64) -> Option<Uuid> {
        let serving = Serving::new(group, quantity);
        let id = serving.id;
        self.session
            .add_item(fields::food_group_servings(), serving)
            .then_some(id)
    }

    /// Remove a serving by id; `None` when it is not there
    pub fn remove_food_group(&self, serving_id: Uuid) -> Option<Serving<FoodGroup>> {
        self.session
            .remove_item(fields::food_group_servings(), &serving_id)
    }

    /// Change the quantity of one serving
    pub fn set_food_group_quantity(&self, serving_id: Uuid, quantity: f64) -> bool {
        self.session
            .set_item_field(fields::food_group_quantity(), &serving_id, quantity)
    }

    /// Servings per food group, ordered by group name
    pub fn food_group_totals(&self) -> Vec<GroupTotal<FoodGroup>> {
        self.session.model().with(FoodItem::food_group_totals)
    }

    /// The underlying session
    pub fn session(&self) -> &EditSession<FoodItem> {
        &self.session
    }
}

impl Deref for FoodItemEditor {
    type Target = EditSession<FoodItem>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealtrack_editing::{Repository, SessionEvent};
    use std::cell::RefCell;

    fn stored_item(store: &NutritionStore) -> (FoodItem, FoodGroup) {
        let fruit = FoodGroup::new("Fruit", "");
        store.food_groups.save(&fruit).unwrap();
        let apple = FoodItem::new("Apple", 95.0).with_serving(fruit.clone(), 1.0);
        store.food_items.save(&apple).unwrap();
        (apple, fruit)
    }

    #[test]
    fn test_negative_calories_invalid() {
        let store = NutritionStore::new();
        let (apple, _) = stored_item(&store);
        let editor = FoodItemEditor::open(apple, &store, SharedHistory::new());

        editor.set_calories_per_serving(-1.0);
        assert_eq!(
            editor.error().as_deref(),
            Some("Calories per serving must not be negative.")
        );
        editor.set_calories_per_serving(0.0);
        assert!(editor.is_valid());
    }

    #[test]
    fn test_servings_rules() {
        let store = NutritionStore::new();
        let (apple, fruit) = stored_item(&store);
        let editor = FoodItemEditor::open(apple.clone(), &store, SharedHistory::new());

        let only = apple.food_group_servings[0].id;
        editor.remove_food_group(only).unwrap();
        assert_eq!(
            editor.field_error(FoodItemField::FoodGroupServings).as_deref(),
            Some("At least one food group serving is required.")
        );

        let first = editor.add_food_group(fruit.clone(), 0.0).unwrap();
        editor.add_food_group(FoodGroup::new("Sugar", ""), -2.0).unwrap();
        assert_eq!(
            editor.field_error(FoodItemField::FoodGroupServings).as_deref(),
            Some(
                "The quantity of Fruit must be greater than zero.  \
                 The quantity of Sugar must be greater than zero."
            )
        );

        editor.set_food_group_quantity(first, 1.0);
        assert!(editor.field_error(FoodItemField::FoodGroupServings).is_some());
    }

    #[test]
    fn test_readding_equivalent_group_is_clean() {
        let store = NutritionStore::new();
        let (apple, fruit) = stored_item(&store);
        let editor = FoodItemEditor::open(apple.clone(), &store, SharedHistory::new());

        editor.remove_food_group(apple.food_group_servings[0].id);
        assert!(editor.is_dirty());
        editor.add_food_group(fruit, 1.0);
        assert!(!editor.is_dirty());
        assert!(!editor.can_save());
    }

    #[test]
    fn test_quantity_edit_refreshes_totals() {
        let store = NutritionStore::new();
        let (apple, _) = stored_item(&store);
        let editor = FoodItemEditor::open(apple.clone(), &store, SharedHistory::new());

        let totals_events = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&totals_events);
        let _sub = editor.subscribe(move |event| {
            if *event == SessionEvent::Totals {
                *counter.borrow_mut() += 1;
            }
        });

        editor.set_food_group_quantity(apple.food_group_servings[0].id, 2.0);
        assert_eq!(editor.food_group_totals()[0].quantity, 2.0);
        editor.undo().unwrap();
        assert_eq!(editor.food_group_totals()[0].quantity, 1.0);
        assert_eq!(*totals_events.borrow(), 2);
    }
}
