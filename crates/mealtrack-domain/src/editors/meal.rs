use std::ops::Deref;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use mealtrack_editing::{
    required, validate_servings, EditSession, GroupTotal, Serving, Validator,
};
use mealtrack_undo_redo::SharedHistory;
use uuid::Uuid;

use super::NAME_REQUIRED;
use crate::models::{fields, FoodGroup, FoodItem, Meal, MealField, MealType};
use crate::store::NutritionStore;

/// Business rules for meals; names need not be unique
#[derive(Debug, Clone, Copy, Default)]
pub struct MealRules;

impl Validator<Meal> for MealRules {
    fn validate(&self, meal: &Meal, field: MealField) -> Option<String> {
        match field {
            MealField::Name => required(&meal.name, NAME_REQUIRED),
            MealField::Description | MealField::TimeOfMeal => None,
            MealField::MealType if meal.meal_type.is_none() => {
                Some("A meal type is required.".to_string())
            }
            MealField::MealType => None,
            MealField::FoodItemServings if meal.food_item_servings.is_empty() => {
                Some("At least one food item serving is required.".to_string())
            }
            MealField::FoodItemServings => {
                validate_servings(&meal.food_item_servings, Serving::validate)
            }
        }
    }
}

/// Editor for a [`Meal`] and its food item servings
pub struct MealEditor {
    session: EditSession<Meal>,
}

impl MealEditor {
    /// Edit a stored meal
    pub fn open(meal: Meal, store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = Rc::clone(&store.meals);
        MealEditor {
            session: EditSession::open(meal, repository, Rc::new(MealRules), history),
        }
    }

    /// Edit a new meal eaten now
    pub fn create(store: &NutritionStore, history: SharedHistory) -> Self {
        let repository = Rc::clone(&store.meals);
        MealEditor {
            session: EditSession::create(Meal::new(), repository, Rc::new(MealRules), history),
        }
    }

    /// Current name
    pub fn name(&self) -> String {
        self.session.get(fields::meal_name())
    }

    /// Rename; returns false when nothing changed
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        self.session.set(fields::meal_name(), name.into())
    }

    /// Current description
    pub fn description(&self) -> String {
        self.session.get(fields::meal_description())
    }

    /// Replace the description
    pub fn set_description(&self, description: impl Into<String>) -> bool {
        self.session.set(fields::meal_description(), description.into())
    }

    /// Selected meal type
    pub fn meal_type(&self) -> Option<MealType> {
        self.session.get(fields::meal_type())
    }

    /// Select the meal type
    ///
    /// While the name is blank, picking a type also names the meal after it.
    /// That rename is a separate history entry, undone on its own.
    pub fn set_meal_type(&self, meal_type: Option<MealType>) -> bool {
        let default_name = meal_type.as_ref().map(|t| t.name.clone());
        if !self.session.set(fields::meal_type(), meal_type) {
            return false;
        }
        if let Some(name) = default_name {
            if self.name().trim().is_empty() {
                tracing::debug!(name = %name, "meal name defaulted from meal type");
                self.set_name(name);
            }
        }
        true
    }

    /// When the meal was eaten
    pub fn time_of_meal(&self) -> DateTime<Utc> {
        self.session.get(fields::time_of_meal())
    }

    /// Change when the meal was eaten
    pub fn set_time_of_meal(&self, time: DateTime<Utc>) -> bool {
        self.session.set(fields::time_of_meal(), time)
    }

    /// Copy of the current food item servings
    pub fn food_item_servings(&self) -> Vec<Serving<FoodItem>> {
        self.session.items(fields::food_item_servings())
    }

    /// Add a serving of `item`; returns the new serving's id
    pub fn add_food_item(&self, item: FoodItem, quantity: f64) -> Option<Uuid> {
        let serving = Serving::new(item, quantity);
        let id = serving.id;
        self.session
            .add_item(fields::food_item_servings(), serving)
            .then_some(id)
    }

    /// Remove a serving by id; `None` when it is not there
    pub fn remove_food_item(&self, serving_id: Uuid) -> Option<Serving<FoodItem>> {
        self.session
            .remove_item(fields::food_item_servings(), &serving_id)
    }

    /// Change the quantity of one serving
    pub fn set_food_item_quantity(&self, serving_id: Uuid, quantity: f64) -> bool {
        self.session
            .set_item_field(fields::food_item_quantity(), &serving_id, quantity)
    }

    /// Total calories of the meal
    pub fn calories(&self) -> f64 {
        self.session.model().with(Meal::calories)
    }

    /// Food group servings across the meal, ordered by group name
    pub fn food_group_totals(&self) -> Vec<GroupTotal<FoodGroup>> {
        self.session.model().with(Meal::food_group_totals)
    }

    /// The underlying session
    pub fn session(&self) -> &EditSession<Meal> {
        &self.session
    }
}

impl Deref for MealEditor {
    type Target = EditSession<Meal>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}
