//! Nutrition domain for mealtrack
//!
//! Food groups, meal types, food items and meals, the repositories that hold
//! them, and one editor per entity built on
//! [`EditSession`](mealtrack_editing::EditSession).

#![warn(missing_docs)]

pub mod editors;
pub mod models;
pub mod store;

pub use editors::{
    CatalogEditor, CatalogEntry, FoodGroupEditor, FoodItemEditor, MealEditor, MealTypeEditor,
};
pub use models::{
    fields, CatalogField, FoodGroup, FoodItem, FoodItemField, Meal, MealField, MealType,
};
pub use store::NutritionStore;
