//! Nutrition entities and their typed field sets

use chrono::{DateTime, Utc};
use mealtrack_editing::{
    totals_by_group, weighted_sum, Editable, Entity, GroupTotal, Named, Serving, ServingSet,
};
use mealtrack_undo_redo::{FieldId, Model};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of food, e.g. "Dairy" or "Grains"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodGroup {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique among food groups
    pub name: String,
    /// Free text
    pub description: String,
}

impl FoodGroup {
    /// New food group with a fresh id
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        FoodGroup {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Kind of meal, e.g. "Breakfast"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealType {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique among meal types
    pub name: String,
    /// Free text
    pub description: String,
}

impl MealType {
    /// New meal type with a fresh id
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        MealType {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Something that can be eaten, broken down into food groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique among food items
    pub name: String,
    /// Free text
    pub description: String,
    /// Calories in one serving; never negative
    pub calories_per_serving: f64,
    /// Food group servings in one serving of this item
    pub food_group_servings: Vec<Serving<FoodGroup>>,
}

impl FoodItem {
    /// New food item without any food group servings
    pub fn new(name: impl Into<String>, calories_per_serving: f64) -> Self {
        FoodItem {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            calories_per_serving,
            food_group_servings: Vec::new(),
        }
    }

    /// Add a food group serving; builder style for fixtures and imports
    pub fn with_serving(mut self, group: FoodGroup, quantity: f64) -> Self {
        self.food_group_servings.push(Serving::new(group, quantity));
        self
    }

    /// Servings per food group, ordered by group name
    pub fn food_group_totals(&self) -> Vec<GroupTotal<FoodGroup>> {
        totals_by_group(&self.food_group_servings, |group: &FoodGroup| {
            vec![(group.clone(), 1.0)]
        })
    }
}

/// A logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique identifier
    pub id: Uuid,
    /// Display name; several meals may share one
    pub name: String,
    /// Free text
    pub description: String,
    /// Required before the meal can be saved
    pub meal_type: Option<MealType>,
    /// When the meal was eaten
    pub time_of_meal: DateTime<Utc>,
    /// What was eaten, and how much
    pub food_item_servings: Vec<Serving<FoodItem>>,
}

impl Meal {
    /// Blank meal eaten now
    pub fn new() -> Self {
        Meal {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            meal_type: None,
            time_of_meal: Utc::now(),
            food_item_servings: Vec::new(),
        }
    }

    /// Σ quantity × calories per serving
    pub fn calories(&self) -> f64 {
        weighted_sum(&self.food_item_servings, |item: &FoodItem| {
            item.calories_per_serving
        })
    }

    /// Food group servings across every food item, ordered by group name
    pub fn food_group_totals(&self) -> Vec<GroupTotal<FoodGroup>> {
        totals_by_group(&self.food_item_servings, |item: &FoodItem| {
            item.food_group_servings
                .iter()
                .map(|serving| (serving.item.clone(), serving.quantity))
                .collect()
        })
    }
}

impl Default for Meal {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_entity {
    ($($ty:ty),+) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }
            }

            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )+
    };
}

impl_entity!(FoodGroup, MealType, FoodItem, Meal);

/// Tracked fields of [`FoodGroup`] and [`MealType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogField {
    /// [`FoodGroup::name`] or [`MealType::name`]
    Name,
    /// [`FoodGroup::description`] or [`MealType::description`]
    Description,
}

impl FieldId for CatalogField {
    const ALL: &'static [Self] = &[CatalogField::Name, CatalogField::Description];

    fn name(self) -> &'static str {
        match self {
            CatalogField::Name => "Name",
            CatalogField::Description => "Description",
        }
    }
}

/// Tracked fields of [`FoodItem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodItemField {
    /// [`FoodItem::name`]
    Name,
    /// [`FoodItem::description`]
    Description,
    /// [`FoodItem::calories_per_serving`]
    CaloriesPerServing,
    /// [`FoodItem::food_group_servings`], including edits to a single serving
    FoodGroupServings,
}

impl FieldId for FoodItemField {
    const ALL: &'static [Self] = &[
        FoodItemField::Name,
        FoodItemField::Description,
        FoodItemField::CaloriesPerServing,
        FoodItemField::FoodGroupServings,
    ];

    fn name(self) -> &'static str {
        match self {
            FoodItemField::Name => "Name",
            FoodItemField::Description => "Description",
            FoodItemField::CaloriesPerServing => "CaloriesPerServing",
            FoodItemField::FoodGroupServings => "FoodGroupServings",
        }
    }
}

/// Tracked fields of [`Meal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealField {
    /// [`Meal::name`]
    Name,
    /// [`Meal::description`]
    Description,
    /// [`Meal::meal_type`]
    MealType,
    /// [`Meal::time_of_meal`]
    TimeOfMeal,
    /// [`Meal::food_item_servings`], including edits to a single serving
    FoodItemServings,
}

impl FieldId for MealField {
    const ALL: &'static [Self] = &[
        MealField::Name,
        MealField::Description,
        MealField::MealType,
        MealField::TimeOfMeal,
        MealField::FoodItemServings,
    ];

    fn name(self) -> &'static str {
        match self {
            MealField::Name => "Name",
            MealField::Description => "Description",
            MealField::MealType => "MealType",
            MealField::TimeOfMeal => "TimeOfMeal",
            MealField::FoodItemServings => "FoodItemServings",
        }
    }
}

impl Model for FoodGroup {
    type Field = CatalogField;
}

impl Model for MealType {
    type Field = CatalogField;
}

impl Model for FoodItem {
    type Field = FoodItemField;
}

impl Model for Meal {
    type Field = MealField;
}

impl Editable for FoodGroup {
    type Baseline = (String, String);

    fn baseline(&self) -> Self::Baseline {
        (self.name.clone(), self.description.clone())
    }
}

impl Editable for MealType {
    type Baseline = (String, String);

    fn baseline(&self) -> Self::Baseline {
        (self.name.clone(), self.description.clone())
    }
}

impl Editable for FoodItem {
    type Baseline = (String, String, f64, ServingSet);

    fn baseline(&self) -> Self::Baseline {
        (
            self.name.clone(),
            self.description.clone(),
            self.calories_per_serving,
            ServingSet::of(&self.food_group_servings),
        )
    }

    fn affects_totals(field: FoodItemField) -> bool {
        field == FoodItemField::FoodGroupServings
    }
}

impl Editable for Meal {
    type Baseline = (String, String, Option<Uuid>, DateTime<Utc>, ServingSet);

    fn baseline(&self) -> Self::Baseline {
        (
            self.name.clone(),
            self.description.clone(),
            self.meal_type.as_ref().map(|meal_type| meal_type.id),
            self.time_of_meal,
            ServingSet::of(&self.food_item_servings),
        )
    }

    // Picking a type can default the name, and fixes the name's "required" message.
    fn dependents(field: MealField) -> &'static [MealField] {
        match field {
            MealField::MealType => &[MealField::Name],
            _ => &[],
        }
    }

    fn affects_totals(field: MealField) -> bool {
        field == MealField::FoodItemServings
    }
}

/// Field accessors bound at compile time
pub mod fields {
    use mealtrack_undo_redo::{ChildField, CollectionField, Field};

    use super::*;

    /// Name of a food group
    pub fn food_group_name() -> Field<FoodGroup, String> {
        Field::new(CatalogField::Name, |g| g.name.clone(), |g, v| g.name = v)
    }

    /// Description of a food group
    pub fn food_group_description() -> Field<FoodGroup, String> {
        Field::new(
            CatalogField::Description,
            |g| g.description.clone(),
            |g, v| g.description = v,
        )
    }

    /// Name of a meal type
    pub fn meal_type_name() -> Field<MealType, String> {
        Field::new(CatalogField::Name, |t| t.name.clone(), |t, v| t.name = v)
    }

    /// Description of a meal type
    pub fn meal_type_description() -> Field<MealType, String> {
        Field::new(
            CatalogField::Description,
            |t| t.description.clone(),
            |t, v| t.description = v,
        )
    }

    /// Name of a food item
    pub fn food_item_name() -> Field<FoodItem, String> {
        Field::new(FoodItemField::Name, |i| i.name.clone(), |i, v| i.name = v)
    }

    /// Description of a food item
    pub fn food_item_description() -> Field<FoodItem, String> {
        Field::new(
            FoodItemField::Description,
            |i| i.description.clone(),
            |i, v| i.description = v,
        )
    }

    /// Calories in one serving of a food item
    pub fn calories_per_serving() -> Field<FoodItem, f64> {
        Field::new(
            FoodItemField::CaloriesPerServing,
            |i| i.calories_per_serving,
            |i, v| i.calories_per_serving = v,
        )
    }

    /// Food group servings of a food item
    pub fn food_group_servings() -> CollectionField<FoodItem, Serving<FoodGroup>> {
        CollectionField::new(
            FoodItemField::FoodGroupServings,
            |i| &i.food_group_servings,
            |i| &mut i.food_group_servings,
        )
    }

    /// Quantity of one food group serving, recorded against the item's servings
    pub fn food_group_quantity() -> ChildField<FoodItem, Serving<FoodGroup>, f64> {
        ChildField::new(
            food_group_servings(),
            "Quantity",
            |s| s.quantity,
            |s, v| s.quantity = v,
        )
    }

    /// Name of a meal
    pub fn meal_name() -> Field<Meal, String> {
        Field::new(MealField::Name, |m| m.name.clone(), |m, v| m.name = v)
    }

    /// Description of a meal
    pub fn meal_description() -> Field<Meal, String> {
        Field::new(
            MealField::Description,
            |m| m.description.clone(),
            |m, v| m.description = v,
        )
    }

    /// Meal type of a meal
    pub fn meal_type() -> Field<Meal, Option<MealType>> {
        Field::new(
            MealField::MealType,
            |m| m.meal_type.clone(),
            |m, v| m.meal_type = v,
        )
    }

    /// When a meal was eaten
    pub fn time_of_meal() -> Field<Meal, DateTime<Utc>> {
        Field::new(
            MealField::TimeOfMeal,
            |m| m.time_of_meal,
            |m, v| m.time_of_meal = v,
        )
    }

    /// Food item servings of a meal
    pub fn food_item_servings() -> CollectionField<Meal, Serving<FoodItem>> {
        CollectionField::new(
            MealField::FoodItemServings,
            |m| &m.food_item_servings,
            |m| &mut m.food_item_servings,
        )
    }

    /// Quantity of one food item serving, recorded against the meal's servings
    pub fn food_item_quantity() -> ChildField<Meal, Serving<FoodItem>, f64> {
        ChildField::new(
            food_item_servings(),
            "Quantity",
            |s| s.quantity,
            |s, v| s.quantity = v,
        )
    }
}
