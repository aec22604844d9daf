//! In-memory nutrition store
//!
//! One repository per entity kind, with usage checks wired so that a food
//! group used by a food item, a food item used by a meal, or a meal type used
//! by a meal cannot be deleted.

use std::rc::Rc;

use mealtrack_editing::{InMemoryRepository, Repository};

use crate::models::{FoodGroup, FoodItem, Meal, MealType};

/// Repositories for every nutrition entity
#[derive(Debug, Clone)]
pub struct NutritionStore {
    /// Food groups; in use while any food item has a serving of them
    pub food_groups: Rc<InMemoryRepository<FoodGroup>>,
    /// Meal types; in use while any meal refers to them
    pub meal_types: Rc<InMemoryRepository<MealType>>,
    /// Food items; in use while any meal has a serving of them
    pub food_items: Rc<InMemoryRepository<FoodItem>>,
    /// Logged meals
    pub meals: Rc<InMemoryRepository<Meal>>,
}

impl NutritionStore {
    /// Empty store
    pub fn new() -> Self {
        let store = NutritionStore {
            food_groups: Rc::new(InMemoryRepository::new()),
            meal_types: Rc::new(InMemoryRepository::new()),
            food_items: Rc::new(InMemoryRepository::new()),
            meals: Rc::new(InMemoryRepository::new()),
        };

        let food_items = Rc::clone(&store.food_items);
        store.food_groups.set_usage_check(move |group: &FoodGroup| {
            !food_items
                .find_by(&|item: &FoodItem| {
                    item.food_group_servings
                        .iter()
                        .any(|serving| serving.item.id == group.id)
                })
                .is_empty()
        });

        let meals = Rc::clone(&store.meals);
        store.food_items.set_usage_check(move |item: &FoodItem| {
            !meals
                .find_by(&|meal: &Meal| {
                    meal.food_item_servings
                        .iter()
                        .any(|serving| serving.item.id == item.id)
                })
                .is_empty()
        });

        let meals = Rc::clone(&store.meals);
        store.meal_types.set_usage_check(move |meal_type: &MealType| {
            !meals
                .find_by(&|meal: &Meal| {
                    meal.meal_type
                        .as_ref()
                        .map_or(false, |current| current.id == meal_type.id)
                })
                .is_empty()
        });

        store
    }
}

impl Default for NutritionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealtrack_editing::Serving;

    #[test]
    fn test_usage_follows_references() {
        let store = NutritionStore::new();
        let fruit = FoodGroup::new("Fruit", "");
        store.food_groups.save(&fruit).unwrap();
        assert!(!store.food_groups.is_used(&fruit));

        let apple = FoodItem::new("Apple", 95.0).with_serving(fruit.clone(), 1.0);
        store.food_items.save(&apple).unwrap();
        assert!(store.food_groups.is_used(&fruit));
        assert!(!store.food_items.is_used(&apple));

        let snack = MealType::new("Snack", "");
        let mut meal = Meal::new();
        meal.meal_type = Some(snack.clone());
        meal.food_item_servings.push(Serving::new(apple.clone(), 1.0));
        store.meals.save(&meal).unwrap();

        assert!(store.food_items.is_used(&apple));
        assert!(store.meal_types.is_used(&snack));
        assert!(store.food_items.remove(&apple).is_err());
    }
}
