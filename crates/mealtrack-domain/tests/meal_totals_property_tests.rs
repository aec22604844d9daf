//! Property tests for meal calorie and food group totals under editing

use mealtrack_domain::{FoodGroup, FoodItem, MealEditor, NutritionStore};
use mealtrack_undo_redo::SharedHistory;
use proptest::prelude::*;

struct Pantry {
    store: NutritionStore,
    items: Vec<FoodItem>,
}

fn pantry() -> Pantry {
    let grains = FoodGroup::new("Grains", "");
    let dairy = FoodGroup::new("Dairy", "");
    let items = vec![
        FoodItem::new("Toast", 80.0).with_serving(grains.clone(), 1.0),
        FoodItem::new("Milk", 120.0).with_serving(dairy.clone(), 1.0),
        FoodItem::new("Sandwich", 250.0)
            .with_serving(grains, 2.0)
            .with_serving(dairy, 0.5),
    ];
    Pantry {
        store: NutritionStore::new(),
        items,
    }
}

/// Group total computed straight from the editor's current servings
fn expected_group_total(editor: &MealEditor, group: &str) -> f64 {
    editor
        .food_item_servings()
        .iter()
        .map(|serving| {
            serving
                .item
                .food_group_servings
                .iter()
                .filter(|g| g.item.name == group)
                .map(|g| g.quantity * serving.quantity)
                .sum::<f64>()
        })
        .sum()
}

fn reported_group_total(editor: &MealEditor, group: &str) -> f64 {
    editor
        .food_group_totals()
        .iter()
        .find(|total| total.group.name == group)
        .map_or(0.0, |total| total.quantity)
}

fn assert_totals_consistent(editor: &MealEditor) -> Result<(), TestCaseError> {
    let expected_calories: f64 = editor
        .food_item_servings()
        .iter()
        .map(|serving| serving.item.calories_per_serving * serving.quantity)
        .sum();
    prop_assert_eq!(editor.calories(), expected_calories);
    for group in ["Grains", "Dairy"] {
        prop_assert_eq!(
            reported_group_total(editor, group),
            expected_group_total(editor, group)
        );
    }
    Ok(())
}

proptest! {
    /// Totals track every add and remove, and survive a full undo/redo walk
    #[test]
    fn prop_totals_follow_serving_edits(
        ops in prop::collection::vec((any::<bool>(), 0usize..6, 1u8..8), 1..20),
    ) {
        let pantry = pantry();
        let editor = MealEditor::create(&pantry.store, SharedHistory::new());

        for (add, index, halves) in &ops {
            let servings = editor.food_item_servings();
            if *add || servings.is_empty() {
                let item = pantry.items[index % pantry.items.len()].clone();
                editor.add_food_item(item, f64::from(*halves) / 2.0);
            } else {
                let target = servings[index % servings.len()].id;
                prop_assert!(editor.remove_food_item(target).is_some());
            }
            assert_totals_consistent(&editor)?;
        }

        let calories = editor.calories();
        let totals = editor.food_group_totals();

        let mut undone = 0;
        while editor.can_undo() {
            editor.undo().unwrap();
            assert_totals_consistent(&editor)?;
            undone += 1;
        }
        prop_assert_eq!(undone, ops.len());
        prop_assert_eq!(editor.calories(), 0.0);
        prop_assert!(editor.food_group_totals().is_empty());
        prop_assert!(!editor.is_dirty());

        while editor.can_redo() {
            editor.redo().unwrap();
        }
        prop_assert_eq!(editor.calories(), calories);
        prop_assert_eq!(editor.food_group_totals(), totals);
    }
}
