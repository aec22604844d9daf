//! Editors for every nutrition entity
//!
//! Each editor wraps an [`EditSession`](mealtrack_editing::EditSession) with
//! typed setters and the entity's business rules. Session operations (undo,
//! redo, save, close, commands) are reached through `Deref`.

mod catalog;
mod food_item;
mod meal;

pub use catalog::{CatalogEditor, CatalogEntry, CatalogRules, FoodGroupEditor, MealTypeEditor};
pub use food_item::{FoodItemEditor, FoodItemRules};
pub use meal::{MealEditor, MealRules};

use mealtrack_editing::{name_is_unique, required, Entity, Named, Repository};

pub(crate) const NAME_REQUIRED: &str = "A name is required.";

/// Required, and not used by any other stored entity of the same kind
pub(crate) fn unique_name_rule<E>(
    repository: &dyn Repository<E>,
    entity: &E,
    kind: &str,
) -> Option<String>
where
    E: Entity + Named,
{
    required(entity.name(), NAME_REQUIRED).or_else(|| {
        if name_is_unique(repository, entity) {
            None
        } else {
            Some(format!(
                "Another {} is already named {}.",
                kind,
                entity.name().trim()
            ))
        }
    })
}
