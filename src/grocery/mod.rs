//! Shopping-list derivation from a plan's meals.
//!
//! Each ingredient line is lower-cased, stripped down to a canonical base name
//! (see [`parse`]), then folded with every other line sharing that name. The
//! resulting list is recomputed on every request and never stored.

pub mod aggregator;
pub mod category;
pub mod parse;

pub use aggregator::{
    build_grocery_list, group_by_category, ingredient_lines, sort_by_display, GroceryItem,
    IngredientLine,
};
pub use category::{categorize, GroceryCategory};
pub use parse::{parse_ingredient, ParsedIngredient};

use tracing::{debug, warn};

use crate::error::MealPlanError;
use crate::models::validate_id;
use crate::store::MealStore;

/// Reads the plan's meals and aggregates their ingredients.
pub async fn grocery_list_for_plan<S>(
    store: &S,
    plan_id: &str,
) -> Result<Vec<GroceryItem>, MealPlanError>
where
    S: MealStore + ?Sized,
{
    validate_id("plan_id", plan_id)?;
    if store.meal_plan(plan_id).await?.is_none() {
        return Err(MealPlanError::not_found("meal plan", plan_id));
    }

    let meals = store.meals_for_plan(plan_id).await?;
    let lines = ingredient_lines(&meals);
    let items = build_grocery_list(&lines);
    debug!(
        plan_id,
        meals = meals.len(),
        lines = lines.len(),
        items = items.len(),
        "built grocery list"
    );
    Ok(items)
}

/// Like [`grocery_list_for_plan`], but any failure is logged and shown as an
/// empty list.
pub async fn grocery_list_or_empty<S>(store: &S, plan_id: &str) -> Vec<GroceryItem>
where
    S: MealStore + ?Sized,
{
    grocery_list_for_plan(store, plan_id)
        .await
        .unwrap_or_else(|e| {
            warn!(plan_id, error = %e, "could not build grocery list");
            Vec::new()
        })
}
