//! Access to the persisted collections: `meal_plans`, `meals`,
//! `dietary_restrictions` and `nutritional_goals`.
//!
//! Every write touches a single row. Callers must not assume that several writes
//! issued in sequence commit together.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DietaryRestrictions, Meal, MealPlan, MealUpdate, NutritionalGoals};

pub use memory::{InMemoryStore, Snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no row in {collection} with id {id}")]
    MissingRow {
        collection: &'static str,
        id: String,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn meal_plan(&self, plan_id: &str) -> Result<Option<MealPlan>, StoreError>;

    /// Meals of a plan ordered by day, then meal type.
    async fn meals_for_plan(&self, plan_id: &str) -> Result<Vec<Meal>, StoreError>;

    async fn meal(&self, meal_id: &str) -> Result<Option<Meal>, StoreError>;

    async fn update_meal(&self, meal_id: &str, update: &MealUpdate) -> Result<(), StoreError>;

    async fn nutritional_goals(&self, user_id: &str)
        -> Result<Option<NutritionalGoals>, StoreError>;

    async fn dietary_restrictions(
        &self,
        user_id: &str,
    ) -> Result<Option<DietaryRestrictions>, StoreError>;

    /// Persists a new plan with its meals. An active plan deactivates the user's
    /// other plans.
    async fn insert_meal_plan(&self, plan: &MealPlan, meals: &[Meal]) -> Result<(), StoreError>;
}
