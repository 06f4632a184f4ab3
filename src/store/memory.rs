use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use super::{MealStore, StoreError};
use crate::models::{DietaryRestrictions, Meal, MealPlan, MealUpdate, NutritionalGoals};

/// Serialized form of the four collections, as read from and written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub meal_plans: Vec<MealPlan>,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestrictions>,
    #[serde(default)]
    pub nutritional_goals: Vec<NutritionalGoals>,
}

/// Process-local store backed by a [`Snapshot`] behind an async lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Snapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            plans = snapshot.meal_plans.len(),
            meals = snapshot.meals.len(),
            "loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot().await;
        let raw = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, raw).await?;
        debug!(path = %path.display(), "saved store snapshot");
        Ok(())
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.tables.read().await.clone()
    }
}

#[async_trait]
impl MealStore for InMemoryStore {
    async fn meal_plan(&self, plan_id: &str) -> Result<Option<MealPlan>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.meal_plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn meals_for_plan(&self, plan_id: &str) -> Result<Vec<Meal>, StoreError> {
        let tables = self.tables.read().await;
        let mut meals: Vec<Meal> = tables
            .meals
            .iter()
            .filter(|m| m.meal_plan_id == plan_id)
            .cloned()
            .collect();
        meals.sort_by_key(|m| (m.day_of_week, m.meal_type));
        Ok(meals)
    }

    async fn meal(&self, meal_id: &str) -> Result<Option<Meal>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.meals.iter().find(|m| m.id == meal_id).cloned())
    }

    async fn update_meal(&self, meal_id: &str, update: &MealUpdate) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let meal = tables
            .meals
            .iter_mut()
            .find(|m| m.id == meal_id)
            .ok_or_else(|| StoreError::MissingRow {
                collection: "meals",
                id: meal_id.to_string(),
            })?;
        meal.apply(update);
        Ok(())
    }

    async fn nutritional_goals(
        &self,
        user_id: &str,
    ) -> Result<Option<NutritionalGoals>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .nutritional_goals
            .iter()
            .find(|g| g.user_id == user_id)
            .cloned())
    }

    async fn dietary_restrictions(
        &self,
        user_id: &str,
    ) -> Result<Option<DietaryRestrictions>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .dietary_restrictions
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn insert_meal_plan(&self, plan: &MealPlan, meals: &[Meal]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if plan.is_active {
            for existing in tables
                .meal_plans
                .iter_mut()
                .filter(|p| p.user_id == plan.user_id)
            {
                existing.is_active = false;
            }
        }
        tables.meal_plans.push(plan.clone());
        tables.meals.extend_from_slice(meals);
        Ok(())
    }
}
