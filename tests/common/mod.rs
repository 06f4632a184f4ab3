#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use meal_optim::api_connection::{ApiConnectionError, GenerationPrompt, TextGenerator};
use meal_optim::models::{
    DietaryRestrictions, Meal, MealPlan, MealType, MealUpdate, NutritionalGoals,
};
use meal_optim::store::{InMemoryStore, MealStore, Snapshot, StoreError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const PLAN_ID: &str = "plan-1";
pub const USER_ID: &str = "user-1";

/// Replays canned replies in order and records every prompt it was given.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, ApiConnectionError>>>,
    prompts: Mutex<Vec<GenerationPrompt>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String, ApiConnectionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(replies: &[String]) -> Self {
        Self::new(replies.iter().cloned().map(Ok).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ApiConnectionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ApiConnectionError::EmptyResponse))
    }
}

/// Delegates to an [`InMemoryStore`] but fails the n-th meal update (1-based).
pub struct FailingUpdateStore {
    pub inner: InMemoryStore,
    fail_on: usize,
    updates: AtomicUsize,
}

impl FailingUpdateStore {
    pub fn new(inner: InMemoryStore, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            updates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MealStore for FailingUpdateStore {
    async fn meal_plan(&self, plan_id: &str) -> Result<Option<MealPlan>, StoreError> {
        self.inner.meal_plan(plan_id).await
    }

    async fn meals_for_plan(&self, plan_id: &str) -> Result<Vec<Meal>, StoreError> {
        self.inner.meals_for_plan(plan_id).await
    }

    async fn meal(&self, meal_id: &str) -> Result<Option<Meal>, StoreError> {
        self.inner.meal(meal_id).await
    }

    async fn update_meal(&self, meal_id: &str, update: &MealUpdate) -> Result<(), StoreError> {
        let n = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.update_meal(meal_id, update).await
    }

    async fn nutritional_goals(
        &self,
        user_id: &str,
    ) -> Result<Option<NutritionalGoals>, StoreError> {
        self.inner.nutritional_goals(user_id).await
    }

    async fn dietary_restrictions(
        &self,
        user_id: &str,
    ) -> Result<Option<DietaryRestrictions>, StoreError> {
        self.inner.dietary_restrictions(user_id).await
    }

    async fn insert_meal_plan(&self, plan: &MealPlan, meals: &[Meal]) -> Result<(), StoreError> {
        self.inner.insert_meal_plan(plan, meals).await
    }
}

pub fn meal(id: &str, day: u8, meal_type: MealType, protein: f64, fiber: f64) -> Meal {
    Meal {
        id: id.to_string(),
        meal_plan_id: PLAN_ID.to_string(),
        name: format!("Meal {}", id),
        description: String::new(),
        calories: 600.0,
        protein,
        fiber,
        meal_type,
        day_of_week: day,
        ingredients: vec!["1 cup rice".to_string()],
        instructions: String::new(),
    }
}

pub fn plan() -> MealPlan {
    let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    MealPlan {
        id: PLAN_ID.to_string(),
        user_id: USER_ID.to_string(),
        name: "Week 43".to_string(),
        start_date: start,
        end_date: start + chrono::Duration::days(6),
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
    }
}

pub fn goals() -> NutritionalGoals {
    NutritionalGoals {
        user_id: USER_ID.to_string(),
        protein_target: 100.0,
        fiber_target: 30.0,
        calories_min: 1800.0,
        calories_max: 2400.0,
    }
}

pub fn restrictions() -> DietaryRestrictions {
    DietaryRestrictions {
        user_id: USER_ID.to_string(),
        allergies: vec!["shellfish".to_string()],
        dietary_theme: Some("mediterranean".to_string()),
    }
}

pub fn snapshot_with_meals(meals: Vec<Meal>) -> Snapshot {
    Snapshot {
        meal_plans: vec![plan()],
        meals,
        dietary_restrictions: vec![restrictions()],
        nutritional_goals: vec![goals()],
    }
}

pub fn store_with_meals(meals: Vec<Meal>) -> InMemoryStore {
    InMemoryStore::from_snapshot(snapshot_with_meals(meals))
}

/// A `{optimizations: [...]}` reply replacing each id with a meal of the given macros.
pub fn optimization_reply(replacements: &[(&str, f64, f64)]) -> String {
    let items: Vec<serde_json::Value> = replacements
        .iter()
        .map(|(id, protein, fiber)| {
            serde_json::json!({
                "mealToReplace": id,
                "newMeal": {
                    "name": format!("Improved {}", id),
                    "description": "Higher protein and fiber",
                    "ingredients": ["1 cup lentils", "200 g chicken breast"],
                    "instructions": "Cook everything.",
                    "calories": 650,
                    "protein": protein,
                    "fiber": fiber
                }
            })
        })
        .collect();
    serde_json::json!({ "optimizations": items }).to_string()
}
