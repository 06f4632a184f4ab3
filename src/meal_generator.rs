use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api_connection::{
    parse_json_reply, ApiConnectionError, GenerationPrompt, TextGenerator,
};
use crate::error::MealPlanError;
use crate::models::{
    day_name, validate_id, DietaryRestrictions, Meal, MealPlan, MealType, MealUpdate,
    NutritionalGoals,
};
use crate::store::MealStore;

const PLAN_TEMPERATURE: f32 = 0.7;
const PLAN_MAX_TOKENS: u32 = 6000;
const REGENERATE_TEMPERATURE: f32 = 0.8;
const REGENERATE_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeal {
    #[serde(flatten)]
    pub content: MealUpdate,
    pub meal_type: MealType,
    pub day_of_week: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub meals: Vec<GeneratedMeal>,
}

const MEAL_FIELDS: &str = "\"name\": string,
    \"description\": string,
    \"ingredients\": [string, ...] (each starting with quantity and unit, e.g. \"1 cup rolled oats\"),
    \"instructions\": string,
    \"calories\": number (kcal),
    \"protein\": number (grams),
    \"fiber\": number (grams)";

fn context_block(restrictions: &DietaryRestrictions, goals: &NutritionalGoals) -> String {
    format!(
        "Dietary constraints:
{}

Daily targets:
- Protein: at least {:.1} g
- Fiber: at least {:.1} g
- Calories: between {:.0} and {:.0} kcal",
        restrictions.describe(),
        goals.protein_target,
        goals.fiber_target,
        goals.calories_min,
        goals.calories_max,
    )
}

fn plan_prompt(restrictions: &DietaryRestrictions, goals: &NutritionalGoals) -> GenerationPrompt {
    let system = format!(
        "You are a meal planning assistant. You create varied, realistic 7-day meal plans.
Respond with a single JSON object and nothing else. Do not wrap it in markdown.
The JSON object must have this shape:
{{
  \"meals\": [
    {{
    \"day_of_week\": integer 1-7 (1 = Monday),
    \"meal_type\": one of \"breakfast\", \"lunch\", \"dinner\", \"snack\",
    {}
    }}
  ]
}}
Include breakfast, lunch and dinner for every day from 1 to 7. Snacks are optional.",
        MEAL_FIELDS
    );
    let user = format!(
        "{}

Create the 7-day meal plan. Each day's meals together should reach the daily targets.",
        context_block(restrictions, goals)
    );
    GenerationPrompt {
        system,
        user,
        temperature: PLAN_TEMPERATURE,
        max_tokens: PLAN_MAX_TOKENS,
    }
}

fn regenerate_prompt(
    meal: &Meal,
    restrictions: &DietaryRestrictions,
    goals: &NutritionalGoals,
) -> GenerationPrompt {
    let system = format!(
        "You are a meal planning assistant. You replace a single meal with a different one.
Respond with a single JSON object and nothing else. Do not wrap it in markdown.
The JSON object must have this shape:
{{
    {}
}}",
        MEAL_FIELDS
    );
    let user = format!(
        "{}

Replace this {} for {}: \"{}\" ({:.0} kcal, {:.1} g protein, {:.1} g fiber).
Suggest a different {} with similar or better protein and fiber.",
        context_block(restrictions, goals),
        meal.meal_type,
        day_name(meal.day_of_week),
        meal.name,
        meal.calories,
        meal.protein,
        meal.fiber,
        meal.meal_type,
    );
    GenerationPrompt {
        system,
        user,
        temperature: REGENERATE_TEMPERATURE,
        max_tokens: REGENERATE_MAX_TOKENS,
    }
}

/// Parses a `{meals: [...]}` reply and checks every meal before anything is
/// persisted.
pub fn parse_plan_reply(reply: &str) -> Result<Vec<GeneratedMeal>, ApiConnectionError> {
    let plan: GeneratedPlan = parse_json_reply(reply)?;
    if plan.meals.is_empty() {
        return Err(ApiConnectionError::InvalidContent(
            "generated plan contains no meals".to_string(),
        ));
    }
    for meal in &plan.meals {
        if !(1..=7).contains(&meal.day_of_week) {
            return Err(ApiConnectionError::InvalidContent(format!(
                "meal '{}' has day_of_week {} outside 1-7",
                meal.content.name, meal.day_of_week
            )));
        }
        meal.content
            .validate()
            .map_err(ApiConnectionError::InvalidContent)?;
    }
    Ok(plan.meals)
}

pub fn parse_meal_reply(reply: &str) -> Result<MealUpdate, ApiConnectionError> {
    let meal: MealUpdate = parse_json_reply(reply)?;
    meal.validate().map_err(ApiConnectionError::InvalidContent)?;
    Ok(meal)
}

async fn load_preferences<S>(
    store: &S,
    user_id: &str,
) -> Result<(DietaryRestrictions, NutritionalGoals), MealPlanError>
where
    S: MealStore + ?Sized,
{
    let restrictions = store
        .dietary_restrictions(user_id)
        .await?
        .ok_or_else(|| MealPlanError::not_found("dietary restrictions", user_id))?;
    let goals = store
        .nutritional_goals(user_id)
        .await?
        .ok_or_else(|| MealPlanError::not_found("nutritional goals", user_id))?;
    Ok((restrictions, goals))
}

/// Generates a fresh 7-day plan for the user and stores it as their active plan.
pub async fn generate_meal_plan<S, G>(
    store: &S,
    generator: &G,
    user_id: &str,
    plan_name: &str,
    start_date: NaiveDate,
) -> Result<(MealPlan, Vec<Meal>), MealPlanError>
where
    S: MealStore + ?Sized,
    G: TextGenerator + ?Sized,
{
    validate_id("user_id", user_id)?;
    let plan_name = plan_name.trim();
    if plan_name.is_empty() {
        return Err(MealPlanError::Validation {
            field: "plan_name",
            reason: "must not be blank".to_string(),
        });
    }

    let (restrictions, goals) = load_preferences(store, user_id).await?;

    info!(user_id, %start_date, "generating meal plan");
    let reply = generator.generate(&plan_prompt(&restrictions, &goals)).await?;
    let generated = parse_plan_reply(&reply)?;

    let plan = MealPlan::starting_on(user_id, plan_name, start_date);
    let meals: Vec<Meal> = generated
        .into_iter()
        .map(|g| Meal {
            id: uuid::Uuid::new_v4().to_string(),
            meal_plan_id: plan.id.clone(),
            name: g.content.name,
            description: g.content.description,
            calories: g.content.calories,
            protein: g.content.protein,
            fiber: g.content.fiber,
            meal_type: g.meal_type,
            day_of_week: g.day_of_week,
            ingredients: g.content.ingredients,
            instructions: g.content.instructions,
        })
        .collect();

    store.insert_meal_plan(&plan, &meals).await?;
    info!(plan_id = %plan.id, meals = meals.len(), "stored generated meal plan");
    Ok((plan, meals))
}

/// Replaces one meal with a newly generated one of the same day and type.
pub async fn regenerate_meal<S, G>(
    store: &S,
    generator: &G,
    user_id: &str,
    meal_id: &str,
) -> Result<Meal, MealPlanError>
where
    S: MealStore + ?Sized,
    G: TextGenerator + ?Sized,
{
    validate_id("user_id", user_id)?;
    validate_id("meal_id", meal_id)?;

    let mut meal = store
        .meal(meal_id)
        .await?
        .ok_or_else(|| MealPlanError::not_found("meal", meal_id))?;
    let owned = store
        .meal_plan(&meal.meal_plan_id)
        .await?
        .is_some_and(|plan| plan.user_id == user_id);
    if !owned {
        return Err(MealPlanError::not_found("meal", meal_id));
    }
    let (restrictions, goals) = load_preferences(store, user_id).await?;

    let reply = generator
        .generate(&regenerate_prompt(&meal, &restrictions, &goals))
        .await?;
    let update = parse_meal_reply(&reply)?;

    store.update_meal(meal_id, &update).await?;
    meal.apply(&update);
    info!(meal_id, name = %meal.name, "regenerated meal");
    Ok(meal)
}
