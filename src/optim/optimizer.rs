use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::api_connection::{parse_json_reply, ApiConnectionError, GenerationPrompt, TextGenerator};
use crate::error::MealPlanError;
use crate::models::{
    day_name, validate_id, DietaryRestrictions, Meal, MealUpdate, NutritionalGoals,
};
use crate::optim::nutri_eval::{daily_totals, days_needing_optimization, DailyTotals, DayDeficit};
use crate::store::MealStore;

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

const OPTIMIZATION_TEMPERATURE: f32 = 0.7;
const OPTIMIZATION_MAX_TOKENS: u32 = 2500;

// --- Structs for LLM Interaction ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealReplacement {
    pub meal_to_replace: String,
    pub new_meal: MealUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    pub optimizations: Vec<MealReplacement>,
}

// --- Outcome ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub max_iterations: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// A proposed replacement that named a meal not in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedReplacement {
    pub meal_id: String,
    pub iteration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementOutcome {
    /// Every day meets both the protein and fiber targets.
    pub success: bool,
    /// Completed propose-and-apply passes.
    pub iterations: u32,
    /// Totals from the final evaluation.
    pub daily_totals: Vec<DailyTotals>,
    pub skipped: Vec<SkippedReplacement>,
}

impl RefinementOutcome {
    pub fn summary(&self) -> String {
        if self.success {
            format!(
                "All daily protein and fiber goals met after {} optimization pass(es).",
                self.iterations
            )
        } else {
            format!(
                "Could not fully meet goals after {} optimization pass(es).",
                self.iterations
            )
        }
    }
}

// --- Prompt construction ---

fn build_optimization_prompt(
    flagged: &[DayDeficit],
    meals: &[Meal],
    goals: &NutritionalGoals,
    restrictions: &DietaryRestrictions,
) -> GenerationPrompt {
    let system = "You are a nutrition-focused meal planner. You improve existing meal plans so that \
every day reaches its protein and fiber targets while staying within the calorie range and \
respecting the user's dietary constraints.
Respond with a single JSON object and nothing else. Do not wrap it in markdown.
The JSON object must have this shape:
{
  \"optimizations\": [
    {
      \"mealToReplace\": \"<id of an existing meal>\",
      \"newMeal\": {
        \"name\": \"string\",
        \"description\": \"string\",
        \"ingredients\": [\"quantity unit ingredient\", \"...\"],
        \"instructions\": \"string\",
        \"calories\": number,
        \"protein\": number,
        \"fiber\": number
      }
    }
  ]
}
Only replace meals listed below, and use their ids exactly as given. Keep the meal type of the \
replaced meal. Macro values are for one serving: calories in kcal, protein and fiber in grams."
        .to_string();

    let mut report = String::new();
    for day in flagged {
        let totals = &day.totals;
        report.push_str(&format!(
            "\n{} (day {}): protein {:.1} g (short by {:.1} g), fiber {:.1} g (short by {:.1} g), calories {:.0} kcal\n",
            day_name(totals.day_of_week),
            totals.day_of_week,
            totals.protein,
            day.protein_deficit,
            totals.fiber,
            day.fiber_deficit,
            totals.calories,
        ));
        for meal in meals.iter().filter(|m| m.day_of_week == totals.day_of_week) {
            report.push_str(&format!(
                "- id: {} | {} | {} | {:.0} kcal, {:.1} g protein, {:.1} g fiber\n",
                meal.id, meal.meal_type, meal.name, meal.calories, meal.protein, meal.fiber
            ));
        }
    }

    let user = format!(
        "Daily targets:
- Protein: at least {:.1} g
- Fiber: at least {:.1} g
- Calories: between {:.0} and {:.0} kcal

Dietary constraints:
{}

These days miss their targets:
{}
Propose replacements for as few meals as needed so that each listed day reaches both targets. \
Return the JSON object described above.",
        goals.protein_target,
        goals.fiber_target,
        goals.calories_min,
        goals.calories_max,
        restrictions.describe(),
        report,
    );

    GenerationPrompt {
        system,
        user,
        temperature: OPTIMIZATION_TEMPERATURE,
        max_tokens: OPTIMIZATION_MAX_TOKENS,
    }
}

/// Parses and validates a reply. Nothing is written unless every replacement is
/// well formed.
pub fn parse_optimization_reply(reply: &str) -> Result<Vec<MealReplacement>, ApiConnectionError> {
    let response: OptimizationResponse = parse_json_reply(reply)?;
    for replacement in &response.optimizations {
        if replacement.meal_to_replace.trim().is_empty() {
            return Err(ApiConnectionError::InvalidContent(
                "replacement without mealToReplace".to_string(),
            ));
        }
        replacement.new_meal.validate().map_err(|reason| {
            ApiConnectionError::InvalidContent(format!(
                "replacement for {}: {}",
                replacement.meal_to_replace, reason
            ))
        })?;
    }
    Ok(response.optimizations)
}

async fn apply_replacements<S>(
    store: &S,
    meals: &[Meal],
    replacements: &[MealReplacement],
    iteration: u32,
    skipped: &mut Vec<SkippedReplacement>,
) -> Result<(), MealPlanError>
where
    S: MealStore + ?Sized,
{
    let known: HashSet<&str> = meals.iter().map(|m| m.id.as_str()).collect();
    for replacement in replacements {
        if !known.contains(replacement.meal_to_replace.as_str()) {
            warn!(
                meal_id = %replacement.meal_to_replace,
                iteration,
                "skipping replacement for a meal that is not in the plan"
            );
            skipped.push(SkippedReplacement {
                meal_id: replacement.meal_to_replace.clone(),
                iteration,
            });
            continue;
        }
        store
            .update_meal(&replacement.meal_to_replace, &replacement.new_meal)
            .await?;
        info!(
            meal_id = %replacement.meal_to_replace,
            name = %replacement.new_meal.name,
            iteration,
            "replaced meal"
        );
    }
    Ok(())
}

// --- Main Optimization Function ---

/// Rewrites meals of `plan_id` until every day meets the user's protein and
/// fiber targets or `config.max_iterations` propose-and-apply passes have run.
///
/// Running out of iterations is a normal outcome (`success == false`). Errors are
/// reserved for bad input, missing rows, store failures and unusable
/// text-generation replies. Meal writes are independent: replacements applied
/// before a failure stay applied.
pub async fn optimize_meal_plan<S, G>(
    store: &S,
    generator: &G,
    plan_id: &str,
    user_id: &str,
    config: &OptimizerConfig,
) -> Result<RefinementOutcome, MealPlanError>
where
    S: MealStore + ?Sized,
    G: TextGenerator + ?Sized,
{
    validate_id("plan_id", plan_id)?;
    validate_id("user_id", user_id)?;

    let goals = store
        .nutritional_goals(user_id)
        .await?
        .ok_or_else(|| MealPlanError::not_found("nutritional goals", user_id))?;
    let restrictions = store
        .dietary_restrictions(user_id)
        .await?
        .ok_or_else(|| MealPlanError::not_found("dietary restrictions", user_id))?;
    // another user's plan is reported as missing
    match store.meal_plan(plan_id).await? {
        Some(plan) if plan.user_id == user_id => {}
        _ => return Err(MealPlanError::not_found("meal plan", plan_id)),
    }

    info!(
        plan_id,
        max_iterations = config.max_iterations,
        protein_target = goals.protein_target,
        fiber_target = goals.fiber_target,
        "starting meal plan optimization"
    );

    let mut iterations = 0;
    let mut skipped = Vec::new();

    loop {
        let meals = store.meals_for_plan(plan_id).await?;
        let totals = daily_totals(&meals);
        let flagged = days_needing_optimization(&totals, &goals);

        if flagged.is_empty() {
            info!(plan_id, iterations, "all days meet their targets");
            return Ok(RefinementOutcome {
                success: true,
                iterations,
                daily_totals: totals,
                skipped,
            });
        }

        if iterations >= config.max_iterations {
            warn!(
                plan_id,
                iterations,
                days_short = flagged.len(),
                "iteration budget exhausted with days still short"
            );
            return Ok(RefinementOutcome {
                success: false,
                iterations,
                daily_totals: totals,
                skipped,
            });
        }

        let iteration = iterations + 1;
        info!(
            plan_id,
            iteration,
            days_short = flagged.len(),
            "requesting meal replacements"
        );
        let prompt = build_optimization_prompt(&flagged, &meals, &goals, &restrictions);
        debug!(iteration, user_prompt = %prompt.user, "optimization prompt");

        let reply = generator.generate(&prompt).await?;
        let replacements = parse_optimization_reply(&reply).map_err(|e| {
            warn!(iteration, error = %e, "unusable optimization reply");
            e
        })?;
        debug!(iteration, proposed = replacements.len(), "parsed replacements");

        apply_replacements(store, &meals, &replacements, iteration, &mut skipped).await?;
        iterations = iteration;
    }
}
