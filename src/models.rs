use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MealPlanError;

const MAX_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(format!("unknown meal type '{}'", other)),
        }
    }
}

pub fn day_name(day_of_week: u8) -> &'static str {
    match day_of_week {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown day",
    }
}

/// A row of the `meals` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub meal_plan_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub calories: f64,
    pub protein: f64,
    pub fiber: f64,
    pub meal_type: MealType,
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,
    #[serde(default, deserialize_with = "string_entries_only")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

impl Meal {
    pub fn apply(&mut self, update: &MealUpdate) {
        self.name = update.name.clone();
        self.description = update.description.clone();
        self.ingredients = update.ingredients.clone();
        self.instructions = update.instructions.clone();
        self.calories = update.calories;
        self.protein = update.protein;
        self.fiber = update.fiber;
    }
}

// Stored ingredient arrays are free-form JSON; anything that is not a string is dropped.
fn string_entries_only<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// The mutable fields of a meal, as written back by regeneration and optimization.
///
/// This is also the shape the text-generation backend must return for a meal, so
/// it deserializes strictly: every macro must be a number and every ingredient a
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    pub calories: f64,
    pub protein: f64,
    pub fiber: f64,
}

impl MealUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("meal name is blank".to_string());
        }
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fiber", self.fiber),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "meal '{}' has invalid {}: {}",
                    self.name, field, value
                ));
            }
        }
        Ok(())
    }
}

impl From<&Meal> for MealUpdate {
    fn from(meal: &Meal) -> Self {
        Self {
            name: meal.name.clone(),
            description: meal.description.clone(),
            ingredients: meal.ingredients.clone(),
            instructions: meal.instructions.clone(),
            calories: meal.calories,
            protein: meal.protein,
            fiber: meal.fiber,
        }
    }
}

/// A row of the `meal_plans` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MealPlan {
    /// A new active plan covering the seven days starting at `start_date`.
    pub fn starting_on(user_id: &str, name: &str, start_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            start_date,
            end_date: start_date + chrono::Duration::days(6),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A row of the `nutritional_goals` collection. Targets are per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionalGoals {
    pub user_id: String,
    pub protein_target: f64,
    pub fiber_target: f64,
    pub calories_min: f64,
    pub calories_max: f64,
}

/// A row of the `dietary_restrictions` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DietaryRestrictions {
    pub user_id: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_theme: Option<String>,
}

impl DietaryRestrictions {
    pub fn describe(&self) -> String {
        let allergies = if self.allergies.is_empty() {
            "none".to_string()
        } else {
            self.allergies.join(", ")
        };
        let theme = self
            .dietary_theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("none");
        format!(
            "- Allergies (never use these ingredients): {}\n- Dietary theme: {}",
            allergies, theme
        )
    }
}

/// Rejects identifiers that are blank, oversized, or contain anything other than
/// ASCII alphanumerics, `-` and `_`.
pub fn validate_id(field: &'static str, id: &str) -> Result<(), MealPlanError> {
    let reason = if id.is_empty() {
        Some("must not be empty".to_string())
    } else if id.len() > MAX_ID_LEN {
        Some(format!("longer than {} characters", MAX_ID_LEN))
    } else if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(format!("unexpected character {:?}", c))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MealPlanError::Validation { field, reason }),
        None => Ok(()),
    }
}
