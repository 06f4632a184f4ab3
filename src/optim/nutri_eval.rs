use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Meal, NutritionalGoals};

/// Macro totals of one day of a plan, summed from its current meals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub day_of_week: u8,
    pub calories: f64,
    pub protein: f64,
    pub fiber: f64,
    pub meal_count: usize,
}

/// A day that misses at least one of the protein or fiber targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDeficit {
    pub totals: DailyTotals,
    pub protein_deficit: f64,
    pub fiber_deficit: f64,
}

/// Goal minus current value, floored at zero.
pub fn deficit(goal: f64, current: f64) -> f64 {
    (goal - current).max(0.0)
}

/// Sums calories, protein and fiber per day, ascending by day. Days without
/// meals do not appear.
pub fn daily_totals(meals: &[Meal]) -> Vec<DailyTotals> {
    let mut by_day: BTreeMap<u8, DailyTotals> = BTreeMap::new();
    for meal in meals {
        let totals = by_day.entry(meal.day_of_week).or_insert_with(|| DailyTotals {
            day_of_week: meal.day_of_week,
            calories: 0.0,
            protein: 0.0,
            fiber: 0.0,
            meal_count: 0,
        });
        totals.calories += meal.calories;
        totals.protein += meal.protein;
        totals.fiber += meal.fiber;
        totals.meal_count += 1;
    }
    by_day.into_values().collect()
}

pub fn needs_optimization(totals: &DailyTotals, goals: &NutritionalGoals) -> bool {
    totals.protein < goals.protein_target || totals.fiber < goals.fiber_target
}

pub fn days_needing_optimization(
    totals: &[DailyTotals],
    goals: &NutritionalGoals,
) -> Vec<DayDeficit> {
    totals
        .iter()
        .filter(|day| needs_optimization(day, goals))
        .map(|day| DayDeficit {
            totals: day.clone(),
            protein_deficit: deficit(goals.protein_target, day.protein),
            fiber_deficit: deficit(goals.fiber_target, day.fiber),
        })
        .collect()
}
