pub mod nutri_eval;
pub mod optimizer;

pub use nutri_eval::{daily_totals, days_needing_optimization, DailyTotals, DayDeficit};
pub use optimizer::{
    optimize_meal_plan, OptimizerConfig, RefinementOutcome, SkippedReplacement,
    DEFAULT_MAX_ITERATIONS,
};
