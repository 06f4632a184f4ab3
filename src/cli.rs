use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Meal plan generation, optimization and grocery lists", long_about = None)]
pub struct Cli {
    /// JSON snapshot holding meal_plans, meals, dietary_restrictions and nutritional_goals
    #[arg(short, long, global = true, default_value = "meal_store.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the aggregated grocery list of a plan
    Grocery(GroceryArgs),
    /// Rewrite meals until every day meets the protein and fiber goals
    Optimize(OptimizeArgs),
    /// Generate a new 7-day plan and make it the active one
    Generate(GenerateArgs),
    /// Replace a single meal with a newly generated one
    Regenerate(RegenerateArgs),
}

#[derive(Args, Debug)]
pub struct GroceryArgs {
    #[arg(long)]
    pub plan_id: String,
    /// Emit JSON instead of a categorized text list
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[arg(long)]
    pub plan_id: String,
    #[arg(long)]
    pub user_id: String,
    /// Overrides MEAL_OPTIM_MAX_ITERATIONS
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub user_id: String,
    #[arg(long)]
    pub name: String,
    /// First day of the plan (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct RegenerateArgs {
    #[arg(long)]
    pub user_id: String,
    #[arg(long)]
    pub meal_id: String,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
