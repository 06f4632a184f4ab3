use anyhow::{Context, Result};
use meal_optim::api_connection::Provider;
use meal_optim::cli::{parse_args, Command, GenerateArgs, GroceryArgs, OptimizeArgs, RegenerateArgs};
use meal_optim::config::AppConfig;
use meal_optim::grocery::{group_by_category, grocery_list_or_empty};
use meal_optim::meal_generator::{generate_meal_plan, regenerate_meal};
use meal_optim::models::day_name;
use meal_optim::optim::{optimize_meal_plan, OptimizerConfig};
use meal_optim::store::InMemoryStore;
use meal_optim::telemetry;
use std::path::Path;
use tracing::error;

fn build_provider(config: &AppConfig) -> Result<Provider> {
    Provider::new(
        config.provider,
        &config.api_key_env_var,
        &config.model,
        config.request_timeout,
    )
    .context("Failed to build the text-generation client")
}

async fn print_grocery_list(store: &InMemoryStore, args: &GroceryArgs) -> Result<()> {
    let items = grocery_list_or_empty(store, &args.plan_id).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("No ingredients found for this plan.");
        return Ok(());
    }
    for (category, group) in group_by_category(&items) {
        println!("\n{}:", category);
        for item in group {
            println!("  - {} (used in {} meal(s))", item.display, item.meals.len());
        }
    }
    Ok(())
}

async fn run_optimize(
    store: &InMemoryStore,
    config: &AppConfig,
    args: &OptimizeArgs,
    store_path: &Path,
) -> Result<()> {
    let provider = build_provider(config)?;
    let optimizer_config = OptimizerConfig {
        max_iterations: args.max_iterations.unwrap_or(config.max_iterations),
    };

    let result = optimize_meal_plan(
        store,
        &provider,
        &args.plan_id,
        &args.user_id,
        &optimizer_config,
    )
    .await;

    // replacements applied before a failure are kept, so persist either way
    store
        .save(store_path)
        .await
        .with_context(|| format!("Failed to save store to '{}'", store_path.display()))?;

    match result {
        Ok(outcome) => {
            println!("{}", outcome.summary());
            for day in &outcome.daily_totals {
                println!(
                    "  {:<9} {:>6.0} kcal  {:>6.1} g protein  {:>5.1} g fiber",
                    day_name(day.day_of_week),
                    day.calories,
                    day.protein,
                    day.fiber
                );
            }
            for skipped in &outcome.skipped {
                println!(
                    "  skipped unknown meal id {} (pass {})",
                    skipped.meal_id, skipped.iteration
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "optimization failed");
            Err(anyhow::Error::new(e).context("Could not optimize the meal plan"))
        }
    }
}

async fn run_generate(
    store: &InMemoryStore,
    config: &AppConfig,
    args: &GenerateArgs,
    store_path: &Path,
) -> Result<()> {
    let provider = build_provider(config)?;
    let start_date = args
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let (plan, meals) = generate_meal_plan(store, &provider, &args.user_id, &args.name, start_date)
        .await
        .context("Meal plan generation failed")?;
    store
        .save(store_path)
        .await
        .with_context(|| format!("Failed to save store to '{}'", store_path.display()))?;

    println!(
        "Created plan '{}' ({}) for {} to {} with {} meals.",
        plan.name,
        plan.id,
        plan.start_date,
        plan.end_date,
        meals.len()
    );
    Ok(())
}

async fn run_regenerate(
    store: &InMemoryStore,
    config: &AppConfig,
    args: &RegenerateArgs,
    store_path: &Path,
) -> Result<()> {
    let provider = build_provider(config)?;
    let meal = regenerate_meal(store, &provider, &args.user_id, &args.meal_id)
        .await
        .context("Meal regeneration failed")?;
    store
        .save(store_path)
        .await
        .with_context(|| format!("Failed to save store to '{}'", store_path.display()))?;

    println!(
        "{} {} is now '{}' ({:.0} kcal, {:.1} g protein, {:.1} g fiber).",
        day_name(meal.day_of_week),
        meal.meal_type,
        meal.name,
        meal.calories,
        meal.protein,
        meal.fiber
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let cli = parse_args();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let store = InMemoryStore::load(&cli.store)
        .await
        .with_context(|| format!("Failed to load store from '{}'", cli.store.display()))?;

    match &cli.command {
        Command::Grocery(args) => print_grocery_list(&store, args).await,
        Command::Optimize(args) => run_optimize(&store, &config, args, &cli.store).await,
        Command::Generate(args) => run_generate(&store, &config, args, &cli.store).await,
        Command::Regenerate(args) => run_regenerate(&store, &config, args, &cli.store).await,
    }
}
