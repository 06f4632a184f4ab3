pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod grocery;
pub mod meal_generator;
pub mod models;
pub mod optim;
pub mod store;
pub mod telemetry;

pub use error::MealPlanError;
