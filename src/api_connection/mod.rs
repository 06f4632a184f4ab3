pub mod connection;
pub mod endpoints;
pub mod generator;
pub mod json_reply;

pub use connection::{ApiConnectionError, Provider, ProviderKind};
pub use generator::{GenerationPrompt, TextGenerator};
pub use json_reply::{extract_json_object, parse_json_reply};
