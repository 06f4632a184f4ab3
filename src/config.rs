use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::api_connection::ProviderKind;
use crate::optim::DEFAULT_MAX_ITERATIONS;

pub const PROVIDER_ENV_VAR: &str = "MEAL_OPTIM_PROVIDER";
pub const API_KEY_VAR_ENV_VAR: &str = "MEAL_OPTIM_API_KEY_VAR";
pub const MODEL_ENV_VAR: &str = "MEAL_OPTIM_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "MEAL_OPTIM_TIMEOUT_SECS";
pub const MAX_ITERATIONS_ENV_VAR: &str = "MEAL_OPTIM_MAX_ITERATIONS";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub provider: ProviderKind,
    /// Name of the environment variable holding the API key.
    pub api_key_env_var: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_iterations: u32,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = match lookup(PROVIDER_ENV_VAR) {
            Some(raw) => raw.parse::<ProviderKind>().map_err(|reason| ConfigError::Invalid {
                var: PROVIDER_ENV_VAR,
                value: raw.clone(),
                reason,
            })?,
            None => ProviderKind::OpenAi,
        };

        let api_key_env_var = lookup(API_KEY_VAR_ENV_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| provider.default_api_key_env_var().to_string());
        let model = lookup(MODEL_ENV_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs = parse_positive(&lookup, TIMEOUT_ENV_VAR)?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_iterations = match lookup(MAX_ITERATIONS_ENV_VAR) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: MAX_ITERATIONS_ENV_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_ITERATIONS,
        };

        Ok(Self {
            provider,
            api_key_env_var,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            max_iterations,
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(v) => Ok(Some(v)),
        Err(e) => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
