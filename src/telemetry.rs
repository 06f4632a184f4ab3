use std::env;

pub const LOG_FORMAT_ENV_VAR: &str = "MEAL_OPTIM_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `json` (any case) selects JSON lines; anything else, or nothing, is compact.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(LOG_FORMAT_ENV_VAR) {
            Some(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Initialize tracing according to RUST_LOG and MEAL_OPTIM_LOG_FORMAT.
/// - Defaults to `info` if `RUST_LOG` is unset
/// - `MEAL_OPTIM_LOG_FORMAT=json` switches to JSON lines
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Json => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        LogFormat::Compact => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}
