//! Structured logging setup for atomic-cli.
//!
//! The runtime host installs the global `tracing` subscriber once, when it
//! consumes the engine parameters. Log verbosity follows the host's integer
//! log levels; `ATOMIC_LOG` may override it with a full filter expression.

use serde::{Deserialize, Serialize};
use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Environment variable that overrides the computed log filter.
pub const LOG_ENV_VAR: &str = "ATOMIC_LOG";

static TELEMETRY_GUARD: OnceLock<()> = OnceLock::new();

/// Host log levels, in the integer encoding accepted by `-loglevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including debug output.
    Debug,
    /// Informational messages and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warning,
    /// Errors only.
    Error,
    /// Logging disabled.
    None,
}

impl LogLevel {
    /// Map the integer encoding onto a level.
    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Debug),
            1 => Some(Self::Info),
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            4 => Some(Self::None),
            _ => None,
        }
    }

    /// Integer encoding of this level.
    pub fn as_int(self) -> i64 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::None => 4,
        }
    }

    /// Equivalent tracing filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
            Self::None => LevelFilter::OFF,
        }
    }
}

/// Supported log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON, one object per line.
    Json,
}

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter expression in `ATOMIC_LOG` is invalid.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The global subscriber could not be installed.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Install the global subscriber on first call.
///
/// The filter is checked on every call, so a bad `ATOMIC_LOG` is always
/// reported. Past that, later calls return `Ok(())` without touching global
/// state and the first host to initialise wins.
pub fn initialise(level: LogLevel, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = build_filter(level)?;
    let mut outcome = Ok(());
    TELEMETRY_GUARD.get_or_init(|| outcome = install_subscriber(filter, format));
    outcome
}

/// Build the filter for a level, honouring the environment override.
pub fn build_filter(level: LogLevel) -> Result<EnvFilter, TelemetryError> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(expr) if !expr.trim().is_empty() => {
            EnvFilter::try_new(expr).map_err(|error| TelemetryError::Filter(error.to_string()))
        }
        _ => Ok(EnvFilter::default().add_directive(level.level_filter().into())),
    }
}

fn install_subscriber(filter: EnvFilter, format: LogFormat) -> Result<(), TelemetryError> {
    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| TelemetryError::Subscriber(error.to_string()))
}
