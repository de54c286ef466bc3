//! Engine parameters handed to the runtime host at startup.

use crate::telemetry::{LogFormat, LogLevel};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Run without a window or audio device.
pub const HEADLESS: &str = "Headless";
/// Integer host log level.
pub const LOG_LEVEL: &str = "LogLevel";
/// Log output format, `compact` or `json`.
pub const LOG_FORMAT: &str = "LogFormat";
/// Resource directories searched by the host, `;`-separated.
pub const RESOURCE_PATHS: &str = "ResourcePaths";
/// Prefix prepended to every entry of [`RESOURCE_PATHS`].
pub const RESOURCE_PREFIX_PATHS: &str = "ResourcePrefixPaths";

/// Typed value of a single engine parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    String(String),
    Path(PathBuf),
}

/// Ordered map from option name to typed value.
///
/// Built by the argument interpreter, then consumed read-only by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EngineParameters {
    values: BTreeMap<String, ParamValue>,
}

impl EngineParameters {
    /// Parameters every tool invocation starts from.
    pub fn tool_defaults(log_level: LogLevel) -> Self {
        let mut params = Self::default();
        params.set(HEADLESS, ParamValue::Bool(true));
        params.set_log_level(log_level);
        params
    }

    pub fn set(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.set(LOG_LEVEL, ParamValue::Int(level.as_int()));
    }

    /// Log level, falling back to the default for missing or unknown values.
    pub fn log_level(&self) -> LogLevel {
        match self.get(LOG_LEVEL) {
            Some(ParamValue::Int(value)) => LogLevel::from_int(*value).unwrap_or_default(),
            _ => LogLevel::default(),
        }
    }

    pub fn set_log_format(&mut self, format: LogFormat) {
        let name = match format {
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        };
        self.set(LOG_FORMAT, ParamValue::String(name.to_string()));
    }

    pub fn log_format(&self) -> LogFormat {
        match self.get(LOG_FORMAT) {
            Some(ParamValue::String(name)) if name == "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }

    pub fn headless(&self) -> bool {
        matches!(self.get(HEADLESS), Some(ParamValue::Bool(true)))
    }

    pub fn resource_paths(&self) -> Option<&str> {
        match self.get(RESOURCE_PATHS) {
            Some(ParamValue::String(paths)) => Some(paths),
            _ => None,
        }
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
