//! Tool configuration file.
//!
//! An optional YAML file tunes logging and storage locations. Unknown fields
//! are ignored for forward compatibility; every field has a default, so an
//! empty or missing file is valid.

use crate::error::{Result, ToolError};
use crate::telemetry::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ATOMIC_TOOL_CONFIG";

/// File name looked up in the tool data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Contents of the tool configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Log level used when `-loglevel` is not given.
    pub log_level: LogLevel,

    /// Where license records are stored (default: `<data dir>/license`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_dir: Option<PathBuf>,

    /// Root of the source tree, used by development builds for core data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_source_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ToolError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config if the file exists, defaults otherwise.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ToolConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ToolError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject empty path overrides.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("license_dir", &self.license_dir),
            ("root_source_dir", &self.root_source_dir),
        ] {
            if let Some(path) = value
                && path.as_os_str().is_empty()
            {
                return Err(ToolError::Config(format!(
                    "config validation failed: {} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}
