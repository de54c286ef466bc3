//! Tool environment resolution.
//!
//! Resolves the directories the tool works with (data dir, license store,
//! source tree root) and loads the tool configuration. All paths are resolved
//! once during setup and then only read.

use crate::config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, ToolConfig};
use crate::error::{Result, ToolError};
use std::env;
use std::path::{Path, PathBuf};

/// Overrides the per-user data directory.
pub const DATA_DIR_ENV_VAR: &str = "ATOMIC_TOOL_DATA_DIR";

/// Overrides the source tree root.
pub const ROOT_SOURCE_DIR_ENV_VAR: &str = "ATOMIC_ROOT_SOURCE_DIR";

/// Directory name under the platform data dir.
pub const DATA_DIR_NAME: &str = "atomic-tool";

/// Inputs to [`ToolEnvironment::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOptions {
    /// Bootstrap mode, set by `-toolbootstrap`.
    pub bootstrapping: bool,
    /// Explicit data directory.
    pub data_dir: Option<PathBuf>,
    /// Explicit config file; must exist when given.
    pub config_path: Option<PathBuf>,
    /// Explicit source tree root.
    pub root_source_dir: Option<PathBuf>,
}

impl EnvironmentOptions {
    /// Read overrides from the process environment.
    pub fn from_process_env() -> Self {
        Self {
            bootstrapping: false,
            data_dir: non_empty_env(DATA_DIR_ENV_VAR),
            config_path: non_empty_env(CONFIG_ENV_VAR),
            root_source_dir: non_empty_env(ROOT_SOURCE_DIR_ENV_VAR),
        }
    }

    /// Options rooted at an explicit data directory, ignoring the process env.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolved tool environment.
#[derive(Debug, Clone)]
pub struct ToolEnvironment {
    bootstrapping: bool,
    data_dir: PathBuf,
    license_dir: PathBuf,
    root_source_dir: Option<PathBuf>,
    config: ToolConfig,
}

impl ToolEnvironment {
    /// Resolve directories and load the tool configuration.
    ///
    /// Fails when no data directory can be determined, when the config file
    /// is unreadable or invalid, or when bootstrap mode has no source tree.
    pub fn initialize(options: &EnvironmentOptions) -> Result<Self> {
        let data_dir = match &options.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join(DATA_DIR_NAME))
                .ok_or_else(|| {
                    ToolError::Startup("could not determine the tool data directory".to_string())
                })?,
        };

        let config = match &options.config_path {
            Some(path) => ToolConfig::load(path)?,
            None => ToolConfig::load_optional(data_dir.join(CONFIG_FILE_NAME))?,
        };

        let license_dir = config
            .license_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("license"));

        let root_source_dir = options
            .root_source_dir
            .clone()
            .or_else(|| config.root_source_dir.clone())
            .or_else(|| {
                (options.bootstrapping || cfg!(feature = "dev-build"))
                    .then(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
            });

        if options.bootstrapping {
            match &root_source_dir {
                Some(root) if root.is_dir() => {}
                Some(root) => {
                    return Err(ToolError::Startup(format!(
                        "bootstrap source tree not found: {}",
                        root.display()
                    )));
                }
                None => {
                    return Err(ToolError::Startup(
                        "bootstrap requires a source tree".to_string(),
                    ));
                }
            }
        }

        tracing::debug!(
            data_dir = %data_dir.display(),
            license_dir = %license_dir.display(),
            bootstrapping = options.bootstrapping,
            "tool environment initialized"
        );

        Ok(Self {
            bootstrapping: options.bootstrapping,
            data_dir,
            license_dir,
            root_source_dir,
            config,
        })
    }

    /// Switch into bootstrap mode after initialization.
    pub fn set_bootstrapping(&mut self) {
        self.bootstrapping = true;
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.bootstrapping
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn license_dir(&self) -> &Path {
        &self.license_dir
    }

    pub fn root_source_dir(&self) -> Option<&Path> {
        self.root_source_dir.as_deref()
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// `<root source dir>/Resources/`, the dev-build resource prefix.
    pub fn resource_prefix_dir(&self) -> Option<PathBuf> {
        self.root_source_dir
            .as_ref()
            .map(|root| root.join("Resources").join(""))
    }
}
