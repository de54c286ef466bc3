//! Tool environment and per-command environment preparation.

mod prepare;
mod tool;

pub use prepare::{
    BUILD_DIR_NAME, CACHE_DIR_NAME, MISSING_PROJECT_PATH_MESSAGE, RESOURCES_DIR_NAME,
    prepare_environment,
};
pub use tool::{
    DATA_DIR_ENV_VAR, DATA_DIR_NAME, EnvironmentOptions, ROOT_SOURCE_DIR_ENV_VAR, ToolEnvironment,
};
