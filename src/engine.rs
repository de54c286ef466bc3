//! Runtime host.
//!
//! The host consumes the engine parameters once at startup and is shut down
//! by the exit controller before the process reports its exit code.

use crate::cli::parameters::EngineParameters;
use crate::error::{Result, ToolError};
use crate::telemetry;

/// Runtime host driven by the orchestrator.
pub trait Engine {
    /// Consume the configuration map. Called once, after setup succeeds.
    fn initialize(&mut self, parameters: &EngineParameters) -> Result<()>;

    /// Request shutdown. Safe to call more than once.
    fn exit(&mut self);

    fn is_exiting(&self) -> bool;
}

/// Host for command-line use: no window, logging to stderr.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    parameters: Option<EngineParameters>,
    exiting: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters the host was initialized with, if any.
    pub fn parameters(&self) -> Option<&EngineParameters> {
        self.parameters.as_ref()
    }
}

impl Engine for HeadlessEngine {
    fn initialize(&mut self, parameters: &EngineParameters) -> Result<()> {
        if !parameters.headless() {
            return Err(ToolError::Startup(
                "atomic-cli requires a headless engine".to_string(),
            ));
        }

        telemetry::initialise(parameters.log_level(), parameters.log_format())
            .map_err(|e| ToolError::Startup(e.to_string()))?;

        tracing::debug!(
            parameters = %serde_json::to_string(parameters).unwrap_or_default(),
            "engine initialized"
        );
        self.parameters = Some(parameters.clone());
        Ok(())
    }

    fn exit(&mut self) {
        if !self.exiting {
            tracing::debug!("engine exit requested");
        }
        self.exiting = true;
    }

    fn is_exiting(&self) -> bool {
        self.exiting
    }
}
