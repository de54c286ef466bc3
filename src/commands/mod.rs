//! Commands selectable from the command line.
//!
//! The orchestrator never looks at a command's concrete type. It only uses the
//! capability surface of [`Command`]: whether a project must be loaded, whether
//! a license must be validated, and how to run it. A command signals completion
//! by posting `CommandFinished` or `CommandError` through its
//! [`CommandContext`].

mod build;
mod info;
mod license;
mod version;

pub use build::{BUILD_RECORD_FILE, BuildCommand, BuildRecord};
pub use info::InfoCommand;
pub use license::{ActivateCommand, DeactivateCommand};
pub use version::{PrintCommand, VersionCommand};

use crate::error::{Result, ToolError};
use crate::events::{EventSender, ToolEvent};
use crate::license::LicenseRequest;
use crate::subsystems::{BuildSystem, ResourceCache};
use std::io::Write;
use std::path::Path;

/// Collaborators available to a running command.
pub struct CommandContext<'a> {
    pub events: EventSender,
    pub build_system: &'a dyn BuildSystem,
    pub resource_cache: &'a dyn ResourceCache,
    pub out: &'a mut dyn Write,
}

impl CommandContext<'_> {
    /// Post `CommandFinished`.
    pub fn finished(&self) {
        self.events.post(ToolEvent::CommandFinished);
    }

    /// Write one line of command output.
    pub fn println(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)
            .map_err(|e| ToolError::Command(format!("failed to write output: {}", e)))
    }
}

/// A unit of work selected for this invocation.
pub trait Command {
    /// Command name as typed on the command line.
    fn name(&self) -> &str;

    fn requires_project_load(&self) -> bool {
        false
    }

    fn requires_license_validation(&self) -> bool {
        false
    }

    /// Load the project named by [`Command::project_path`].
    fn load_project(&mut self) -> Result<()> {
        Ok(())
    }

    fn project_path(&self) -> Option<&Path> {
        None
    }

    /// Activation or deactivation to perform instead of running.
    fn license_request(&self) -> Option<LicenseRequest> {
        None
    }

    /// Start the command.
    ///
    /// Completion is reported through `ctx`; an `Err` here is turned into a
    /// `CommandError` event by the orchestrator.
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()>;
}
