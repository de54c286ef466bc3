//! `activate <key>` and `deactivate`.
//!
//! These commands carry a license request. The orchestrator sees the request
//! before any environment preparation and drives the license gate instead of
//! calling [`Command::run`].

use super::{Command, CommandContext};
use crate::error::{Result, ToolError};
use crate::license::LicenseRequest;

#[derive(Debug, Clone)]
pub struct ActivateCommand {
    key: String,
}

impl ActivateCommand {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for ActivateCommand {
    fn name(&self) -> &str {
        "activate"
    }

    fn license_request(&self) -> Option<LicenseRequest> {
        Some(LicenseRequest::Activate {
            key: self.key.clone(),
        })
    }

    fn run(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        Err(handled_by_license_gate(self.name()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeactivateCommand;

impl Command for DeactivateCommand {
    fn name(&self) -> &str {
        "deactivate"
    }

    fn license_request(&self) -> Option<LicenseRequest> {
        Some(LicenseRequest::Deactivate)
    }

    fn run(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        Err(handled_by_license_gate(self.name()))
    }
}

fn handled_by_license_gate(name: &str) -> ToolError {
    ToolError::Command(format!("{} is handled by the license subsystem", name))
}
