//! `info <project>`: print what the tool resolved for a project.

use super::{Command, CommandContext};
use crate::error::Result;
use crate::project::ProjectSlot;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InfoCommand {
    project: ProjectSlot,
}

impl InfoCommand {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project: ProjectSlot::new(project_path),
        }
    }
}

impl Command for InfoCommand {
    fn name(&self) -> &str {
        "info"
    }

    fn requires_project_load(&self) -> bool {
        true
    }

    fn load_project(&mut self) -> Result<()> {
        self.project.load().map(|_| ())
    }

    fn project_path(&self) -> Option<&Path> {
        Some(self.project.path())
    }

    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let project = self.project.loaded()?.clone();

        ctx.println(&format!("Project:   {}", project.name))?;
        if let Some(version) = &project.version {
            ctx.println(&format!("Version:   {}", version))?;
        }
        ctx.println(&format!("Path:      {}", project.path.display()))?;
        ctx.println(&format!("File:      {}", project.file.display()))?;
        for dir in ctx.resource_cache.resource_dirs() {
            ctx.println(&format!("Resources: {}", dir.display()))?;
        }
        if let Some(build) = ctx.build_system.build_path() {
            ctx.println(&format!("Build:     {}", build.display()))?;
        }

        ctx.finished();
        Ok(())
    }
}
