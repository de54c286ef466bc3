//! `build <project>`: record a build of the project for a platform.
//!
//! The build system owns artifact generation. This command checks that the
//! environment was prepared, then writes `build.json` under
//! `<build path>/<platform>/` describing what was built from where.

use super::{Command, CommandContext};
use crate::error::{Result, ToolError};
use crate::fs::atomic_write_file;
use crate::project::ProjectSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the record written into the platform build directory.
pub const BUILD_RECORD_FILE: &str = "build.json";

/// Description of a completed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub platform: String,
    pub resource_dirs: Vec<PathBuf>,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BuildCommand {
    project: ProjectSlot,
    platform: String,
}

impl BuildCommand {
    pub fn new(project_path: impl Into<PathBuf>, platform: impl Into<String>) -> Self {
        Self {
            project: ProjectSlot::new(project_path),
            platform: platform.into(),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }
}

impl Command for BuildCommand {
    fn name(&self) -> &str {
        "build"
    }

    fn requires_project_load(&self) -> bool {
        true
    }

    fn requires_license_validation(&self) -> bool {
        true
    }

    fn load_project(&mut self) -> Result<()> {
        self.project.load().map(|_| ())
    }

    fn project_path(&self) -> Option<&Path> {
        Some(self.project.path())
    }

    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let project = self.project.loaded()?;
        let build_path = ctx
            .build_system
            .build_path()
            .ok_or_else(|| ToolError::Command("build path not set".to_string()))?;

        let record = BuildRecord {
            project: project.name.clone(),
            version: project.version.clone(),
            platform: self.platform.clone(),
            resource_dirs: ctx.resource_cache.resource_dirs(),
            built_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| ToolError::Command(format!("failed to serialize build record: {}", e)))?;

        let target = build_path.join(&self.platform).join(BUILD_RECORD_FILE);
        atomic_write_file(&target, &json).map_err(|e| ToolError::Command(e.to_string()))?;

        tracing::debug!(project = %record.project, platform = %self.platform, "build recorded");
        ctx.println(&format!(
            "Built {} for {}: {}",
            record.project,
            self.platform,
            target.display()
        ))?;
        ctx.finished();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventQueue, ToolEvent};
    use crate::subsystems::{BuildPaths, BuildSystem, ResourceCache, ResourceDirs};
    use tempfile::TempDir;

    fn project_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Game.atomic"),
            r#"{"name":"Game","version":"0.3"}"#,
        )
        .unwrap();
        temp
    }

    #[test]
    fn declares_project_and_license_requirements() {
        let cmd = BuildCommand::new("proj", "web");
        assert!(cmd.requires_project_load());
        assert!(cmd.requires_license_validation());
        assert_eq!(cmd.project_path(), Some(Path::new("proj")));
        assert_eq!(cmd.license_request(), None);
    }

    #[test]
    fn run_writes_build_record_and_finishes() {
        let temp = project_dir();
        let mut cmd = BuildCommand::new(temp.path(), "linux");
        cmd.load_project().unwrap();

        let mut build = BuildPaths::default();
        build.set_build_path(&temp.path().join("Build"));
        let mut cache = ResourceDirs::default();
        cache.add_resource_dir(&temp.path().join("Resources"));
        let queue = EventQueue::new();
        let mut out = Vec::new();

        let mut ctx = CommandContext {
            events: queue.sender(),
            build_system: &build,
            resource_cache: &cache,
            out: &mut out,
        };
        cmd.run(&mut ctx).unwrap();

        assert_eq!(queue.drain(), vec![ToolEvent::CommandFinished]);
        let record_path = temp.path().join("Build").join("linux").join(BUILD_RECORD_FILE);
        let record: BuildRecord =
            serde_json::from_str(&std::fs::read_to_string(record_path).unwrap()).unwrap();
        assert_eq!(record.project, "Game");
        assert_eq!(record.version.as_deref(), Some("0.3"));
        assert_eq!(record.platform, "linux");
        assert_eq!(record.resource_dirs, vec![temp.path().join("Resources")]);
        assert!(String::from_utf8(out).unwrap().contains("Built Game for linux"));
    }

    #[test]
    fn run_without_build_path_fails_without_event() {
        let temp = project_dir();
        let mut cmd = BuildCommand::new(temp.path(), "linux");
        cmd.load_project().unwrap();

        let build = BuildPaths::default();
        let cache = ResourceDirs::default();
        let queue = EventQueue::new();
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            events: queue.sender(),
            build_system: &build,
            resource_cache: &cache,
            out: &mut out,
        };

        let err = cmd.run(&mut ctx).unwrap_err();
        assert_eq!(err, ToolError::Command("build path not set".to_string()));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn run_before_load_fails() {
        let mut cmd = BuildCommand::new("/nonexistent", "linux");
        let build = BuildPaths::default();
        let cache = ResourceDirs::default();
        let queue = EventQueue::new();
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            events: queue.sender(),
            build_system: &build,
            resource_cache: &cache,
            out: &mut out,
        };

        assert!(cmd.run(&mut ctx).is_err());
    }
}
