//! Environment preparation for commands that work on a project.
//!
//! Runs once, after command selection and before any license or run logic:
//!
//! 1. load the project
//! 2. register `<project>/Resources`, then `<project>/Cache`, with the resource cache
//! 3. register `<project>/Build` with the build system
//! 4. create `<project>/Build` if missing, and verify that it now exists

use crate::commands::Command;
use crate::error::{Result, ToolError};
use crate::subsystems::{BuildSystem, FileSystem, ResourceCache};
use std::path::{Path, PathBuf};

pub const RESOURCES_DIR_NAME: &str = "Resources";
pub const CACHE_DIR_NAME: &str = "Cache";
pub const BUILD_DIR_NAME: &str = "Build";

/// Message when a project command was selected without a project path.
pub const MISSING_PROJECT_PATH_MESSAGE: &str = "Failed to load project: no project path given";

/// Prepare the environment for `command`.
///
/// Does nothing (and touches no collaborator) unless the command requires a
/// project.
pub fn prepare_environment(
    command: &mut dyn Command,
    file_system: &dyn FileSystem,
    resource_cache: &mut dyn ResourceCache,
    build_system: &mut dyn BuildSystem,
) -> Result<()> {
    if !command.requires_project_load() {
        return Ok(());
    }

    let project_path = command
        .project_path()
        .map(Path::to_path_buf)
        .ok_or_else(|| ToolError::Environment(MISSING_PROJECT_PATH_MESSAGE.to_string()))?;

    if let Err(e) = command.load_project() {
        tracing::error!(project = %project_path.display(), error = %e, "project load failed");
        return Err(ToolError::Environment(format!(
            "Failed to load project: {}",
            project_path.display()
        )));
    }

    resource_cache.add_resource_dir(&project_path.join(RESOURCES_DIR_NAME));
    resource_cache.add_resource_dir(&project_path.join(CACHE_DIR_NAME));

    let build_path = project_path.join(BUILD_DIR_NAME);
    build_system.set_build_path(&build_path);
    ensure_build_dir(file_system, build_path)?;

    tracing::debug!(project = %project_path.display(), "environment prepared");
    Ok(())
}

fn ensure_build_dir(file_system: &dyn FileSystem, build_path: PathBuf) -> Result<()> {
    if file_system.dir_exists(&build_path) {
        return Ok(());
    }

    if let Err(e) = file_system.create_dir(&build_path) {
        tracing::error!(path = %build_path.display(), error = %e, "create_dir failed");
    }

    // create_dir may report success without creating anything.
    if !file_system.dir_exists(&build_path) {
        return Err(ToolError::Environment(format!(
            "Failed to create build folder: {}",
            build_path.display()
        )));
    }

    tracing::debug!(path = %build_path.display(), "created build folder");
    Ok(())
}
