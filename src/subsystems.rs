//! Collaborator interfaces used while preparing a command's environment.
//!
//! The orchestrator only talks to the filesystem, the resource cache and the
//! build system through these traits. Local implementations back the real
//! binary; tests substitute recording fakes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory primitives.
pub trait FileSystem {
    fn dir_exists(&self, path: &Path) -> bool;

    /// Attempt to create `path` and any missing parents.
    ///
    /// Callers must not trust the return value alone: the environment
    /// preparer re-checks [`FileSystem::dir_exists`] afterwards.
    fn create_dir(&self, path: &Path) -> io::Result<()>;
}

/// Ordered list of directories the host searches for resources.
pub trait ResourceCache {
    fn add_resource_dir(&mut self, path: &Path);

    /// Registered directories, in registration order.
    fn resource_dirs(&self) -> Vec<PathBuf>;
}

/// Build output location.
pub trait BuildSystem {
    fn set_build_path(&mut self, path: &Path);

    fn build_path(&self) -> Option<PathBuf>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// In-process resource search list.
#[derive(Debug, Default, Clone)]
pub struct ResourceDirs {
    dirs: Vec<PathBuf>,
}

impl ResourceCache for ResourceDirs {
    fn add_resource_dir(&mut self, path: &Path) {
        // Re-adding a directory is a no-op, matching the host's search list.
        if !self.dirs.iter().any(|dir| dir == path) {
            self.dirs.push(path.to_path_buf());
        }
    }

    fn resource_dirs(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }
}

/// In-process build path holder.
#[derive(Debug, Default, Clone)]
pub struct BuildPaths {
    build_path: Option<PathBuf>,
}

impl BuildSystem for BuildPaths {
    fn set_build_path(&mut self, path: &Path) {
        tracing::debug!(path = %path.display(), "build path set");
        self.build_path = Some(path.to_path_buf());
    }

    fn build_path(&self) -> Option<PathBuf> {
        self.build_path.clone()
    }
}
