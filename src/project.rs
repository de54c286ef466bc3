//! Project discovery and loading.
//!
//! A project is a directory holding exactly one `*.atomic` project file next
//! to its `Resources/` folder. The project file is JSON:
//!
//! ```json
//! { "name": "MyGame", "version": "1.0.0" }
//! ```

use crate::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of project files.
pub const PROJECT_FILE_EXTENSION: &str = "atomic";

/// On-disk project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A loaded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Project directory.
    pub path: PathBuf,
    /// Project file inside [`Project::path`].
    pub file: PathBuf,
    pub name: String,
    pub version: Option<String>,
}

impl Project {
    /// Load the project in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ToolError::Environment(format!(
                "project directory not found: {}",
                dir.display()
            )));
        }

        let file = find_project_file(dir)?;
        let content = fs::read_to_string(&file).map_err(|e| {
            ToolError::Environment(format!(
                "failed to read project file '{}': {}",
                file.display(),
                e
            ))
        })?;
        let parsed: ProjectFile = serde_json::from_str(&content).map_err(|e| {
            ToolError::Environment(format!(
                "failed to parse project file '{}': {}",
                file.display(),
                e
            ))
        })?;

        Ok(Self {
            path: dir.to_path_buf(),
            file,
            name: parsed.name,
            version: parsed.version,
        })
    }
}

fn find_project_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ToolError::Environment(format!(
            "failed to read project directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(PROJECT_FILE_EXTENSION)
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(ToolError::Environment(format!(
            "no .{} project file in {}",
            PROJECT_FILE_EXTENSION,
            dir.display()
        ))),
        1 => Ok(candidates.remove(0)),
        n => Err(ToolError::Environment(format!(
            "{} project files in {}, expected one",
            n,
            dir.display()
        ))),
    }
}

/// Project path given on the command line, loaded on demand.
#[derive(Debug, Clone)]
pub struct ProjectSlot {
    path: PathBuf,
    project: Option<Project>,
}

impl ProjectSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            project: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> Result<&Project> {
        let project = Project::load(&self.path)?;
        Ok(self.project.insert(project))
    }

    /// The loaded project; errors if [`ProjectSlot::load`] has not succeeded.
    pub fn loaded(&self) -> Result<&Project> {
        self.project.as_ref().ok_or_else(|| {
            ToolError::Command(format!("project not loaded: {}", self.path.display()))
        })
    }
}
