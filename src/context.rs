//! Collaborators of one tool invocation.
//!
//! Everything the orchestrator talks to lives in a [`ToolContext`], built once
//! at startup and owned by the orchestrator until exit. There is no global
//! registry; tests build a context out of fakes instead.

use crate::cli::{ClapCommandParser, CommandParser};
use crate::engine::{Engine, HeadlessEngine};
use crate::environment::EnvironmentOptions;
use crate::license::{LicenseSystem, LocalLicenseSystem};
use crate::subsystems::{
    BuildPaths, BuildSystem, FileSystem, LocalFileSystem, ResourceCache, ResourceDirs,
};
use std::io::{self, Write};

pub struct ToolContext {
    pub engine: Box<dyn Engine>,
    pub file_system: Box<dyn FileSystem>,
    pub resource_cache: Box<dyn ResourceCache>,
    pub build_system: Box<dyn BuildSystem>,
    pub license: Box<dyn LicenseSystem>,
    pub parser: Box<dyn CommandParser>,
    /// Inputs for tool environment resolution.
    pub environment: EnvironmentOptions,
    /// Command output and success notices.
    pub output: Box<dyn Write>,
    /// Inject source-tree resource paths for project commands.
    pub dev_build: bool,
}

impl ToolContext {
    /// Context for the real binary: local subsystems, stdout, process env.
    pub fn local() -> Self {
        Self {
            engine: Box::new(HeadlessEngine::new()),
            file_system: Box::new(LocalFileSystem),
            resource_cache: Box::new(ResourceDirs::default()),
            build_system: Box::new(BuildPaths::default()),
            license: Box::new(LocalLicenseSystem::new()),
            parser: Box::new(ClapCommandParser),
            environment: EnvironmentOptions::from_process_env(),
            output: Box::new(io::stdout()),
            dev_build: cfg!(feature = "dev-build"),
        }
    }
}
