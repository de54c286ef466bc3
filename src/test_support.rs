//! Recording fakes for the orchestrator's collaborators.
//!
//! Every fake shares its log through `Rc<RefCell<..>>`, so a test keeps one
//! handle while the orchestrator owns the boxed other half.

use crate::cli::parameters::EngineParameters;
use crate::cli::{CommandParser, ParseFailure};
use crate::commands::{Command, CommandContext};
use crate::engine::Engine;
use crate::environment::{EnvironmentOptions, ToolEnvironment};
use crate::error::{Result, ToolError};
use crate::events::{EventSender, ToolEvent};
use crate::license::{LicenseRequest, LicenseSystem};
use crate::subsystems::{BuildSystem, FileSystem, ResourceCache};
use crate::telemetry::LogLevel;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub(crate) fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Tool environment rooted in a fresh temporary data dir.
pub(crate) fn test_environment() -> (TempDir, ToolEnvironment) {
    let temp = TempDir::new().unwrap();
    let env = ToolEnvironment::initialize(&EnvironmentOptions::with_data_dir(temp.path())).unwrap();
    (temp, env)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub(crate) struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log sink for a scoped subscriber, formatted the way stderr would see it.
#[derive(Clone, Default)]
pub(crate) struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    pub(crate) fn subscriber(
        &self,
        level: LogLevel,
    ) -> impl tracing::Subscriber + Send + Sync + use<> {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(level.level_filter())
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct EngineLog {
    pub initialized_with: Option<EngineParameters>,
    pub exit_calls: usize,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingEngine {
    pub log: Rc<RefCell<EngineLog>>,
    pub fail_initialize: Option<String>,
}

impl Engine for RecordingEngine {
    fn initialize(&mut self, parameters: &EngineParameters) -> Result<()> {
        if let Some(message) = &self.fail_initialize {
            return Err(ToolError::Startup(message.clone()));
        }
        self.log.borrow_mut().initialized_with = Some(parameters.clone());
        Ok(())
    }

    fn exit(&mut self) {
        self.log.borrow_mut().exit_calls += 1;
    }

    fn is_exiting(&self) -> bool {
        self.log.borrow().exit_calls > 0
    }
}

// ---------------------------------------------------------------------------
// File system, resource cache, build system
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct FsLog {
    pub dirs: BTreeSet<PathBuf>,
    pub ops: Vec<String>,
}

/// In-memory file system. With `refuse_create` set, `create_dir` reports
/// success but creates nothing.
#[derive(Clone, Default)]
pub(crate) struct RecordingFileSystem {
    pub log: Rc<RefCell<FsLog>>,
    pub refuse_create: bool,
}

impl RecordingFileSystem {
    pub(crate) fn with_dir(self, path: &Path) -> Self {
        self.log.borrow_mut().dirs.insert(path.to_path_buf());
        self
    }

    pub(crate) fn ops(&self) -> Vec<String> {
        self.log.borrow().ops.clone()
    }

    pub(crate) fn has_dir(&self, path: &Path) -> bool {
        self.log.borrow().dirs.contains(path)
    }
}

impl FileSystem for RecordingFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        let mut log = self.log.borrow_mut();
        log.ops.push(format!("exists {}", path.display()));
        log.dirs.contains(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut log = self.log.borrow_mut();
        log.ops.push(format!("create {}", path.display()));
        if !self.refuse_create {
            log.dirs.insert(path.to_path_buf());
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingResourceCache(pub Rc<RefCell<Vec<PathBuf>>>);

impl ResourceCache for RecordingResourceCache {
    fn add_resource_dir(&mut self, path: &Path) {
        self.0.borrow_mut().push(path.to_path_buf());
    }

    fn resource_dirs(&self) -> Vec<PathBuf> {
        self.0.borrow().clone()
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingBuildSystem(pub Rc<RefCell<Option<PathBuf>>>);

impl BuildSystem for RecordingBuildSystem {
    fn set_build_path(&mut self, path: &Path) {
        *self.0.borrow_mut() = Some(path.to_path_buf());
    }

    fn build_path(&self) -> Option<PathBuf> {
        self.0.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// License system
// ---------------------------------------------------------------------------

/// License fake that records calls and answers with preset events.
#[derive(Clone, Default)]
pub(crate) struct ScriptedLicense {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub on_initialize: Vec<ToolEvent>,
    pub on_activate: Vec<ToolEvent>,
    pub on_deactivate: Vec<ToolEvent>,
}

impl ScriptedLicense {
    pub(crate) fn validating(events: &[ToolEvent]) -> Self {
        Self {
            on_initialize: events.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl LicenseSystem for ScriptedLicense {
    fn initialize(&mut self, _env: &ToolEnvironment, events: &EventSender) {
        self.calls.borrow_mut().push("initialize".to_string());
        for event in &self.on_initialize {
            events.post(event.clone());
        }
    }

    fn license_agreement_confirmed(&mut self) {
        self.calls.borrow_mut().push("agreement_confirmed".to_string());
    }

    fn request_activation(&mut self, _env: &ToolEnvironment, key: &str, events: &EventSender) {
        self.calls.borrow_mut().push(format!("activate {}", key));
        for event in &self.on_activate {
            events.post(event.clone());
        }
    }

    fn request_deactivation(&mut self, _env: &ToolEnvironment, events: &EventSender) {
        self.calls.borrow_mut().push("deactivate".to_string());
        for event in &self.on_deactivate {
            events.post(event.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Commands and parser
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct CommandLog {
    pub loads: usize,
    pub runs: usize,
    /// Resource dirs and build path seen at run time.
    pub seen_resources: Vec<PathBuf>,
    pub seen_build_path: Option<PathBuf>,
}

/// Command whose capabilities and run behavior are set by the test.
#[derive(Clone, Default)]
pub(crate) struct ScriptedCommand {
    pub log: Rc<RefCell<CommandLog>>,
    pub requires_project: bool,
    pub requires_license: bool,
    pub project_path: Option<PathBuf>,
    pub load_fails: bool,
    pub license_request: Option<LicenseRequest>,
    /// Events posted from `run`.
    pub on_run: Vec<ToolEvent>,
    /// Synchronous error returned from `run`.
    pub run_error: Option<String>,
}

impl ScriptedCommand {
    pub(crate) fn finishing() -> Self {
        Self {
            on_run: vec![ToolEvent::CommandFinished],
            ..Self::default()
        }
    }

    pub(crate) fn with_project(mut self, path: &Path) -> Self {
        self.requires_project = true;
        self.project_path = Some(path.to_path_buf());
        self
    }

    pub(crate) fn licensed(mut self) -> Self {
        self.requires_license = true;
        self
    }

    pub(crate) fn runs(&self) -> usize {
        self.log.borrow().runs
    }
}

impl Command for ScriptedCommand {
    fn name(&self) -> &str {
        "scripted"
    }

    fn requires_project_load(&self) -> bool {
        self.requires_project
    }

    fn requires_license_validation(&self) -> bool {
        self.requires_license
    }

    fn load_project(&mut self) -> Result<()> {
        self.log.borrow_mut().loads += 1;
        if self.load_fails {
            Err(ToolError::Environment("project file missing".to_string()))
        } else {
            Ok(())
        }
    }

    fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    fn license_request(&self) -> Option<LicenseRequest> {
        self.license_request.clone()
    }

    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        {
            let mut log = self.log.borrow_mut();
            log.runs += 1;
            log.seen_resources = ctx.resource_cache.resource_dirs();
            log.seen_build_path = ctx.build_system.build_path();
        }
        for event in &self.on_run {
            ctx.events.post(event.clone());
        }
        match &self.run_error {
            Some(message) => Err(ToolError::Command(message.clone())),
            None => Ok(()),
        }
    }
}

/// Parser that hands out one prepared command, or fails with a message.
#[derive(Default)]
pub(crate) struct ScriptedParser {
    pub command: RefCell<Option<Box<dyn Command>>>,
    pub failure: Option<String>,
    pub seen: Rc<RefCell<Vec<String>>>,
}

impl ScriptedParser {
    pub(crate) fn selecting(command: impl Command + 'static) -> Self {
        Self {
            command: RefCell::new(Some(Box::new(command))),
            ..Self::default()
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl CommandParser for ScriptedParser {
    fn parse(&self, arguments: &[String]) -> std::result::Result<Box<dyn Command>, ParseFailure> {
        self.seen.borrow_mut().extend(arguments.iter().cloned());
        if let Some(message) = &self.failure {
            return Err(ParseFailure::new(message.clone()));
        }
        self.command
            .borrow_mut()
            .take()
            .ok_or_else(ParseFailure::default)
    }
}
