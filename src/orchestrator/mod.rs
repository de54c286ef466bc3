//! Lifecycle of one atomic-cli invocation.
//!
//! [`AtomicTool::run`] drives the phases in order:
//!
//! 1. setup: resolve the tool environment, interpret arguments, start the engine
//! 2. start: branch into a license request, a license validation, or a direct run
//! 3. event loop: feed queued events to [`phase::transition`] until the exit
//!    controller has an outcome
//! 4. stop: drop late events and return the outcome
//!
//! Any error in setup or start goes straight to the exit controller; no later
//! phase runs.

pub mod phase;

use crate::cli::{self, flags};
use crate::commands::{Command, CommandContext};
use crate::context::ToolContext;
use crate::environment::{EnvironmentOptions, ToolEnvironment, prepare_environment};
use crate::error::{Result, ToolError};
use crate::events::{EventQueue, EventSender, ToolEvent};
use crate::exit::{ExitController, ExitRequest, Outcome};
use crate::license::LicenseGate;
use crate::telemetry::LogLevel;
use phase::{Action, Phase, Transition};
use std::io::Write;

pub use phase::COMMAND_ERROR_MESSAGE;

/// Surfaced when the tool environment cannot be set up.
pub const ENVIRONMENT_INIT_FAILURE_MESSAGE: &str = "Unable to initialize tool environment";

pub struct AtomicTool {
    ctx: ToolContext,
    arguments: Vec<String>,
    exit: ExitController,
    queue: EventQueue,
    /// Producer reserved for the command run, taken when it starts.
    run_events: Option<EventSender>,
    phase: Phase,
    env: Option<ToolEnvironment>,
    command: Option<Box<dyn Command>>,
    command_started: bool,
}

impl AtomicTool {
    /// `arguments` excludes the program name.
    pub fn new(ctx: ToolContext, arguments: Vec<String>) -> Self {
        let queue = EventQueue::new();
        let run_events = Some(queue.sender());
        Self {
            ctx,
            arguments,
            exit: ExitController::new(),
            queue,
            run_events,
            phase: Phase::Setup,
            env: None,
            command: None,
            command_started: false,
        }
    }

    /// Replace the platform's exit controller.
    pub fn with_exit_controller(mut self, exit: ExitController) -> Self {
        self.exit = exit;
        self
    }

    /// Run the invocation to completion.
    pub fn run(mut self) -> Outcome {
        let started = self.setup().and_then(|()| self.start());
        if let Err(e) = started {
            self.terminate(ExitRequest::failure(e.message()));
        }

        // Only producers already handed out can wake the loop from here on.
        self.queue.close();
        while !self.exit.is_terminated() {
            match self.queue.next() {
                Some(event) => self.dispatch(event),
                None => {
                    tracing::error!("event queue closed before the invocation finished");
                    self.terminate(ExitRequest::failure(""));
                }
            }
        }

        self.stop()
    }

    fn setup(&mut self) -> Result<()> {
        let options = EnvironmentOptions {
            bootstrapping: flags::has_bootstrap_flag(&self.arguments),
            ..self.ctx.environment.clone()
        };
        let mut env = match ToolEnvironment::initialize(&options) {
            Ok(env) => env,
            Err(e) => {
                self.exit.startup_errors_mut().push(e.to_string());
                return Err(ToolError::Startup(format!(
                    "{}: {}",
                    ENVIRONMENT_INIT_FAILURE_MESSAGE, e
                )));
            }
        };

        let interpretation = cli::interpret(
            &self.arguments,
            self.ctx.parser.as_ref(),
            &mut env,
            self.ctx.dev_build,
        )?;

        if let Err(e) = self.ctx.engine.initialize(&interpretation.parameters) {
            // No message: the exit controller falls back to the buffered cause.
            self.exit.startup_errors_mut().push(e.to_string());
            return Err(ToolError::Startup(String::new()));
        }
        self.exit
            .set_error_log_active(interpretation.parameters.log_level() != LogLevel::None);

        tracing::debug!(
            command = interpretation.command.name(),
            bootstrap = env.is_bootstrapping(),
            "setup complete"
        );
        self.env = Some(env);
        self.command = Some(interpretation.command);
        self.enter(Phase::Start);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let (Some(env), Some(command)) = (self.env.as_ref(), self.command.as_mut()) else {
            return Err(ToolError::Startup(String::new()));
        };

        if let Some(request) = command.license_request() {
            tracing::debug!(?request, "license request replaces command run");
            self.run_events = None;
            let mut gate = LicenseGate::for_request(request);
            gate.start(self.ctx.license.as_mut(), env, &self.queue.sender());
            self.enter(Phase::Licensing(gate));
            return Ok(());
        }

        prepare_environment(
            command.as_mut(),
            self.ctx.file_system.as_ref(),
            self.ctx.resource_cache.as_mut(),
            self.ctx.build_system.as_mut(),
        )?;

        if command.requires_license_validation() {
            let mut gate = LicenseGate::validation();
            gate.start(self.ctx.license.as_mut(), env, &self.queue.sender());
            self.enter(Phase::Licensing(gate));
        } else {
            self.run_command();
        }
        Ok(())
    }

    fn dispatch(&mut self, event: ToolEvent) {
        tracing::debug!(phase = self.phase.name(), event = event.name(), "dispatch");
        let current = std::mem::replace(&mut self.phase, Phase::Stopped);
        let Transition { next, action } = phase::transition(current, &event);
        self.enter(next);

        match action {
            Some(Action::RunCommand) => self.run_command(),
            Some(Action::Exit(request)) => self.terminate(request),
            None => {}
        }
    }

    /// Invoke the command's run behavior. Never runs a command twice.
    fn run_command(&mut self) {
        if self.command_started {
            tracing::warn!("command already started, not running it again");
            return;
        }
        let (Some(command), Some(events)) = (self.command.as_mut(), self.run_events.take()) else {
            return;
        };
        self.command_started = true;
        self.phase = Phase::Running;

        tracing::debug!(command = command.name(), "running command");
        let mut run_ctx = CommandContext {
            events: events.clone(),
            build_system: self.ctx.build_system.as_ref(),
            resource_cache: self.ctx.resource_cache.as_ref(),
            out: self.ctx.output.as_mut(),
        };
        if let Err(e) = command.run(&mut run_ctx) {
            tracing::error!(command = command.name(), error = %e, "command failed to run");
            events.post(ToolEvent::command_error(e.message()));
        }
    }

    /// Hand a terminal decision to the exit controller. The first one wins.
    fn terminate(&mut self, request: ExitRequest) {
        if self.exit.is_terminated() {
            tracing::debug!(?request, "already terminated, ignoring");
            return;
        }

        if let ExitRequest::Success {
            notice: Some(notice),
        } = &request
            && let Err(e) = writeln!(self.ctx.output, "{}", notice)
        {
            tracing::warn!(error = %e, "failed to write notice");
        }

        self.exit.terminate(self.ctx.engine.as_mut(), request);
        self.enter(Phase::Stopped);
    }

    fn stop(self) -> Outcome {
        let AtomicTool {
            mut ctx,
            exit,
            queue,
            ..
        } = self;

        for event in queue.drain() {
            tracing::debug!(event = event.name(), "ignoring event after exit");
        }
        if let Err(e) = ctx.output.flush() {
            tracing::warn!(error = %e, "failed to flush output");
        }

        let outcome = exit.into_outcome(ctx.engine.as_mut());
        tracing::debug!(exit_code = outcome.exit_code, "stopped");
        outcome
    }

    fn enter(&mut self, next: Phase) {
        if self.phase.name() != next.name() {
            tracing::debug!(from = self.phase.name(), to = next.name(), "phase");
        }
        self.phase = next;
    }
}
