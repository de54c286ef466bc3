//! Orchestrator phases and the event transition function.
//!
//! ```text
//! Setup -> Start -> Licensing(gate) -> Running -> Stopped
//!              \________________________/          ^
//!               \_________________________________/
//! ```
//!
//! Only `Licensing` and `Running` react to events. Every terminal decision
//! moves the phase to `Stopped`, which ignores everything.

use crate::events::ToolEvent;
use crate::exit::ExitRequest;
use crate::license::{GateStep, LicenseGate};

/// Used when a command error carries no message.
pub const COMMAND_ERROR_MESSAGE: &str = "Command Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Environment, arguments and engine are being set up.
    Setup,
    /// Choosing between license request, license validation and a direct run.
    Start,
    /// Waiting on the license subsystem.
    Licensing(LicenseGate),
    /// The command has been started and owns the next terminal event.
    Running,
    /// The outcome is decided.
    Stopped,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Start => "start",
            Phase::Licensing(_) => "licensing",
            Phase::Running => "running",
            Phase::Stopped => "stopped",
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Invoke the command's run behavior.
    RunCommand,
    /// Hand the outcome to the exit controller.
    Exit(ExitRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Phase,
    pub action: Option<Action>,
}

impl Transition {
    fn stay(phase: Phase) -> Self {
        Self {
            next: phase,
            action: None,
        }
    }

    fn exit(request: ExitRequest) -> Self {
        Self {
            next: Phase::Stopped,
            action: Some(Action::Exit(request)),
        }
    }
}

/// Feed one event to the current phase.
pub fn transition(phase: Phase, event: &ToolEvent) -> Transition {
    match phase {
        Phase::Licensing(mut gate) => match gate.handle(event) {
            GateStep::RunCommand => Transition {
                next: Phase::Running,
                action: Some(Action::RunCommand),
            },
            GateStep::Exit(request) => Transition::exit(request),
            GateStep::Wait | GateStep::Ignored => Transition::stay(Phase::Licensing(gate)),
        },
        Phase::Running => match event {
            ToolEvent::CommandFinished => Transition::exit(ExitRequest::success()),
            ToolEvent::CommandError { message } => {
                let message = if message.is_empty() {
                    COMMAND_ERROR_MESSAGE
                } else {
                    message.as_str()
                };
                Transition::exit(ExitRequest::failure(message))
            }
            other => {
                tracing::debug!(event = other.name(), "ignoring event while running");
                Transition::stay(Phase::Running)
            }
        },
        phase => {
            tracing::debug!(phase = phase.name(), event = event.name(), "ignoring event");
            Transition::stay(phase)
        }
    }
}
