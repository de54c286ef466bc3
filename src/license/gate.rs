//! License gate state machine.
//!
//! ```text
//! validation:   Idle -> Validating -> Success            => run command
//!                                  -> EulaRequired       => fail
//!                                  -> ActivationRequired => fail
//!                                  -> Error              => fail
//! activation:   ActivationRequested -> Activating -> ActivationSuccess   => exit 0
//!                                                 -> ActivationError     => fail
//! deactivation: DeactivationRequested -> Deactivating -> DeactivationSuccess => exit 0
//!                                                     -> DeactivationError   => fail
//! ```
//!
//! Once the gate reaches a final state every further event is ignored.

use super::{
    ACTIVATION_REQUIRED_MESSAGE, ACTIVATION_SUCCESS_MESSAGE, DEACTIVATION_SUCCESS_MESSAGE,
    LicenseRequest, LicenseSystem,
};
use crate::environment::ToolEnvironment;
use crate::events::{EventSender, ToolEvent};
use crate::exit::ExitRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseState {
    Idle,
    Validating,
    Success,
    EulaRequired,
    ActivationRequired,
    Error,
    ActivationRequested,
    Activating,
    ActivationSuccess,
    ActivationError,
    DeactivationRequested,
    Deactivating,
    DeactivationSuccess,
    DeactivationError,
}

impl LicenseState {
    /// No further transitions leave this state.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::EulaRequired
                | Self::ActivationRequired
                | Self::Error
                | Self::ActivationSuccess
                | Self::ActivationError
                | Self::DeactivationSuccess
                | Self::DeactivationError
        )
    }
}

/// What the orchestrator should do after the gate handled a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStep {
    /// A license request is in flight.
    Wait,
    /// Validation passed; hand off to the command runner.
    RunCommand,
    /// The gate decided the invocation's outcome.
    Exit(ExitRequest),
    /// The event does not apply to the current state.
    Ignored,
}

/// License session for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseGate {
    state: LicenseState,
    activation_key: Option<String>,
}

impl LicenseGate {
    /// Gate that validates before running the command.
    pub fn validation() -> Self {
        Self {
            state: LicenseState::Idle,
            activation_key: None,
        }
    }

    /// Gate that performs an activation or deactivation instead of a run.
    pub fn for_request(request: LicenseRequest) -> Self {
        match request {
            LicenseRequest::Activate { key } => Self {
                state: LicenseState::ActivationRequested,
                activation_key: Some(key),
            },
            LicenseRequest::Deactivate => Self {
                state: LicenseState::DeactivationRequested,
                activation_key: None,
            },
        }
    }

    pub fn state(&self) -> LicenseState {
        self.state
    }

    /// Issue the license request for the gate's entry state.
    pub fn start(
        &mut self,
        license: &mut dyn LicenseSystem,
        env: &ToolEnvironment,
        events: &EventSender,
    ) -> GateStep {
        match self.state {
            LicenseState::Idle => {
                self.enter(LicenseState::Validating);
                license.initialize(env, events);
                GateStep::Wait
            }
            LicenseState::ActivationRequested => {
                self.enter(LicenseState::Activating);
                let key = self.activation_key.take().unwrap_or_default();
                license.license_agreement_confirmed();
                license.request_activation(env, &key, events);
                GateStep::Wait
            }
            LicenseState::DeactivationRequested => {
                self.enter(LicenseState::Deactivating);
                license.request_deactivation(env, events);
                GateStep::Wait
            }
            state => {
                tracing::warn!(?state, "license gate already started");
                GateStep::Ignored
            }
        }
    }

    /// Feed one event to the gate.
    pub fn handle(&mut self, event: &ToolEvent) -> GateStep {
        use LicenseState as S;

        let (next, step) = match (self.state, event) {
            (S::Validating, ToolEvent::LicenseSuccess) => (S::Success, GateStep::RunCommand),
            (S::Validating, ToolEvent::LicenseEulaRequired) => {
                (S::EulaRequired, activation_required())
            }
            (S::Validating, ToolEvent::LicenseActivationRequired) => {
                (S::ActivationRequired, activation_required())
            }
            (S::Validating, ToolEvent::LicenseError) => (S::Error, activation_required()),

            (S::Activating, ToolEvent::LicenseActivationSuccess) => (
                S::ActivationSuccess,
                GateStep::Exit(ExitRequest::success_with(ACTIVATION_SUCCESS_MESSAGE)),
            ),
            (S::Activating, ToolEvent::LicenseActivationError { message }) => (
                S::ActivationError,
                GateStep::Exit(ExitRequest::failure(message.clone())),
            ),

            (S::Deactivating, ToolEvent::LicenseDeactivationSuccess) => (
                S::DeactivationSuccess,
                GateStep::Exit(ExitRequest::success_with(DEACTIVATION_SUCCESS_MESSAGE)),
            ),
            (S::Deactivating, ToolEvent::LicenseDeactivationError { message }) => (
                S::DeactivationError,
                GateStep::Exit(ExitRequest::failure(message.clone())),
            ),

            (state, event) => {
                tracing::debug!(?state, event = event.name(), "license gate ignoring event");
                return GateStep::Ignored;
            }
        };

        self.enter(next);
        step
    }

    fn enter(&mut self, next: LicenseState) {
        tracing::debug!(from = ?self.state, to = ?next, "license gate transition");
        self.state = next;
    }
}

fn activation_required() -> GateStep {
    GateStep::Exit(ExitRequest::failure(ACTIVATION_REQUIRED_MESSAGE))
}
