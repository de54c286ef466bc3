//! License gating.
//!
//! Commands that declare a license-validation requirement only run after the
//! license subsystem reports success. Activation and deactivation are separate
//! entry points that replace normal command execution entirely.
//!
//! - [`gate`]: the state machine deciding what happens on each license event
//! - [`local`]: offline license subsystem backed by a record on disk

pub mod gate;
pub mod local;

use crate::environment::ToolEnvironment;
use crate::events::EventSender;

pub use gate::{GateStep, LicenseGate, LicenseState};
pub use local::LocalLicenseSystem;

/// Message for every validation failure (EULA, activation, error).
pub const ACTIVATION_REQUIRED_MESSAGE: &str = "Activation Required: Please run: atomic-cli activate";

/// Printed after a successful activation.
pub const ACTIVATION_SUCCESS_MESSAGE: &str = "Activation successful, thank you!";

/// Printed after a successful deactivation.
pub const DEACTIVATION_SUCCESS_MESSAGE: &str = "Deactivation successful";

/// Activation or deactivation requested by the selected command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseRequest {
    Activate { key: String },
    Deactivate,
}

/// License subsystem.
///
/// Every operation completes by posting a license event; none of them report
/// results through return values.
pub trait LicenseSystem {
    /// Validate the stored license.
    ///
    /// Posts one of `LicenseSuccess`, `LicenseEulaRequired`,
    /// `LicenseActivationRequired` or `LicenseError`.
    fn initialize(&mut self, env: &ToolEnvironment, events: &EventSender);

    /// Record that the user accepted the license agreement.
    fn license_agreement_confirmed(&mut self);

    /// Activate with `key`. Posts `LicenseActivationSuccess` or
    /// `LicenseActivationError`.
    fn request_activation(&mut self, env: &ToolEnvironment, key: &str, events: &EventSender);

    /// Release this machine's activation. Posts `LicenseDeactivationSuccess`
    /// or `LicenseDeactivationError`.
    fn request_deactivation(&mut self, env: &ToolEnvironment, events: &EventSender);
}
