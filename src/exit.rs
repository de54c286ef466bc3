//! Exit controller and startup diagnostics.
//!
//! The exit controller is the only place that decides the process outcome.
//! The first terminal request wins; anything after it is ignored, so an
//! invocation can never report success and then an error (or the reverse).

use crate::engine::Engine;
use crate::exit_codes;

/// Shown when a failure carries no message and nothing was buffered.
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "Application has been terminated due to unexpected error.";

/// Terminal decision produced by a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitRequest {
    /// Normal completion, optionally printing a notice to stdout.
    Success { notice: Option<String> },
    /// Abort. An empty message falls back to the startup error buffer.
    Failure { message: String },
}

impl ExitRequest {
    pub fn success() -> Self {
        Self::Success { notice: None }
    }

    pub fn success_with(notice: impl Into<String>) -> Self {
        Self::Success {
            notice: Some(notice.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }
}

/// Error text collected before the event loop is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupErrors {
    lines: Vec<String>,
}

impl StartupErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.lines.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Buffered text, one entry per line.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Final result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: i32,
    /// Diagnostic for stderr, if any.
    pub message: Option<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == exit_codes::SUCCESS
    }

    /// Print the diagnostic, if any, to stderr.
    pub fn report(&self) {
        if let Some(message) = &self.message {
            eprintln!("\n{}\n", message);
        }
    }
}

/// Single authority for the process exit code.
#[derive(Debug)]
pub struct ExitController {
    outcome: Option<Outcome>,
    startup_errors: StartupErrors,
    surface_fallback: bool,
    /// Whether `error!` output reaches stderr.
    error_log_active: bool,
}

impl Default for ExitController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitController {
    /// Controller using the platform's fallback policy.
    ///
    /// Windows always surfaces the fallback message. Elsewhere it is left to
    /// the error log on stderr once [`Self::set_error_log_active`] says that
    /// log is live; until then it is surfaced too.
    pub fn new() -> Self {
        Self::with_fallback(cfg!(windows))
    }

    pub fn with_fallback(surface_fallback: bool) -> Self {
        Self {
            outcome: None,
            startup_errors: StartupErrors::default(),
            surface_fallback,
            error_log_active: false,
        }
    }

    /// Record whether errors are written to the log on stderr.
    pub fn set_error_log_active(&mut self, active: bool) {
        self.error_log_active = active;
    }

    pub fn startup_errors_mut(&mut self) -> &mut StartupErrors {
        &mut self.startup_errors
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }

    /// Apply a terminal request. Returns `false` if one was already applied.
    pub fn terminate(&mut self, engine: &mut dyn Engine, request: ExitRequest) -> bool {
        match request {
            ExitRequest::Success { .. } => self.success_exit(engine),
            ExitRequest::Failure { message } => self.error_exit(engine, &message),
        }
    }

    /// Shut down the engine and exit with success.
    pub fn success_exit(&mut self, engine: &mut dyn Engine) -> bool {
        if self.already_terminated("success") {
            return false;
        }
        engine.exit();
        tracing::debug!("exiting with success");
        self.outcome = Some(Outcome {
            exit_code: exit_codes::SUCCESS,
            message: None,
        });
        true
    }

    /// Shut down the engine and exit with failure.
    ///
    /// The engine is stopped before the exit code is set so any open session
    /// closes first.
    pub fn error_exit(&mut self, engine: &mut dyn Engine, message: &str) -> bool {
        if self.already_terminated("error") {
            return false;
        }
        engine.exit();

        let message = if message.is_empty() {
            let fallback = if self.startup_errors.is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                self.startup_errors.text()
            };
            tracing::error!("{}", fallback);
            (self.surface_fallback || !self.error_log_active).then_some(fallback)
        } else {
            tracing::debug!(message, "exiting with failure");
            Some(message.to_string())
        };

        self.outcome = Some(Outcome {
            exit_code: exit_codes::FAILURE,
            message,
        });
        true
    }

    /// The decided outcome; a controller that never terminated reports an
    /// unexpected error.
    pub fn into_outcome(mut self, engine: &mut dyn Engine) -> Outcome {
        if self.outcome.is_none() {
            self.error_exit(engine, "");
        }
        self.outcome.unwrap_or(Outcome {
            exit_code: exit_codes::FAILURE,
            message: None,
        })
    }

    fn already_terminated(&self, kind: &str) -> bool {
        if self.outcome.is_some() {
            tracing::debug!(kind, "exit already decided, ignoring");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;

    #[test]
    fn success_exit_stops_engine_with_zero() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::new();

        assert!(exit.success_exit(&mut engine));
        assert!(engine.is_exiting());

        let outcome = exit.into_outcome(&mut engine);
        assert!(outcome.is_success());
        assert_eq!(outcome.message, None);
    }

    #[test]
    fn error_exit_keeps_message() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::new();

        exit.error_exit(&mut engine, "No command found");

        assert!(engine.is_exiting());
        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(outcome.exit_code, exit_codes::FAILURE);
        assert_eq!(outcome.message.as_deref(), Some("No command found"));
    }

    #[test]
    fn first_terminal_request_wins() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::new();

        assert!(exit.terminate(&mut engine, ExitRequest::success()));
        assert!(!exit.terminate(&mut engine, ExitRequest::failure("late error")));

        assert!(exit.into_outcome(&mut engine).is_success());
    }

    #[test]
    fn error_then_success_stays_failed() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::new();

        exit.error_exit(&mut engine, "boom");
        assert!(!exit.success_exit(&mut engine));

        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(outcome.exit_code, exit_codes::FAILURE);
        assert_eq!(outcome.message.as_deref(), Some("boom"));
    }

    #[test]
    fn empty_message_falls_back_to_startup_errors() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::with_fallback(true);
        exit.startup_errors_mut().push("config unreadable");
        exit.startup_errors_mut().push("   ");
        exit.startup_errors_mut().push("data dir missing");

        exit.error_exit(&mut engine, "");

        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(
            outcome.message.as_deref(),
            Some("config unreadable\ndata dir missing")
        );
    }

    #[test]
    fn empty_message_without_buffer_uses_generic_text() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::with_fallback(true);

        exit.error_exit(&mut engine, "");

        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(outcome.message.as_deref(), Some(UNEXPECTED_ERROR_MESSAGE));
    }

    #[test]
    fn fallback_is_suppressed_when_platform_double_reports() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::with_fallback(false);
        exit.set_error_log_active(true);
        exit.startup_errors_mut().push("already logged");

        exit.error_exit(&mut engine, "");

        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(outcome.exit_code, exit_codes::FAILURE);
        assert_eq!(outcome.message, None);
    }

    #[test]
    fn fallback_is_surfaced_while_error_log_is_inactive() {
        let mut engine = HeadlessEngine::new();
        let mut exit = ExitController::with_fallback(false);
        exit.startup_errors_mut().push("engine failed to start");

        exit.error_exit(&mut engine, "");

        let outcome = exit.into_outcome(&mut engine);
        assert_eq!(outcome.exit_code, exit_codes::FAILURE);
        assert_eq!(outcome.message.as_deref(), Some("engine failed to start"));
    }

    #[test]
    fn undecided_controller_reports_failure() {
        let mut engine = HeadlessEngine::new();
        let outcome = ExitController::with_fallback(true).into_outcome(&mut engine);

        assert_eq!(outcome.exit_code, exit_codes::FAILURE);
        assert!(engine.is_exiting());
    }
}
