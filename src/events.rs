//! Event dispatch for atomic-cli.
//!
//! Every completion signal in the tool (command finished, license validated,
//! activation failed, ...) is a [`ToolEvent`] value posted to a single
//! [`EventQueue`]. The orchestrator is the only consumer: it pulls one event at
//! a time and feeds it to its state machine, so handler ordering is decided by
//! the queue and never by subscription order.
//!
//! Producers hold an [`EventSender`]. Senders are cheap to clone and may be
//! moved to worker threads; the queue itself is drained on the orchestrator's
//! thread only. Once the queue is closed and every sender is gone,
//! [`EventQueue::next`] returns `None` instead of waiting forever.
//!
//! ```
//! use atomic_cli::events::{EventQueue, ToolEvent};
//!
//! let queue = EventQueue::new();
//! queue.sender().post(ToolEvent::CommandFinished);
//! assert_eq!(queue.next(), Some(ToolEvent::CommandFinished));
//! ```

use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Events that drive the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ToolEvent {
    /// The running command completed.
    CommandFinished,
    /// The running command failed.
    CommandError {
        /// Failure text; may be empty.
        message: String,
    },
    /// License validation succeeded.
    LicenseSuccess,
    /// License validation failed.
    LicenseError,
    /// The EULA has not been accepted yet.
    LicenseEulaRequired,
    /// No valid activation is stored.
    LicenseActivationRequired,
    /// Activation request succeeded.
    LicenseActivationSuccess,
    /// Activation request failed.
    LicenseActivationError {
        /// Failure text; may be empty.
        message: String,
    },
    /// Deactivation request succeeded.
    LicenseDeactivationSuccess,
    /// Deactivation request failed.
    LicenseDeactivationError {
        /// Failure text; may be empty.
        message: String,
    },
}

impl ToolEvent {
    /// Stable event name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ToolEvent::CommandFinished => "command_finished",
            ToolEvent::CommandError { .. } => "command_error",
            ToolEvent::LicenseSuccess => "license_success",
            ToolEvent::LicenseError => "license_error",
            ToolEvent::LicenseEulaRequired => "license_eula_required",
            ToolEvent::LicenseActivationRequired => "license_activation_required",
            ToolEvent::LicenseActivationSuccess => "license_activation_success",
            ToolEvent::LicenseActivationError { .. } => "license_activation_error",
            ToolEvent::LicenseDeactivationSuccess => "license_deactivation_success",
            ToolEvent::LicenseDeactivationError { .. } => "license_deactivation_error",
        }
    }

    /// Shorthand for a [`ToolEvent::CommandError`].
    pub fn command_error(message: impl Into<String>) -> Self {
        ToolEvent::CommandError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ToolEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Producer handle for the event queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: Sender<ToolEvent>,
}

impl EventSender {
    /// Post an event to the orchestrator.
    ///
    /// Events posted after the orchestrator has shut down are dropped.
    pub fn post(&self, event: ToolEvent) {
        let name = event.name();
        if self.inner.send(event).is_err() {
            tracing::debug!(event = name, "event queue closed, dropping event");
        } else {
            tracing::trace!(event = name, "event posted");
        }
    }
}

/// Single-consumer queue drained by the orchestrator.
#[derive(Debug)]
pub struct EventQueue {
    sender: Option<Sender<ToolEvent>>,
    receiver: Receiver<ToolEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: Some(sender),
            receiver,
        }
    }

    /// Hand out a producer handle.
    ///
    /// After [`EventQueue::close`] the handle is detached and its events are
    /// dropped.
    pub fn sender(&self) -> EventSender {
        let inner = match &self.sender {
            Some(sender) => sender.clone(),
            None => mpsc::channel().0,
        };
        EventSender { inner }
    }

    /// Stop handing out producers and release the queue's own sender.
    pub fn close(&mut self) {
        if self.sender.take().is_some() {
            tracing::trace!("event queue closed to new producers");
        }
    }

    /// Wait for the next event.
    ///
    /// Blocks until a producer posts. Returns `None` once the queue is closed,
    /// every outstanding sender has been dropped and nothing is left to read.
    pub fn next(&self) -> Option<ToolEvent> {
        self.receiver.recv().ok()
    }

    /// Take every event that is already queued without waiting.
    pub fn drain(&self) -> Vec<ToolEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
