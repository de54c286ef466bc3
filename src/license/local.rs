//! Offline license subsystem.
//!
//! The activation is a JSON record in the license directory:
//!
//! ```json
//! {
//!   "key": "ABCD-1234-EFGH-5678",
//!   "eula_accepted": true,
//!   "activated_at": "2026-01-01T00:00:00Z",
//!   "machine": "build-host"
//! }
//! ```
//!
//! Every operation reports its result by posting a license event. Nothing is
//! returned to the caller.

use super::LicenseSystem;
use crate::environment::ToolEnvironment;
use crate::events::{EventSender, ToolEvent};
use crate::fs::atomic_write_file;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File name of the activation record inside the license directory.
pub const LICENSE_FILE_NAME: &str = "license.json";

/// Stored activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub key: String,
    pub eula_accepted: bool,
    pub activated_at: DateTime<Utc>,
    /// Host the activation was made on.
    pub machine: String,
}

impl LicenseRecord {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            eula_accepted: true,
            activated_at: Utc::now(),
            machine: machine_name(),
        }
    }
}

/// Four groups of four upper-case alphanumerics.
static PRODUCT_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{4}(-[A-Z0-9]{4}){3}$").expect("Invalid product key regex")
});

pub fn is_valid_key(key: &str) -> bool {
    PRODUCT_KEY_REGEX.is_match(key)
}

fn machine_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// License subsystem backed by [`LICENSE_FILE_NAME`] in the license dir.
#[derive(Debug, Default)]
pub struct LocalLicenseSystem {
    agreement_confirmed: bool,
}

impl LocalLicenseSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_path(env: &ToolEnvironment) -> PathBuf {
        env.license_dir().join(LICENSE_FILE_NAME)
    }

    fn read_record(path: &Path) -> Result<Option<LicenseRecord>, String> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("failed to read '{}': {}", path.display(), e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| format!("failed to parse '{}': {}", path.display(), e))
    }

    fn validate(env: &ToolEnvironment) -> ToolEvent {
        let path = Self::record_path(env);
        let record = match Self::read_record(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no license record");
                return ToolEvent::LicenseActivationRequired;
            }
            Err(message) => {
                tracing::warn!("{}", message);
                return ToolEvent::LicenseError;
            }
        };

        if !is_valid_key(&record.key) {
            tracing::warn!(path = %path.display(), "license record holds a malformed key");
            return ToolEvent::LicenseError;
        }
        if !record.eula_accepted {
            return ToolEvent::LicenseEulaRequired;
        }
        let machine = machine_name();
        if record.machine != machine {
            tracing::debug!(
                activated_on = %record.machine,
                machine = %machine,
                "license was activated on another machine"
            );
            return ToolEvent::LicenseActivationRequired;
        }

        ToolEvent::LicenseSuccess
    }

    fn activate(&self, env: &ToolEnvironment, key: &str) -> Result<PathBuf, String> {
        if !self.agreement_confirmed {
            return Err("The license agreement has not been accepted".to_string());
        }
        if !is_valid_key(key) {
            return Err(format!(
                "Invalid product key '{}', expected XXXX-XXXX-XXXX-XXXX",
                key
            ));
        }

        let dir = env.license_dir();
        fs::create_dir_all(dir).map_err(|e| {
            format!("failed to create license directory '{}': {}", dir.display(), e)
        })?;

        let path = Self::record_path(env);
        let json = serde_json::to_string_pretty(&LicenseRecord::new(key))
            .map_err(|e| format!("failed to serialize license record: {}", e))?;
        atomic_write_file(&path, &json).map_err(|e| e.to_string())?;
        Ok(path)
    }
}

impl LicenseSystem for LocalLicenseSystem {
    fn initialize(&mut self, env: &ToolEnvironment, events: &EventSender) {
        let event = Self::validate(env);
        tracing::debug!(event = event.name(), "license validated");
        events.post(event);
    }

    fn license_agreement_confirmed(&mut self) {
        self.agreement_confirmed = true;
    }

    fn request_activation(&mut self, env: &ToolEnvironment, key: &str, events: &EventSender) {
        match self.activate(env, key) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "license activated");
                events.post(ToolEvent::LicenseActivationSuccess);
            }
            Err(message) => {
                tracing::error!("{}", message);
                events.post(ToolEvent::LicenseActivationError { message });
            }
        }
    }

    fn request_deactivation(&mut self, env: &ToolEnvironment, events: &EventSender) {
        let path = Self::record_path(env);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "license deactivated");
                events.post(ToolEvent::LicenseDeactivationSuccess);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                events.post(ToolEvent::LicenseDeactivationError {
                    message: "This machine is not activated".to_string(),
                });
            }
            Err(e) => {
                let message = format!("failed to remove '{}': {}", path.display(), e);
                tracing::error!("{}", message);
                events.post(ToolEvent::LicenseDeactivationError { message });
            }
        }
    }
}
