//! Error types for atomic-cli.
//!
//! Every failure of an invocation is fatal, so each variant carries the exact
//! user-facing message that the exit controller surfaces. License failures
//! never become errors; the license gate turns them into exit requests.

use thiserror::Error;

/// Main error type for atomic-cli operations.
///
/// Variants follow the failure classes of the orchestrator. The display text is
/// the message printed on exit, without any prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No command could be selected from the arguments.
    #[error("{0}")]
    Parse(String),

    /// Project load or build directory preparation failed.
    #[error("{0}")]
    Environment(String),

    /// The running command reported an error.
    #[error("{0}")]
    Command(String),

    /// Tool environment or host startup failed.
    #[error("{0}")]
    Startup(String),

    /// The tool configuration file could not be read or is invalid.
    #[error("{0}")]
    Config(String),
}

impl ToolError {
    /// The user-facing message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            ToolError::Parse(m)
            | ToolError::Environment(m)
            | ToolError::Command(m)
            | ToolError::Startup(m)
            | ToolError::Config(m) => m,
        }
    }
}

/// Result type alias for atomic-cli operations.
pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_class_carries_its_message() {
        let errors = [
            ToolError::Parse("no command".to_string()),
            ToolError::Environment("no project".to_string()),
            ToolError::Command("boom".to_string()),
            ToolError::Startup("no env".to_string()),
            ToolError::Config("bad yaml".to_string()),
        ];
        for err in errors {
            assert_eq!(err.message(), err.to_string());
            assert!(!err.message().is_empty());
        }
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = ToolError::Environment("Failed to create build folder: /p/Build".to_string());
        assert_eq!(err.to_string(), "Failed to create build folder: /p/Build");
        assert_eq!(err.message(), "Failed to create build folder: /p/Build");
    }
}
