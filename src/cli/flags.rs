//! Orchestrator-level flags.
//!
//! These are read from the raw argument list before command selection. Flags
//! use a single leading `-` and are matched case-insensitively; anything else
//! is left for the command grammar.

use crate::error::{Result, ToolError};
use crate::telemetry::LogLevel;

/// Enables bootstrap mode for the tool environment. Takes no value.
pub const TOOL_BOOTSTRAP: &str = "toolbootstrap";

/// Sets host log verbosity. Consumes the following token.
pub const LOG_LEVEL: &str = "loglevel";

/// Orchestrator flags found in the argument list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorFlags {
    pub bootstrap: bool,
    pub log_level: Option<LogLevel>,
}

/// Quick check used before the tool environment exists.
pub fn has_bootstrap_flag(arguments: &[String]) -> bool {
    arguments
        .iter()
        .any(|arg| flag_name(arg).as_deref() == Some(TOOL_BOOTSTRAP))
}

/// Scan the argument list for orchestrator flags.
///
/// A `-loglevel` with no following token, or with a value that is not one of
/// the host's integer levels, is a parse failure.
pub fn scan_flags(arguments: &[String]) -> Result<OrchestratorFlags> {
    let mut flags = OrchestratorFlags::default();
    let mut i = 0;

    while i < arguments.len() {
        match flag_name(&arguments[i]).as_deref() {
            Some(TOOL_BOOTSTRAP) => flags.bootstrap = true,
            Some(LOG_LEVEL) => {
                let value = arguments.get(i + 1).map(String::as_str).unwrap_or("");
                flags.log_level = Some(parse_log_level(value)?);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    Ok(flags)
}

/// Drop orchestrator flags (and the `-loglevel` value) from an argument list.
///
/// Used by the command parser so the command grammar tolerates them.
pub fn strip_orchestrator_flags(arguments: &[String]) -> Vec<String> {
    let mut remaining = Vec::with_capacity(arguments.len());
    let mut iter = arguments.iter();

    while let Some(arg) = iter.next() {
        match flag_name(arg).as_deref() {
            Some(TOOL_BOOTSTRAP) => {}
            Some(LOG_LEVEL) => {
                iter.next();
            }
            _ => remaining.push(arg.clone()),
        }
    }

    remaining
}

/// Lower-cased flag name for `-name` tokens; `None` for everything else.
///
/// `--name` yields `-name`, which never matches an orchestrator flag.
fn flag_name(arg: &str) -> Option<String> {
    if arg.len() > 1 {
        arg.strip_prefix('-').map(str::to_lowercase)
    } else {
        None
    }
}

fn parse_log_level(value: &str) -> Result<LogLevel> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(LogLevel::from_int)
        .ok_or_else(|| ToolError::Parse(format!("Invalid log level: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_flags_yields_defaults() {
        let flags = scan_flags(&args(&["build", "myproj"])).unwrap();
        assert_eq!(flags, OrchestratorFlags::default());
    }

    #[test]
    fn bootstrap_flag_is_case_insensitive() {
        let list = args(&["-ToolBootstrap", "build"]);
        assert!(has_bootstrap_flag(&list));
        assert!(scan_flags(&list).unwrap().bootstrap);
    }

    #[test]
    fn double_dash_is_not_an_orchestrator_flag() {
        let list = args(&["--toolbootstrap"]);
        assert!(!has_bootstrap_flag(&list));
        assert!(!scan_flags(&list).unwrap().bootstrap);
    }

    #[test]
    fn loglevel_consumes_its_value() {
        let flags = scan_flags(&args(&["-loglevel", "3", "build"])).unwrap();
        assert_eq!(flags.log_level, Some(LogLevel::Error));
    }

    #[test]
    fn loglevel_value_is_not_rescanned_as_flag() {
        let flags = scan_flags(&args(&["-loglevel", "0", "-toolbootstrap"])).unwrap();
        assert_eq!(flags.log_level, Some(LogLevel::Debug));
        assert!(flags.bootstrap);
    }

    #[test]
    fn last_loglevel_wins() {
        let flags = scan_flags(&args(&["-loglevel", "0", "-loglevel", "2"])).unwrap();
        assert_eq!(flags.log_level, Some(LogLevel::Warning));
    }

    #[test]
    fn loglevel_without_value_is_rejected() {
        let err = scan_flags(&args(&["build", "-loglevel"])).unwrap_err();
        assert_eq!(err, ToolError::Parse("Invalid log level: ".to_string()));
    }

    #[test]
    fn loglevel_out_of_range_is_rejected() {
        let err = scan_flags(&args(&["-loglevel", "9"])).unwrap_err();
        assert!(err.to_string().contains("Invalid log level: 9"));
    }

    #[test]
    fn unknown_single_dash_flags_are_left_alone() {
        let list = args(&["-platform", "web", "build"]);
        assert_eq!(scan_flags(&list).unwrap(), OrchestratorFlags::default());
        assert_eq!(strip_orchestrator_flags(&list), list);
    }

    #[test]
    fn strip_removes_flags_and_loglevel_value() {
        let list = args(&["-toolbootstrap", "build", "-loglevel", "1", "myproj"]);
        assert_eq!(strip_orchestrator_flags(&list), args(&["build", "myproj"]));
    }

    #[test]
    fn lone_dash_is_not_a_flag() {
        assert!(!has_bootstrap_flag(&args(&["-"])));
        assert_eq!(strip_orchestrator_flags(&args(&["-"])), args(&["-"]));
    }
}
