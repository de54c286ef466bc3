//! Exit code constants for atomic-cli.
//!
//! The tool only distinguishes two outcomes:
//! - 0: Success (command finished, activation/deactivation succeeded)
//! - 1: Failure (any abort path: parse, environment, license, command, startup)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Any failure path. Mirrors the C `EXIT_FAILURE` value.
pub const FAILURE: i32 = 1;
