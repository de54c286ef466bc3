//! atomic-cli: command-line front-end for the Atomic tool chain.
//!
//! The binary is a thin wrapper around [`orchestrator::AtomicTool`], which
//! selects one command from the arguments, prepares its environment, gates it
//! behind the license subsystem when required, runs it, and reports a single
//! exit code.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod environment;
pub mod error;
pub mod events;
pub mod exit;
pub mod exit_codes;
pub mod fs;
pub mod license;
pub mod orchestrator;
pub mod project;
pub mod subsystems;
pub mod telemetry;

#[cfg(test)]
mod test_support;
