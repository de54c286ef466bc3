//! Entry point for the `atomic-cli` binary.
//!
//! Collects the arguments, runs the orchestrator with the local subsystems,
//! prints the diagnostic (if any) and exits with the decided code.

use atomic_cli::context::ToolContext;
use atomic_cli::orchestrator::AtomicTool;
use std::process::ExitCode;

fn main() -> ExitCode {
    let arguments: Vec<String> = std::env::args().skip(1).collect();

    let outcome = AtomicTool::new(ToolContext::local(), arguments).run();
    outcome.report();

    ExitCode::from(outcome.exit_code as u8)
}
