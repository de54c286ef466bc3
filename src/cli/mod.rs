//! Argument interpretation for atomic-cli.
//!
//! Two layers read the raw argument list:
//! - orchestrator flags (`-toolbootstrap`, `-loglevel <n>`), see [`flags`]
//! - the command grammar, a clap derive tree behind the [`CommandParser`] trait
//!
//! The grammar always receives the full argument list, orchestrator flags
//! included, and is expected to tolerate them.

pub mod flags;
pub mod parameters;

use crate::commands::{
    ActivateCommand, BuildCommand, Command, DeactivateCommand, InfoCommand, PrintCommand,
    VersionCommand,
};
use crate::environment::ToolEnvironment;
use crate::error::{Result, ToolError};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use parameters::{EngineParameters, ParamValue, RESOURCE_PATHS, RESOURCE_PREFIX_PATHS};
use std::path::PathBuf;

/// Message used when the parser fails without explaining why.
pub const NO_COMMAND_MESSAGE: &str = "No command found";

/// Resource path injected for project commands in development builds.
pub const CORE_DATA_RESOURCE_PATH: &str = "CoreData";

/// Command-line front-end for the Atomic tool chain.
///
/// Orchestrator flags use a single dash and may appear anywhere:
/// -toolbootstrap (bootstrap mode), -loglevel <0-4> (host log level).
#[derive(Parser, Debug)]
#[command(name = "atomic-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Build a project for a platform.
    ///
    /// Requires a valid license. Creates `<project>/Build` if missing.
    Build(BuildArgs),

    /// Show the resolved project, resource and build locations.
    Info(ProjectArgs),

    /// Activate this machine with a product key.
    Activate(ActivateArgs),

    /// Release this machine's activation.
    Deactivate,

    /// Print the tool version.
    Version,
}

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Project directory.
    pub project: PathBuf,

    /// Target platform.
    #[arg(short, long, default_value_t = std::env::consts::OS.to_string())]
    pub platform: String,
}

/// Arguments for commands that only take a project.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project directory.
    pub project: PathBuf,
}

/// Arguments for the `activate` command.
#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// Product key, `XXXX-XXXX-XXXX-XXXX`.
    pub key: String,
}

impl CliCommand {
    /// Turn the parsed grammar node into a runnable command.
    pub fn into_command(self) -> Box<dyn Command> {
        match self {
            CliCommand::Build(args) => Box::new(BuildCommand::new(args.project, args.platform)),
            CliCommand::Info(args) => Box::new(InfoCommand::new(args.project)),
            CliCommand::Activate(args) => Box::new(ActivateCommand::new(args.key)),
            CliCommand::Deactivate => Box::new(DeactivateCommand),
            CliCommand::Version => Box::new(VersionCommand),
        }
    }
}

/// Parser failure. An empty message means the parser had nothing to add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Selects the command for an argument list.
pub trait CommandParser {
    fn parse(&self, arguments: &[String]) -> std::result::Result<Box<dyn Command>, ParseFailure>;
}

/// [`CommandParser`] backed by the clap grammar above.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClapCommandParser;

impl CommandParser for ClapCommandParser {
    fn parse(&self, arguments: &[String]) -> std::result::Result<Box<dyn Command>, ParseFailure> {
        let tolerated = flags::strip_orchestrator_flags(arguments);
        if tolerated.is_empty() {
            return Err(ParseFailure::default());
        }

        let argv = std::iter::once("atomic-cli".to_string()).chain(tolerated);
        match Cli::try_parse_from(argv) {
            Ok(cli) => Ok(cli.command.into_command()),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    Ok(Box::new(PrintCommand::new(err.render().to_string())))
                }
                _ => Err(ParseFailure::new(err.render().to_string().trim_end())),
            },
        }
    }
}

/// Result of interpreting the argument list.
pub struct Interpretation {
    pub parameters: EngineParameters,
    pub command: Box<dyn Command>,
}

/// Build the configuration map and select the command.
///
/// `dev_build` enables the source-tree resource paths for commands that load
/// a project.
pub fn interpret(
    arguments: &[String],
    parser: &dyn CommandParser,
    env: &mut ToolEnvironment,
    dev_build: bool,
) -> Result<Interpretation> {
    let mut parameters = EngineParameters::tool_defaults(env.config().log_level);
    parameters.set_log_format(env.config().log_format);

    let flags = flags::scan_flags(arguments)?;
    if flags.bootstrap {
        env.set_bootstrapping();
    }
    if let Some(level) = flags.log_level {
        parameters.set_log_level(level);
    }

    let command = parser.parse(arguments).map_err(|failure| {
        if failure.message.is_empty() {
            ToolError::Parse(NO_COMMAND_MESSAGE.to_string())
        } else {
            ToolError::Parse(failure.message)
        }
    })?;
    tracing::debug!(command = command.name(), "command selected");

    // The tool may run outside the source tree, so no default resources.
    parameters.set(RESOURCE_PATHS, ParamValue::String(String::new()));

    if command.requires_project_load()
        && dev_build
        && let Some(prefix) = env.resource_prefix_dir()
    {
        parameters.set(RESOURCE_PREFIX_PATHS, ParamValue::Path(prefix));
        parameters.set(
            RESOURCE_PATHS,
            ParamValue::String(CORE_DATA_RESOURCE_PATH.to_string()),
        );
    }

    Ok(Interpretation {
        parameters,
        command,
    })
}
