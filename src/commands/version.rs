//! Commands that only print text: `version`, and help/usage output.

use super::{Command, CommandContext};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct VersionCommand;

impl Command for VersionCommand {
    fn name(&self) -> &str {
        "version"
    }

    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.println(&format!("atomic-cli {}", env!("CARGO_PKG_VERSION")))?;
        ctx.finished();
        Ok(())
    }
}

/// Prints pre-rendered text, e.g. `--help` output from the grammar.
#[derive(Debug, Clone)]
pub struct PrintCommand {
    text: String,
}

impl PrintCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Command for PrintCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn run(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.println(self.text.trim_end())?;
        ctx.finished();
        Ok(())
    }
}
