mod fuse;
mod latest;
mod verify;

use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rows rendered by `--format table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub struct CommandResult {
    pub command: &'static str,
    pub data: Value,
    pub warnings: Vec<String>,
    /// Items the command could not complete (skipped instruments, digest
    /// mismatches). Non-zero turns into exit code 3.
    pub failures: usize,
    pub table: Option<Table>,
}

impl CommandResult {
    pub fn ok(command: &'static str, data: Value) -> Self {
        Self {
            command,
            data,
            warnings: Vec::new(),
            failures: 0,
            table: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }
}

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Fuse(args) => fuse::run(args),
        Command::Latest(args) => latest::run(args),
        Command::Verify(args) => verify::run(args),
    }
}
