//! Completions command handler
//!
//! Scripts are rendered from the clap definition, so every subcommand and
//! flag of `jsonatr` is offered, including `--var NAME=FILE` and `--policy`.

use crate::cli::{Cli, CompletionsArgs, Shell};
use crate::error::Result;
use crate::output::OutputWriter;
use clap::CommandFactory;
use tracing::{debug, instrument};

/// Handle the completions command
#[instrument(skip(output), fields(shell = ?args.shell))]
pub fn handle_completions(args: CompletionsArgs, output: &mut OutputWriter) -> Result<()> {
    let script = completion_script(args.shell);
    debug!(bytes = script.len(), "Generated completion script");
    output.write_all(&script)
}

/// Render the completion script for `shell`
fn completion_script(shell: Shell) -> Vec<u8> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    let mut script = Vec::new();
    clap_complete::generate(shell.to_clap_shell(), &mut command, name, &mut script);
    script
}
