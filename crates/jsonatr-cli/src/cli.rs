//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Jsonatr - declarative JSON-to-JSON transformation
///
/// Runs transformation specs against JSON documents, checks spec
/// composition, and evaluates single expressions for debugging.
#[derive(Parser, Debug)]
#[command(
    name = "jsonatr",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JSONATR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a transformation spec and print its output
    Transform(TransformArgs),

    /// Compose a spec and list the transformers it defines
    Check(CheckArgs),

    /// Evaluate a single expression against a document
    Eval(EvalArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Path to the transformation spec (JSON or YAML)
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,

    /// Root document ('-' reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Bind a document as a named variable
    #[arg(long = "var", value_name = "NAME=FILE", value_parser = parse_binding)]
    pub vars: Vec<(String, PathBuf)>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Collision policy for names defined by more than one spec
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the transformation spec (JSON or YAML)
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,

    /// Collision policy for names defined by more than one spec
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

/// Arguments for the eval command
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Expression such as '$.items | count'
    #[arg(value_name = "EXPR", allow_hyphen_values = true)]
    pub expression: String,

    /// Root document ('-' reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Collision policy as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Later definitions replace earlier ones
    ImporterWins,
    /// Conflicting definitions are an error
    Reject,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stderr().is_terminal()
    }
}

impl From<PolicyArg> for jsonatr_core::CollisionPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::ImporterWins => jsonatr_core::CollisionPolicy::ImporterWins,
            PolicyArg::Reject => jsonatr_core::CollisionPolicy::Reject,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Parse a `NAME=FILE` variable binding
fn parse_binding(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{}'", raw))?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid variable name '{}'", name));
    }
    if path.is_empty() {
        return Err(format!("missing file for variable '{}'", name));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["jsonatr", "-vv", "check", "spec.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["jsonatr", "--quiet", "check", "spec.json"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_transform_arguments() {
        let cli = Cli::parse_from([
            "jsonatr",
            "transform",
            "spec.yaml",
            "-i",
            "-",
            "--var",
            "states=trace.json",
            "--var",
            "config=cfg.json",
            "-o",
            "out.json",
            "--compact",
            "--policy",
            "reject",
        ]);

        let Commands::Transform(args) = cli.command else {
            panic!("expected transform command");
        };
        assert_eq!(args.spec, PathBuf::from("spec.yaml"));
        assert_eq!(args.input, Some(PathBuf::from("-")));
        assert_eq!(
            args.vars,
            vec![
                ("states".to_string(), PathBuf::from("trace.json")),
                ("config".to_string(), PathBuf::from("cfg.json")),
            ]
        );
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert!(args.compact);
        assert_eq!(args.policy, Some(PolicyArg::Reject));
    }

    #[test]
    fn test_parse_binding_rejects_malformed_values() {
        assert!(parse_binding("states").is_err());
        assert!(parse_binding("=file.json").is_err());
        assert!(parse_binding("bad-name=file.json").is_err());
        assert!(parse_binding("states=").is_err());
        assert_eq!(
            parse_binding("states=a=b.json"),
            Ok(("states".to_string(), PathBuf::from("a=b.json")))
        );
    }

    #[test]
    fn test_policy_conversion() {
        assert_eq!(
            jsonatr_core::CollisionPolicy::from(PolicyArg::ImporterWins),
            jsonatr_core::CollisionPolicy::ImporterWins
        );
        assert_eq!(
            jsonatr_core::CollisionPolicy::from(PolicyArg::Reject),
            jsonatr_core::CollisionPolicy::Reject
        );
    }
}
