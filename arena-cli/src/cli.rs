//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "agent-arena")]
#[command(about = "Run one task across agent frameworks and models, then compare the results")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Extra configuration file, layered over config/default and config/local
    #[arg(short, long, global = true, env = "AGENT_ARENA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "format", global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a task on every framework × model combination
    Run(RunArgs),

    /// List the built-in frameworks and priced models
    Catalog,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Task text given to every combination
    #[arg(short, long)]
    pub task: String,

    /// Framework identifier (repeatable)
    #[arg(short, long = "framework", required = true, num_args = 1..)]
    pub frameworks: Vec<String>,

    /// Model identifier (repeatable)
    #[arg(short, long = "model", required = true, num_args = 1..)]
    pub models: Vec<String>,

    /// Show a progress bar while combinations settle
    #[arg(long)]
    pub progress: bool,

    /// Print each combination's output and steps after the table
    #[arg(long)]
    pub details: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_repeated_selections() {
        let cli = Cli::try_parse_from([
            "agent-arena",
            "run",
            "--task",
            "Summarize AI agents",
            "--framework",
            "langgraph",
            "--framework",
            "crewai",
            "--model",
            "gpt-41",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.task, "Summarize AI agents");
        assert_eq!(args.frameworks, vec!["langgraph", "crewai"]);
        assert_eq!(args.models, vec!["gpt-41"]);
        assert!(!args.progress);
    }

    #[test]
    fn test_run_requires_selections() {
        assert!(Cli::try_parse_from(["agent-arena", "run", "--task", "x"]).is_err());
    }

    #[test]
    fn test_parse_catalog_with_json_logs() {
        let cli = Cli::try_parse_from(["agent-arena", "catalog", "--log-format", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
