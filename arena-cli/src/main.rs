//! # Agent Arena CLI
//!
//! Runs one task across a set of agent frameworks and models, then prints the
//! per-combination results with batch highlights.

mod cli;
mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, LogFormat};
use context::Context;

const DEFAULT_LOG_FILTER: &str = "agent_arena=info,arena_providers=info,arena_workflow=info";
const VERBOSE_LOG_FILTER: &str = "agent_arena=debug,arena_providers=debug,arena_workflow=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let ctx = Context::new(&cli)?;
    tracing::debug!(
        frameworks_with_credentials = ctx.config.credentials.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Run(args) => commands::run::execute(&ctx, args).await,
        Commands::Catalog => commands::catalog::execute(&ctx),
    }
}

fn init_tracing(cli: &Cli) {
    let fallback = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(!cli.no_color),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
