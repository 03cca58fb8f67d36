//! CLI execution context

use anyhow::{Context as _, Result};
use arena_core::ArenaConfig;
use arena_providers::AdapterRegistry;

use crate::cli::Cli;
use crate::config;
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// Validated arena configuration
    pub config: ArenaConfig,

    /// Output format
    pub output_format: OutputFormat,

    /// Output writer
    pub output: OutputWriter,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = config::load(cli.config.as_deref())?;
        let output = OutputWriter::new(cli.output, cli.no_color);

        Ok(Self {
            config,
            output_format: cli.output,
            output,
        })
    }

    /// Build the adapter registry from the loaded configuration
    pub fn create_registry(&self) -> Result<AdapterRegistry> {
        AdapterRegistry::from_config(&self.config).context("Failed to build provider adapters")
    }
}
