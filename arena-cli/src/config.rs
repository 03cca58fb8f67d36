//! Configuration loading

use anyhow::{Context as _, Result};
use arena_core::ArenaConfig;
use config::{Config as ConfigLoader, Environment, File};
use std::path::Path;

/// Environment variable prefix, e.g. `AGENT_ARENA__CREDENTIALS__LANGGRAPH`.
pub const ENV_PREFIX: &str = "AGENT_ARENA";

/// Load and validate the arena configuration.
///
/// Sources, later ones winning: `config/default.*`, `config/local.*`, the
/// optional explicit file, then `AGENT_ARENA__*` environment variables.
pub fn load(explicit: Option<&Path>) -> Result<ArenaConfig> {
    let mut builder = ConfigLoader::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name("config/local").required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config: ArenaConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    config.check().context("Invalid configuration")?;

    Ok(config)
}
