//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use countrygeo_core::config::{parse_table_format, CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::TableArgs;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "countrygeo.toml";

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(config_path: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let config = match config_path {
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => LayeredConfig::with_defaults()
            .load_from_optional_file(DEFAULT_CONFIG_FILE)
            .context("Failed to load configuration file")?,
    };

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}

/// Overrides carried by the global table flags
pub fn table_overrides(args: &TableArgs) -> Result<CliConfigOverrides> {
    let table_format = args.table_format.as_deref().map(parse_table_format).transpose()?;
    Ok(CliConfigOverrides {
        table_path: args.table.clone(),
        table_format,
        ..Default::default()
    })
}

/// Resolve the config file that applies, if any
pub fn config_file_in_use(config_path: Option<&Path>) -> Option<PathBuf> {
    match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}
