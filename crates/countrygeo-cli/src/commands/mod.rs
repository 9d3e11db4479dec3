//! Command implementations

mod config;
mod doctor;
mod extent;
mod show;
mod update;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
///
/// `Ok(false)` means the command ran but found problems, such as countries
/// that failed to update or doctor checks that did not pass.
pub fn execute(cli: Cli) -> Result<bool> {
    let output = OutputWriter::new(cli.json, cli.verbosity);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Update(args) => update::execute(args, config_path, &cli.table, &output),
        Commands::Show(args) => show::execute(args, config_path, &cli.table, &output),
        Commands::Extent(args) => extent::execute(args, config_path, &cli.table, &output),
        Commands::Config => config::execute(config_path, &cli.table, &output),
        Commands::Doctor => doctor::execute(config_path, &cli.table, &output),
    }
}
