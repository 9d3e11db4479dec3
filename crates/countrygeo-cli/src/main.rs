//! countrygeo CLI - Command-line interface
//!
//! Keeps the table of country bounding boxes and centers up to date.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();
    let json = cli.json;

    // The geocoding adapter drives its own runtime, so commands run synchronously
    match commands::execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let error = errors::from_anyhow(e);
            if json {
                eprintln!("{}", error.to_json());
            } else {
                error.display();
            }
            ExitCode::FAILURE
        }
    }
}
