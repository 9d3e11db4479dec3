use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// countrygeo - Country bounding boxes and centers
#[derive(Parser, Debug)]
#[command(name = "countrygeo")]
#[command(about = "Maintain the table of country bounding boxes and center points", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Amount of output: 0 errors only, 1 summary, 2 per country, 3 full detail
    #[arg(long, short = 'v', global = true, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: u8,

    /// Configuration file (defaults to ./countrygeo.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub table: TableArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the geodata table lives
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Geodata table file
    #[arg(long, global = true, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Table layout (json or embedded)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub table_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh geodata from the geocoding provider
    Update(UpdateArgs),

    /// Show stored geodata
    Show(ShowArgs),

    /// Show the padded map extent of a country
    Extent(ExtentArgs),

    /// Show the effective configuration and where each value comes from
    Config,

    /// Run health checks and diagnostics
    Doctor,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Country codes to update; omit or use ALL for every country
    #[arg(value_name = "CODE")]
    pub codes: Vec<String>,

    /// Compute the update without writing the table
    #[arg(long)]
    pub dry_run: bool,

    /// OpenCage API key
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Geocoding endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Language of the names returned by the provider
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Country codes to show (all stored countries when omitted)
    #[arg(value_name = "CODE")]
    pub codes: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ExtentArgs {
    /// Country code
    pub code: String,
}
