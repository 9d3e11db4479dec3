use crate::cli::{ExtentArgs, TableArgs};
use crate::config_loader::{load_config, table_overrides};
use crate::errors::CliError;
use crate::output::OutputWriter;
use crate::output_types::{format_point, ExtentOutput};
use anyhow::Result;
use countrygeo_core::extent::{buffered_extent, BufferPolicy};
use countrygeo_core::models::known_country;
use countrygeo_store::{TableFile, TableLayout};
use std::path::Path;

pub fn execute(
    args: ExtentArgs,
    config_path: Option<&Path>,
    table_args: &TableArgs,
    output: &OutputWriter,
) -> Result<bool> {
    let code = known_country(&args.code)?;
    let config = load_config(config_path, table_overrides(table_args)?)?;
    let (_, table) =
        TableFile::load(config.table_path.value.clone(), TableLayout::from_config(&config))?;

    let policy = BufferPolicy::default();
    let Some(extent) = buffered_extent(&table, &code, &policy) else {
        return Err(CliError::new(format!("No complete bounding box stored for {}", code))
            .with_context("The extent needs all four bounding box coordinates.")
            .with_suggestion(format!("Refresh the country: countrygeo update {}", code))
            .with_help("Run: countrygeo show")
            .into());
    };

    let buffer = policy.buffer_for(&code);
    if output.is_json() {
        output.result(ExtentOutput { code, buffer, extent })?;
    } else {
        output.kv("Country", format!("{} {}", code, code.name().unwrap_or("")));
        output.kv("Buffer", format!("{}°", buffer));
        output.kv("Northeast", format_point(&extent.bbox.northeast));
        output.kv("Southwest", format_point(&extent.bbox.southwest));
        output.kv("Center", format_point(&extent.center));
    }
    Ok(true)
}
