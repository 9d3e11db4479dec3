use crate::cli::TableArgs;
use crate::config_loader::{config_file_in_use, load_config, table_overrides};
use crate::output::OutputWriter;
use crate::output_types::ConfigEntry;
use anyhow::Result;
use std::path::Path;

pub fn execute(config_path: Option<&Path>, table_args: &TableArgs, output: &OutputWriter) -> Result<bool> {
    let config = load_config(config_path, table_overrides(table_args)?)?;

    let mut entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    match config_file_in_use(config_path) {
        Some(path) => output.kv("Config file", path.display()),
        None => output.kv("Config file", "(none)"),
    }
    output.table(entries)?;
    Ok(true)
}
