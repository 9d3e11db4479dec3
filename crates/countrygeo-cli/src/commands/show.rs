use crate::cli::{ShowArgs, TableArgs};
use crate::config_loader::{load_config, table_overrides};
use crate::output::OutputWriter;
use crate::output_types::CountryRow;
use anyhow::Result;
use countrygeo_core::models::{known_country, CountryCode};
use countrygeo_store::{TableFile, TableLayout};
use std::path::Path;

pub fn execute(
    args: ShowArgs,
    config_path: Option<&Path>,
    table_args: &TableArgs,
    output: &OutputWriter,
) -> Result<bool> {
    let config = load_config(config_path, table_overrides(table_args)?)?;
    let (file, table) =
        TableFile::load(config.table_path.value.clone(), TableLayout::from_config(&config))?;

    let codes: Vec<CountryCode> = if args.codes.is_empty() {
        table.codes().copied().collect()
    } else {
        args.codes.iter().map(|c| known_country(c)).collect::<countrygeo_core::Result<_>>()?
    };

    let mut rows = Vec::with_capacity(codes.len());
    for code in &codes {
        match table.get(code) {
            Some(record) => rows.push(CountryRow::new(code, record)),
            None => output.warning(format!("{} has no stored geodata", code)),
        }
    }

    output.kv("Table", file.path().display());
    output.table(rows)?;
    Ok(true)
}
