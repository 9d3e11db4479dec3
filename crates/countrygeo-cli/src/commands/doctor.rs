use crate::cli::TableArgs;
use crate::config_loader::{config_file_in_use, load_config, table_overrides};
use crate::output::OutputWriter;
use crate::output_types::DoctorCheck;
use anyhow::Result;
use console::style;
use countrygeo_core::config::LayeredConfig;
use countrygeo_core::models::{all_countries, GeoTable};
use countrygeo_reconcile::OverrideTable;
use countrygeo_store::{TableFile, TableLayout};
use std::path::Path;

pub fn execute(config_path: Option<&Path>, table_args: &TableArgs, output: &OutputWriter) -> Result<bool> {
    let config = load_config(config_path, table_overrides(table_args)?)?;

    let mut checks = vec![check_config_file(config_path), check_api_key(&config)];
    match TableFile::load(config.table_path.value.clone(), TableLayout::from_config(&config)) {
        Ok((file, table)) => {
            checks.push(DoctorCheck {
                name: "Table".to_string(),
                passed: true,
                detail: format!("{} countries in {}", table.len(), file.path().display()),
                hint: None,
            });
            checks.push(check_coverage(&table));
        }
        Err(e) => checks.push(DoctorCheck {
            name: "Table".to_string(),
            passed: false,
            detail: e.to_string(),
            hint: Some("Check table.path and table.format: countrygeo config".to_string()),
        }),
    }
    checks.push(check_overrides());

    let all_passed = checks.iter().all(|c| c.passed);
    if output.is_json() {
        output.result(&checks)?;
        return Ok(all_passed);
    }

    println!("\n{}", style("countrygeo Health Check").bold().underlined());
    println!("{}", style("═".repeat(60)).dim());
    println!();
    for check in &checks {
        let mark = if check.passed { style("✓").green() } else { style("✗").red() };
        println!("{} {}: {}", mark, check.name, check.detail);
        if let Some(hint) = &check.hint {
            println!("  → {}", hint);
        }
    }

    let passed = checks.iter().filter(|c| c.passed).count();
    println!();
    println!("{}", style("─".repeat(60)).dim());
    if all_passed {
        println!("{} All checks passed ({}/{})", style("✓").green().bold(), passed, checks.len());
    } else {
        println!(
            "{} {}/{} checks passed",
            style("⚠").yellow().bold(),
            passed,
            checks.len()
        );
    }
    println!();

    Ok(all_passed)
}

fn check_config_file(config_path: Option<&Path>) -> DoctorCheck {
    let detail = match config_file_in_use(config_path) {
        Some(path) => format!("Loaded {}", path.display()),
        None => "No countrygeo.toml, using defaults and environment".to_string(),
    };
    DoctorCheck { name: "Config".to_string(), passed: true, detail, hint: None }
}

fn check_api_key(config: &LayeredConfig) -> DoctorCheck {
    match config.require_api_key() {
        Ok(_) => DoctorCheck {
            name: "API key".to_string(),
            passed: true,
            detail: format!("Set ({:?})", config.api_key.source),
            hint: None,
        },
        Err(_) => DoctorCheck {
            name: "API key".to_string(),
            passed: false,
            detail: "Not configured".to_string(),
            hint: Some("export OPENCAGE_API_KEY=\"...\"".to_string()),
        },
    }
}

fn check_coverage(table: &GeoTable) -> DoctorCheck {
    let mut missing = 0;
    let mut incomplete = 0;
    for code in all_countries() {
        match table.get(&code) {
            None => missing += 1,
            Some(record) if !record.is_determined() => incomplete += 1,
            Some(_) => {}
        }
    }

    let passed = missing == 0 && incomplete == 0;
    DoctorCheck {
        name: "Coverage".to_string(),
        passed,
        detail: format!("{} countries missing, {} with incomplete geodata", missing, incomplete),
        hint: (!passed).then(|| "Run: countrygeo update".to_string()),
    }
}

fn check_overrides() -> DoctorCheck {
    let overrides = OverrideTable::builtin();
    match overrides.validate() {
        Ok(()) => DoctorCheck {
            name: "Overrides".to_string(),
            passed: true,
            detail: format!("{} override entries valid", overrides.codes().count()),
            hint: None,
        },
        Err(e) => DoctorCheck {
            name: "Overrides".to_string(),
            passed: false,
            detail: e.to_string(),
            hint: None,
        },
    }
}
