use crate::cli::{TableArgs, UpdateArgs};
use crate::config_loader::{load_config, table_overrides};
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::{format_point, FailedCountry, UpdateOutput};
use crate::progress::{create_progress_bar, finish_error, finish_success};
use anyhow::Result;
use countrygeo_core::models::{known_country, CountryCode};
use countrygeo_opencage::OpenCageGeocoder;
use countrygeo_reconcile::{
    CountryReport, CountrySelection, Outcome, ReconcileProgress, ReconciliationReport, Reconciler,
};
use countrygeo_store::{TableFile, TableLayout};
use std::path::Path;

pub fn execute(
    args: UpdateArgs,
    config_path: Option<&Path>,
    table_args: &TableArgs,
    output: &OutputWriter,
) -> Result<bool> {
    let selection = parse_selection(&args.codes)?;

    let mut overrides = table_overrides(table_args)?;
    overrides.api_key = args.api_key;
    overrides.endpoint = args.endpoint;
    overrides.language = args.language;
    let config = load_config(config_path, overrides)?;

    let geocoder = OpenCageGeocoder::from_config(&config)?;
    let (file, existing) =
        TableFile::load(config.table_path.value.clone(), TableLayout::from_config(&config))?;
    let reconciler = Reconciler::new(geocoder);

    let total = selection.resolve().len();
    let show_bar = !output.is_json() && output.verbosity() == 1;
    let pb = show_bar.then(|| create_progress_bar(total as u64, "Updating country geodata"));

    let result = reconciler.reconcile_with_progress(&selection, &existing, |p| {
        if let Some(pb) = &pb {
            pb.set_position(p.current as u64);
        } else if output.verbosity() >= 2 {
            output.line(progress_line(&p));
        }
    });

    let (table, report) = match result {
        Ok(done) => done,
        Err(e) => {
            if let Some(pb) = &pb {
                finish_error(pb, "Update aborted");
            }
            return Err(e.into());
        }
    };
    let summary = report.summary();
    if let Some(pb) = &pb {
        if report.is_success() {
            finish_success(pb, &format!("{} countries processed", total));
        } else {
            finish_error(pb, &format!("{} of {} countries failed", summary.failed, total));
        }
    }

    let mut planned_actions = Vec::new();
    if args.dry_run {
        let action = match file.layout() {
            TableLayout::Json => {
                PlannedAction::new(ActionType::WriteFile, format!("Write {}", file.path().display()))
            }
            TableLayout::Embedded { anchor, .. } => PlannedAction::new(
                ActionType::ModifyFile,
                format!("Rewrite {} in {}", anchor, file.path().display()),
            ),
        };
        planned_actions.push(
            action
                .with_detail(format!("{} countries changed", summary.changed))
                .with_detail(format!("{} countries in the table", table.len())),
        );
    } else {
        file.save(&table)?;
    }

    if output.is_json() {
        let result = UpdateOutput {
            summary,
            changed: report.changed(),
            failed: failures(&report),
            table_path: file.path().display().to_string(),
            written: !args.dry_run,
            planned_actions,
            countries: (output.verbosity() >= 2).then(|| report.entries.clone()),
        };
        output.result(result)?;
        return Ok(report.is_success());
    }

    if output.verbosity() >= 2 {
        print_outcomes(output, &report);
    }
    if output.verbosity() >= 3 {
        for entry in &report.entries {
            print_detail(output, entry);
        }
    }
    display_planned_actions(output, &planned_actions);

    if report.is_success() {
        if output.verbosity() >= 1 {
            output.success(format!(
                "** Geodata update successfully completed. {} countries updated.",
                summary.changed
            ));
        }
    } else {
        output.error(format!(
            "** Geodata update failed. {} countries updated, {} countries failed.",
            summary.changed, summary.failed
        ));
    }

    Ok(report.is_success())
}

/// Empty input or `ALL` selects every registry country
fn parse_selection(codes: &[String]) -> Result<CountrySelection> {
    if codes.is_empty() || codes.iter().any(|c| c.eq_ignore_ascii_case("all")) {
        return Ok(CountrySelection::All);
    }
    let parsed = codes
        .iter()
        .map(|c| known_country(c))
        .collect::<countrygeo_core::Result<Vec<CountryCode>>>()?;
    Ok(CountrySelection::codes(parsed))
}

fn failures(report: &ReconciliationReport) -> Vec<FailedCountry> {
    report
        .entries
        .iter()
        .filter_map(|e| {
            e.failure().map(|reason| FailedCountry { code: e.code, reason: reason.to_string() })
        })
        .collect()
}

fn progress_line(p: &ReconcileProgress) -> String {
    let status = match &p.outcome {
        Outcome::Changed => "updated".to_string(),
        Outcome::Unchanged => "unchanged".to_string(),
        Outcome::Failed(reason) => format!("failed: {}", reason),
    };
    format!("[{}/{}] {} {}", p.current, p.total, p.code, status)
}

fn print_outcomes(output: &OutputWriter, report: &ReconciliationReport) {
    let changed = report.changed();
    if !changed.is_empty() {
        output.section("SUCCESS");
        output.line(join_codes(&changed));
    }

    let failed = failures(report);
    if !failed.is_empty() {
        output.section("FAILURE");
        for failure in failed {
            output.line(format!("{}: {}", failure.code, failure.reason));
        }
    }
}

fn print_detail(output: &OutputWriter, entry: &CountryReport) {
    output.section(format!("{} {}", entry.code, entry.name.as_deref().unwrap_or("")));
    output.kv("Political code", entry.political_code);
    if let Some(query_name) = &entry.query_name {
        output.kv("Query", query_name);
    }
    output.kv("Path", format!("{:?}", entry.path));
    if let Some(kind) = &entry.kind {
        output.kv("Kind", kind);
    }
    if let Some(position) = entry.fallback_position {
        output.kv("Fallback position", position);
    }
    if !entry.components.is_empty() {
        let components = serde_json::Value::Object(entry.components.clone());
        output.kv("Components", components);
    }
    if let Some(record) = &entry.record {
        output.kv("Northeast", format_point(&record.bbox.northeast));
        output.kv("Southwest", format_point(&record.bbox.southwest));
        output.kv("Center", format_point(&record.center));
    }
    match &entry.outcome {
        Outcome::Failed(reason) => output.kv("Outcome", format!("failed: {}", reason)),
        other => output.kv("Outcome", format!("{:?}", other).to_lowercase()),
    }
}

fn join_codes(codes: &[CountryCode]) -> String {
    codes.iter().map(CountryCode::to_string).collect::<Vec<_>>().join(", ")
}
