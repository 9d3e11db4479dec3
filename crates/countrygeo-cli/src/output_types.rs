use crate::dry_run::PlannedAction;
use countrygeo_core::models::{CountryCode, CountryGeoRecord, LonLat};
use countrygeo_reconcile::{CountryReport, ReportSummary};
use serde::Serialize;
use tabled::Tabled;

/// Output for update command
#[derive(Debug, Serialize)]
pub struct UpdateOutput {
    pub summary: ReportSummary,
    pub changed: Vec<CountryCode>,
    pub failed: Vec<FailedCountry>,
    pub table_path: String,
    pub written: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned_actions: Vec<PlannedAction>,
    /// Per-country detail, included from verbosity 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<CountryReport>>,
}

#[derive(Debug, Serialize)]
pub struct FailedCountry {
    pub code: CountryCode,
    pub reason: String,
}

/// One table row for the show command
#[derive(Debug, Serialize, Tabled)]
pub struct CountryRow {
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Northeast")]
    pub northeast: String,
    #[tabled(rename = "Southwest")]
    pub southwest: String,
    #[tabled(rename = "Center")]
    pub center: String,
    #[tabled(rename = "Complete")]
    pub complete: bool,
}

impl CountryRow {
    pub fn new(code: &CountryCode, record: &CountryGeoRecord) -> Self {
        Self {
            code: code.to_string(),
            name: code.name().unwrap_or("-").to_string(),
            northeast: format_point(&record.bbox.northeast),
            southwest: format_point(&record.bbox.southwest),
            center: format_point(&record.center),
            complete: record.is_determined(),
        }
    }
}

/// Output for extent command
#[derive(Debug, Serialize)]
pub struct ExtentOutput {
    pub code: CountryCode,
    pub buffer: f64,
    pub extent: CountryGeoRecord,
}

/// One configuration entry
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Result of one doctor check
#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Format a coordinate pair as `[lon, lat]`, `null` for unknown components
pub fn format_point(point: &LonLat) -> String {
    let part = |v: Option<f64>| v.map_or_else(|| "null".to_string(), |v| v.to_string());
    format!("[{}, {}]", part(point.lon()), part(point.lat()))
}
