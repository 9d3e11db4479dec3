use chrono::{DateTime, Utc};
use countrygeo_core::models::{CountryCode, CountryGeoRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a country could not be reconciled
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("{0} region not found or network error")]
    RegionNotFound(String),

    #[error("Some of the coordinates could not be calculated.")]
    UndeterminedCoordinates,

    #[error("No results found")]
    NoCandidates,
}

/// Terminal state of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Changed,
    Unchanged,
    Failed(FailureReason),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Decision path that produced a country's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    /// Hand-maintained override routine
    Override,
    /// Country-constrained query
    Strict,
    /// Unconstrained world search
    Fallback,
}

/// One query issued to the geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTrace {
    pub query: String,
    pub country: Option<CountryCode>,
    pub multiple: bool,
    pub candidates: usize,
    pub error: Option<String>,
}

/// Everything decided for one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryReport {
    pub code: CountryCode,

    /// Registry name
    pub name: Option<String>,

    /// Code used for ISO matching
    pub political_code: CountryCode,

    /// Free-text name of the strict query
    pub query_name: Option<String>,

    pub path: ResolutionPath,
    pub outcome: Outcome,

    /// Queries issued, in order
    pub trace: Vec<QueryTrace>,

    /// Classification of the chosen candidate
    pub kind: Option<String>,

    /// Raw components of the chosen candidate
    pub components: Map<String, Value>,

    /// Zero-based position of the candidate picked from the world search
    pub fallback_position: Option<usize>,

    /// Computed geodata, also present when the country failed with partial data
    pub record: Option<CountryGeoRecord>,
}

impl CountryReport {
    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            Outcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<CountryReport>,
}

impl ReconciliationReport {
    pub fn changed(&self) -> Vec<CountryCode> {
        self.codes_where(|o| matches!(o, Outcome::Changed))
    }

    pub fn unchanged(&self) -> Vec<CountryCode> {
        self.codes_where(|o| matches!(o, Outcome::Unchanged))
    }

    pub fn failed(&self) -> Vec<CountryCode> {
        self.codes_where(Outcome::is_failed)
    }

    /// No country failed
    pub fn is_success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failed())
    }

    pub fn entry(&self, code: &CountryCode) -> Option<&CountryReport> {
        self.entries.iter().find(|e| &e.code == code)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            changed: self.changed().len(),
            unchanged: self.unchanged().len(),
            failed: self.failed().len(),
            duration_ms: (self.finished_at - self.started_at).num_milliseconds().max(0) as u64,
        }
    }

    fn codes_where(&self, predicate: impl Fn(&Outcome) -> bool) -> Vec<CountryCode> {
        self.entries
            .iter()
            .filter(|e| predicate(&e.outcome))
            .map(|e| e.code)
            .collect()
    }
}

/// Counts of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &'static str, outcome: Outcome) -> CountryReport {
        let code = CountryCode::from_static(code);
        CountryReport {
            code,
            name: code.name().map(str::to_string),
            political_code: code,
            query_name: None,
            path: ResolutionPath::Strict,
            outcome,
            trace: Vec::new(),
            kind: None,
            components: Map::new(),
            fallback_position: None,
            record: None,
        }
    }

    #[test]
    fn test_counts_and_lists() {
        let now = Utc::now();
        let report = ReconciliationReport {
            started_at: now,
            finished_at: now,
            entries: vec![
                entry("AD", Outcome::Changed),
                entry("BE", Outcome::Unchanged),
                entry("CH", Outcome::Failed(FailureReason::NoCandidates)),
                entry("DE", Outcome::Changed),
            ],
        };

        let summary = report.summary();
        assert_eq!(summary.changed, 2);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(report.failed(), vec![CountryCode::from_static("CH")]);
        assert!(!report.is_success());
        assert_eq!(
            report.entry(&CountryCode::from_static("CH")).unwrap().failure(),
            Some(&FailureReason::NoCandidates)
        );
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            FailureReason::RegionNotFound("Esmeraldas".into()).to_string(),
            "Esmeraldas region not found or network error"
        );
        assert_eq!(
            FailureReason::ProviderUnavailable("quota exceeded".into()).to_string(),
            "quota exceeded"
        );
    }

    #[test]
    fn test_outcome_serializes_with_reason() {
        let json = serde_json::to_value(Outcome::Failed(FailureReason::UndeterminedCoordinates)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"]["kind"], "undetermined_coordinates");
    }
}
