use chrono::Utc;
use countrygeo_core::models::{
    all_countries, BoundingBox, CountryCode, CountryGeoRecord, GeoQueryResult, GeoResultSet,
    GeoTable, LonLat, COMPONENT_ISO_CODE, COMPONENT_TYPE,
};
use countrygeo_core::ports::Geocoder;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::ReconcileError;
use crate::naming;
use crate::overrides::{CenterRule, OverrideStrategy, OverrideTable, Selector, SubQuery};
use crate::report::{
    CountryReport, FailureReason, Outcome, QueryTrace, ReconciliationReport, ResolutionPath,
};

/// Classifications accepted from the world search
const FALLBACK_KINDS: &[&str] = &["country", "state", "county", "island"];

/// Antarctica keeps whatever the world search returns first
const ANTARCTICA: CountryCode = CountryCode::from_static("AQ");

/// Which countries to reconcile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountrySelection {
    /// Every registry country
    All,
    Codes(BTreeSet<CountryCode>),
}

impl CountrySelection {
    pub fn codes(codes: impl IntoIterator<Item = CountryCode>) -> Self {
        CountrySelection::Codes(codes.into_iter().collect())
    }

    /// Requested codes in code order
    pub fn resolve(&self) -> Vec<CountryCode> {
        match self {
            CountrySelection::All => all_countries().collect(),
            CountrySelection::Codes(codes) => codes.iter().copied().collect(),
        }
    }
}

/// Progress of a run, reported after each country
#[derive(Debug, Clone)]
pub struct ReconcileProgress {
    pub code: CountryCode,
    pub current: usize,
    pub total: usize,
    pub outcome: Outcome,
}

/// Computes authoritative bounding boxes and centers for countries
pub struct Reconciler<G>
where
    G: Geocoder,
{
    geocoder: G,
    overrides: OverrideTable,
}

impl<G> Reconciler<G>
where
    G: Geocoder,
{
    /// Create a reconciler with the built-in overrides
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            overrides: OverrideTable::builtin(),
        }
    }

    /// Replace the override table
    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Reconcile the selected countries against the existing table
    pub fn reconcile(
        &self,
        selection: &CountrySelection,
        existing: &GeoTable,
    ) -> Result<(GeoTable, ReconciliationReport), ReconcileError> {
        self.reconcile_with_progress(selection, existing, |_| {})
    }

    /// Reconcile with progress reporting
    ///
    /// Configuration problems are detected before the first query; after that
    /// every per-country problem ends up in the report instead.
    pub fn reconcile_with_progress<F>(
        &self,
        selection: &CountrySelection,
        existing: &GeoTable,
        mut progress: F,
    ) -> Result<(GeoTable, ReconciliationReport), ReconcileError>
    where
        F: FnMut(ReconcileProgress),
    {
        let codes = selection.resolve();
        if codes.is_empty() {
            return Err(ReconcileError::EmptySelection);
        }
        self.check_configuration(&codes)?;

        let started_at = Utc::now();
        let mut table = existing.clone();
        let mut entries = Vec::with_capacity(codes.len());
        let total = codes.len();

        tracing::info!(
            countries = total,
            provider = self.geocoder.provider_name(),
            "Starting reconciliation"
        );

        for (idx, code) in codes.into_iter().enumerate() {
            let entry = self.reconcile_country(&code, existing.get(&code));

            if let (Outcome::Changed, Some(record)) = (&entry.outcome, entry.record) {
                table.insert(code, record);
            }

            progress(ReconcileProgress {
                code,
                current: idx + 1,
                total,
                outcome: entry.outcome.clone(),
            });
            entries.push(entry);
        }

        let report = ReconciliationReport {
            started_at,
            finished_at: Utc::now(),
            entries,
        };
        let summary = report.summary();
        tracing::info!(
            changed = summary.changed,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "Reconciliation finished"
        );

        Ok((table, report))
    }

    fn check_configuration(&self, codes: &[CountryCode]) -> Result<(), ReconcileError> {
        self.overrides.validate()?;

        for code in codes {
            if !self.overrides.contains(code) && naming::query_name(code).is_none() {
                return Err(ReconcileError::Misconfiguration {
                    code: *code,
                    reason: "no override and no registry name to query".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reconcile one country, comparing against its previous record
    pub fn reconcile_country(
        &self,
        code: &CountryCode,
        previous: Option<&CountryGeoRecord>,
    ) -> CountryReport {
        let mut tracer = Tracer::new(&self.geocoder);

        let resolution = match self.overrides.get(code) {
            Some(strategy) => self.run_override(&mut tracer, code, strategy),
            None => self.run_generic(&mut tracer, code),
        };

        let outcome = match (resolution.failure, resolution.record) {
            (Some(reason), _) => Outcome::Failed(reason),
            (None, None) => Outcome::Failed(FailureReason::NoCandidates),
            (None, Some(record)) if !record.is_determined() => {
                Outcome::Failed(FailureReason::UndeterminedCoordinates)
            }
            (None, Some(record)) if previous == Some(&record) => Outcome::Unchanged,
            (None, Some(_)) => Outcome::Changed,
        };

        match &outcome {
            Outcome::Failed(reason) => {
                tracing::warn!(code = %code, path = ?resolution.path, "Country failed: {}", reason)
            }
            _ => tracing::info!(
                code = %code,
                path = ?resolution.path,
                outcome = ?outcome,
                "Country reconciled"
            ),
        }

        CountryReport {
            code: *code,
            name: code.name().map(str::to_string),
            political_code: naming::political_code(code),
            query_name: naming::query_name(code).map(str::to_string),
            path: resolution.path,
            outcome,
            trace: tracer.into_trace(),
            kind: resolution.kind,
            components: resolution.components,
            fallback_position: resolution.fallback_position,
            record: resolution.record,
        }
    }

    /// Strict query constrained to the country, then a world search if needed
    fn run_generic(&self, tracer: &mut Tracer<'_, G>, code: &CountryCode) -> Resolution {
        let political = naming::political_code(code);
        let constraint = naming::query_constraint(code);
        let wanted = naming::expected_kind(code);
        let query = naming::query_name(code).unwrap_or_default();

        let mut set = tracer.query(query, Some(&constraint), true);
        let pointed = set.iter().position(|r| r.is_kind(wanted));
        if let Some(idx) = pointed {
            set.select(idx);
        }

        let mut path = ResolutionPath::Strict;
        let mut fallback_position = None;

        if set.is_empty() || pointed.is_none() || set.bbox().is_none() {
            let world_name = code.name().unwrap_or(query);
            tracing::warn!(
                code = %code,
                "No usable strict result, searching the world for '{}'",
                world_name
            );

            path = ResolutionPath::Fallback;
            set = tracer.query(world_name, None, true);

            if set.is_ok() && set.kind() != Some("country") && *code != ANTARCTICA {
                let eligible = |r: &GeoQueryResult| {
                    r.kind().is_some_and(|k| FALLBACK_KINDS.contains(&k))
                        && r.iso_code() == Some(political)
                };
                let chosen = set
                    .iter()
                    .position(|r| eligible(r) && r.is_kind("country"))
                    .or_else(|| set.iter().rposition(eligible));

                match chosen {
                    Some(idx) => {
                        set.select(idx);
                        fallback_position = Some(idx);
                    }
                    None => tracing::warn!(
                        code = %code,
                        "No world search candidate matches {}, keeping the first one",
                        political
                    ),
                }
            }
        }

        let mut resolution = Resolution::from_set(path, &set);
        resolution.fallback_position = fallback_position;
        resolution
    }

    fn run_override(
        &self,
        tracer: &mut Tracer<'_, G>,
        code: &CountryCode,
        strategy: &OverrideStrategy,
    ) -> Resolution {
        tracing::debug!(code = %code, "Applying override");

        match strategy {
            OverrideStrategy::Fixed(record) => Resolution::manual(code, *record, None),
            OverrideStrategy::Composite { sub_queries, center } => {
                self.run_composite(tracer, code, sub_queries, *center)
            }
            OverrideStrategy::Northernmost { query } => {
                let set = tracer.query(query, None, true);
                let best = northernmost_country(&set);

                let mut resolution = Resolution::from_candidate(ResolutionPath::Override, best);
                resolution.failure = match (set.error(), best) {
                    (Some(error), _) => Some(FailureReason::ProviderUnavailable(error.to_string())),
                    (None, None) => Some(FailureReason::NoCandidates),
                    (None, Some(_)) => None,
                };
                resolution
            }
        }
    }

    /// Compose a box from sub-region queries
    fn run_composite(
        &self,
        tracer: &mut Tracer<'_, G>,
        code: &CountryCode,
        sub_queries: &[SubQuery],
        center_rule: CenterRule,
    ) -> Resolution {
        let mut bbox = BoundingBox::UNKNOWN;
        let mut center = LonLat::UNKNOWN;
        let mut failure = None;

        for sub in sub_queries {
            let multiple = sub.selector != Selector::Default;
            let set = tracer.query(&sub.region, Some(code), multiple);

            let candidate = match &sub.selector {
                Selector::Default => {
                    if let Some(error) = set.error() {
                        failure.get_or_insert(FailureReason::ProviderUnavailable(error.to_string()));
                    }
                    set.current().filter(|_| set.is_ok())
                }
                Selector::Kind(kind) => set.iter().find(|r| r.is_kind(kind)),
                Selector::HasComponent(key) => set.iter().find(|r| r.has_component(key)),
            };

            if candidate.is_none() && sub.selector != Selector::Default {
                tracing::warn!(code = %code, region = %sub.region, "Sub-region not found");
                failure.get_or_insert(FailureReason::RegionNotFound(sub.region.clone()));
                continue;
            }

            let source = candidate.and_then(|c| c.bbox).unwrap_or(BoundingBox::UNKNOWN);
            for edit in &sub.edits {
                bbox.copy_from(source.corner(edit.corner), edit.corner, edit.axis);
            }
            if sub.take_center {
                center = candidate.and_then(|c| c.center).unwrap_or(LonLat::UNKNOWN);
            }
        }

        let center = match center_rule {
            CenterRule::Fixed(point) => point,
            CenterRule::FromSubQuery => center,
            CenterRule::Midpoint => bbox.midpoint().unwrap_or(LonLat::UNKNOWN),
        };

        Resolution::manual(code, CountryGeoRecord::new(bbox, center), failure)
    }
}

/// Among `country` candidates, the one whose northeast corner lies furthest north.
///
/// Candidates without a box rank lowest; ties keep the earlier candidate.
fn northernmost_country(set: &GeoResultSet) -> Option<&GeoQueryResult> {
    let north = |r: &GeoQueryResult| {
        r.bbox
            .and_then(|b| b.northeast.lat())
            .unwrap_or(f64::NEG_INFINITY)
    };

    let mut best: Option<&GeoQueryResult> = None;
    for candidate in set.iter().filter(|r| r.is_kind("country")) {
        if best.map_or(true, |b| north(candidate) > north(b)) {
            best = Some(candidate);
        }
    }
    best
}

/// What one decision path produced for a country
struct Resolution {
    path: ResolutionPath,
    record: Option<CountryGeoRecord>,
    failure: Option<FailureReason>,
    kind: Option<String>,
    components: Map<String, Value>,
    fallback_position: Option<usize>,
}

impl Resolution {
    /// Result of a geocoder set, using its selected candidate
    fn from_set(path: ResolutionPath, set: &GeoResultSet) -> Self {
        let mut resolution = Self::from_candidate(path, set.current());
        resolution.failure = match set.error() {
            Some(error) => Some(FailureReason::ProviderUnavailable(error.to_string())),
            None if set.is_empty() => Some(FailureReason::NoCandidates),
            None => None,
        };
        resolution
    }

    fn from_candidate(path: ResolutionPath, candidate: Option<&GeoQueryResult>) -> Self {
        Self {
            path,
            record: candidate.map(|c| {
                CountryGeoRecord::new(
                    c.bbox.unwrap_or(BoundingBox::UNKNOWN),
                    c.center.unwrap_or(LonLat::UNKNOWN),
                )
            }),
            failure: None,
            kind: candidate.and_then(|c| c.kind()).map(str::to_string),
            components: candidate.map(|c| c.components.clone()).unwrap_or_default(),
            fallback_position: None,
        }
    }

    /// Result computed by an override routine, described as a manual country
    fn manual(code: &CountryCode, record: CountryGeoRecord, failure: Option<FailureReason>) -> Self {
        let mut components = Map::new();
        components.insert(COMPONENT_ISO_CODE.to_string(), Value::String(code.to_string()));
        components.insert(COMPONENT_TYPE.to_string(), Value::String("country".to_string()));

        Self {
            path: ResolutionPath::Override,
            record: Some(record),
            failure,
            kind: Some("country".to_string()),
            components,
            fallback_position: None,
        }
    }
}

/// Geocoder wrapper recording each query of one country
struct Tracer<'a, G> {
    geocoder: &'a G,
    trace: Vec<QueryTrace>,
}

impl<'a, G: Geocoder> Tracer<'a, G> {
    fn new(geocoder: &'a G) -> Self {
        Self {
            geocoder,
            trace: Vec::new(),
        }
    }

    fn query(&mut self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet {
        let set = self.geocoder.geocode(query, country, multiple);
        tracing::debug!(
            query,
            country = country.map(CountryCode::as_str),
            multiple,
            "Geocoded: {}",
            set
        );

        self.trace.push(QueryTrace {
            query: query.to_string(),
            country: country.copied(),
            multiple,
            candidates: set.len(),
            error: set.error().map(str::to_string),
        });
        set
    }

    fn into_trace(self) -> Vec<QueryTrace> {
        self.trace
    }
}
