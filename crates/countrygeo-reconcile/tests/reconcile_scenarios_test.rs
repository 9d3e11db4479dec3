use countrygeo_core::models::{
    Axis, BoundingBox, Corner, CountryCode, CountryGeoRecord, GeoQueryResult, GeoResultSet,
    GeoTable, LonLat,
};
use countrygeo_core::ports::ScriptedGeocoder;
use countrygeo_reconcile::{
    CenterRule, CountrySelection, FailureReason, Outcome, OverrideStrategy, OverrideTable,
    ReconcileError, Reconciler, ResolutionPath, Selector, SubQuery,
};

fn cc(code: &'static str) -> CountryCode {
    CountryCode::from_static(code)
}

fn record(ne: (f64, f64), sw: (f64, f64), center: (f64, f64)) -> CountryGeoRecord {
    CountryGeoRecord::new(
        BoundingBox::new(LonLat::new(ne.0, ne.1), LonLat::new(sw.0, sw.1)),
        LonLat::new(center.0, center.1),
    )
}

fn candidate(kind: &str, r: CountryGeoRecord) -> GeoQueryResult {
    GeoQueryResult::new(kind).with_bbox(r.bbox).with_center(r.center)
}

fn only(codes: &[&'static str]) -> CountrySelection {
    CountrySelection::codes(codes.iter().map(|&c| cc(c)))
}

#[test]
fn test_single_country_candidate_is_written() {
    let expected = record((10.0, 50.0), (-5.0, 40.0), (2.5, 45.0));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Germany",
        Some(cc("DE")),
        GeoResultSet::new(vec![candidate("country", expected).with_iso_code(&cc("DE"))]),
    );
    let reconciler = Reconciler::new(geocoder);

    let (table, report) = reconciler.reconcile(&only(&["DE"]), &GeoTable::new()).unwrap();

    assert_eq!(table.get(&cc("DE")), Some(&expected));
    let entry = report.entry(&cc("DE")).unwrap();
    assert_eq!(entry.outcome, Outcome::Changed);
    assert_eq!(entry.path, ResolutionPath::Strict);
    assert_eq!(entry.kind.as_deref(), Some("country"));
    assert_eq!(entry.trace.len(), 1);
    assert!(report.is_success());
}

#[test]
fn test_strict_prefers_country_over_earlier_candidates() {
    let city = record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5));
    let country = record((10.0, 50.0), (-5.0, 40.0), (2.5, 45.0));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Mainland France",
        Some(cc("FR")),
        GeoResultSet::new(vec![candidate("city", city), candidate("country", country)]),
    );

    let (table, _) = Reconciler::new(geocoder)
        .reconcile(&only(&["FR"]), &GeoTable::new())
        .unwrap();

    assert_eq!(table.get(&cc("FR")), Some(&country));
}

#[test]
fn test_fallback_selects_matching_state() {
    let state = record((-68.0, 12.7), (-68.5, 12.0), (-68.3, 12.2));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Bonaire, Sint Eustatius and Saba",
        None,
        GeoResultSet::new(vec![
            candidate("city", record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5))),
            candidate("state", state).with_iso_code(&cc("BQ")),
        ]),
    );
    let reconciler = Reconciler::new(geocoder);

    let (table, report) = reconciler.reconcile(&only(&["BQ"]), &GeoTable::new()).unwrap();

    assert_eq!(table.get(&cc("BQ")), Some(&state));
    let entry = report.entry(&cc("BQ")).unwrap();
    assert_eq!(entry.path, ResolutionPath::Fallback);
    assert_eq!(entry.fallback_position, Some(1));

    // Strict query used the owner code and the replacement name
    let calls = reconciler.geocoder().calls();
    assert_eq!(calls[0].query, "Caribbean Netherlands");
    assert_eq!(calls[0].country, Some(cc("NL")));
    assert_eq!(calls[1].country, None);
}

#[test]
fn test_fallback_prefers_country_among_matches() {
    let island = record((2.0, 2.0), (1.0, 1.0), (1.5, 1.5));
    let country = record((3.0, 3.0), (0.0, 0.0), (1.5, 1.5));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Puerto Rico",
        None,
        GeoResultSet::new(vec![
            candidate("city", record((9.0, 9.0), (8.0, 8.0), (8.5, 8.5))),
            candidate("island", island).with_iso_code(&cc("US")),
            candidate("country", country).with_iso_code(&cc("US")),
        ]),
    );

    let (table, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["PR"]), &GeoTable::new())
        .unwrap();

    assert_eq!(table.get(&cc("PR")), Some(&country));
    assert_eq!(report.entry(&cc("PR")).unwrap().fallback_position, Some(2));
}

#[test]
fn test_fallback_without_country_takes_last_match() {
    let state = record((2.0, 2.0), (1.0, 1.0), (1.5, 1.5));
    let island = record((-65.2, 18.5), (-67.3, 17.9), (-66.5, 18.2));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Puerto Rico",
        None,
        GeoResultSet::new(vec![
            candidate("city", record((9.0, 9.0), (8.0, 8.0), (8.5, 8.5))).with_iso_code(&cc("ES")),
            candidate("state", state).with_iso_code(&cc("US")),
            candidate("island", island).with_iso_code(&cc("US")),
        ]),
    );

    let (table, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["PR"]), &GeoTable::new())
        .unwrap();

    let entry = report.entry(&cc("PR")).unwrap();
    assert_eq!(entry.fallback_position, Some(2));
    assert_eq!(entry.kind.as_deref(), Some("island"));
    assert_eq!(table.get(&cc("PR")), Some(&island));
}

#[test]
fn test_strict_without_bbox_triggers_fallback() {
    let full = record((20.0, 20.0), (10.0, 10.0), (15.0, 15.0));
    let geocoder = ScriptedGeocoder::new()
        .with_response(
            "Belgium",
            Some(cc("BE")),
            GeoResultSet::new(vec![GeoQueryResult::new("country").with_center(LonLat::new(1.0, 1.0))]),
        )
        .with_response("Belgium", None, GeoResultSet::new(vec![candidate("country", full)]));

    let (table, _) = Reconciler::new(geocoder)
        .reconcile(&only(&["BE"]), &GeoTable::new())
        .unwrap();

    assert_eq!(table.get(&cc("BE")), Some(&full));
}

#[test]
fn test_override_never_issues_generic_queries() {
    let reconciler = Reconciler::new(ScriptedGeocoder::new());

    let (_, report) = reconciler
        .reconcile(&only(&["AU", "US", "TV", "MY"]), &GeoTable::new())
        .unwrap();

    let geocoder = reconciler.geocoder();
    assert!(!geocoder.was_queried("Australia"));
    assert!(!geocoder.was_queried("United States of America"));
    assert!(!geocoder.was_queried("Tuvalu"));
    assert!(geocoder.was_queried("Malaysia"));
    assert!(geocoder.calls().iter().all(|c| c.query != "Malaysia" || c.country.is_none()));

    for entry in &report.entries {
        assert_eq!(entry.path, ResolutionPath::Override);
    }
}

#[test]
fn test_fixed_override_for_tuvalu() {
    let (table, report) = Reconciler::new(ScriptedGeocoder::new())
        .reconcile(&only(&["TV"]), &GeoTable::new())
        .unwrap();

    let expected = record((179.871061, -5.64223), (176.078332, -10.791658), (179.198333, -8.521111));
    assert_eq!(table.get(&cc("TV")), Some(&expected));
    assert!(report.entry(&cc("TV")).unwrap().trace.is_empty());
}

#[test]
fn test_disambiguation_picks_northernmost_country() {
    let south = record((104.0, 10.0), (100.0, 1.0), (102.0, 4.0));
    let north = record((119.0, 20.0), (109.0, 0.8), (114.0, 3.0));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Malaysia",
        None,
        GeoResultSet::new(vec![
            candidate("country", south),
            candidate("state", record((0.0, 80.0), (0.0, 0.0), (0.0, 40.0))),
            candidate("country", north),
        ]),
    );

    let (table, _) = Reconciler::new(geocoder)
        .reconcile(&only(&["MY"]), &GeoTable::new())
        .unwrap();

    assert_eq!(table.get(&cc("MY")), Some(&north));
}

#[test]
fn test_disambiguation_without_country_fails() {
    let geocoder = ScriptedGeocoder::new().with_response(
        "Jersey",
        None,
        GeoResultSet::new(vec![candidate("city", record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5)))]),
    );

    let (_, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["JE"]), &GeoTable::new())
        .unwrap();

    assert_eq!(
        report.entry(&cc("JE")).unwrap().outcome,
        Outcome::Failed(FailureReason::NoCandidates)
    );
}

#[test]
fn test_composite_override_combines_corners() {
    let geocoder = ScriptedGeocoder::new()
        .with_response(
            "Maine",
            Some(cc("US")),
            GeoResultSet::new(vec![candidate("state", record((-66.9, 47.5), (-71.1, 43.0), (0.0, 0.0)))]),
        )
        .with_response(
            "Minnesota",
            Some(cc("US")),
            GeoResultSet::new(vec![candidate("state", record((-89.5, 49.4), (-97.2, 43.5), (0.0, 0.0)))]),
        )
        .with_response(
            "California",
            Some(cc("US")),
            GeoResultSet::new(vec![candidate("state", record((-114.1, 42.0), (-124.5, 32.5), (0.0, 0.0)))]),
        )
        .with_response(
            "Florida",
            Some(cc("US")),
            GeoResultSet::new(vec![candidate("state", record((-80.0, 31.0), (-87.6, 24.4), (0.0, 0.0)))]),
        );

    let (table, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["US"]), &GeoTable::new())
        .unwrap();

    let expected = record((-66.9, 49.4), (-124.5, 24.4), (-98.583333, 39.833333));
    assert_eq!(table.get(&cc("US")), Some(&expected));
    assert_eq!(report.entry(&cc("US")).unwrap().trace.len(), 4);
}

#[test]
fn test_composite_region_not_found() {
    let geocoder = ScriptedGeocoder::new().with_response(
        "Monaco",
        Some(cc("MC")),
        GeoResultSet::new(vec![candidate("country", record((7.5, 43.8), (7.4, 43.7), (7.42, 43.74)))]),
    );

    let (table, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["MC"]), &GeoTable::new())
        .unwrap();

    assert!(table.get(&cc("MC")).is_none());
    assert_eq!(
        report.entry(&cc("MC")).unwrap().outcome,
        Outcome::Failed(FailureReason::RegionNotFound("Monaco".to_string()))
    );
}

#[test]
fn test_composite_center_from_sub_query() {
    let city = record((7.44, 43.75), (7.40, 43.72), (7.42, 43.73));
    let geocoder = ScriptedGeocoder::new().with_response(
        "Monaco",
        Some(cc("MC")),
        GeoResultSet::new(vec![
            candidate("country", record((8.0, 44.0), (7.0, 43.0), (7.5, 43.5))),
            candidate("city", city),
        ]),
    );

    let (table, _) = Reconciler::new(geocoder)
        .reconcile(&only(&["MC"]), &GeoTable::new())
        .unwrap();

    assert_eq!(table.get(&cc("MC")), Some(&city));
}

#[test]
fn test_provider_error_in_sub_query_is_reported() {
    let geocoder = ScriptedGeocoder::new()
        .with_response("Finnmark", Some(cc("NO")), GeoResultSet::failed("quota exceeded"));

    let (_, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["NO"]), &GeoTable::new())
        .unwrap();

    assert_eq!(
        report.entry(&cc("NO")).unwrap().outcome,
        Outcome::Failed(FailureReason::ProviderUnavailable("quota exceeded".to_string()))
    );
}

#[test]
fn test_partial_data_keeps_previous_record() {
    let previous = record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5));
    let mut existing = GeoTable::new();
    existing.insert(cc("AD"), previous);

    // Center missing
    let geocoder = ScriptedGeocoder::new().with_response(
        "Andorra",
        Some(cc("AD")),
        GeoResultSet::new(vec![GeoQueryResult::new("country")
            .with_bbox(BoundingBox::new(LonLat::new(1.8, 42.7), LonLat::new(1.4, 42.4)))]),
    );

    let (table, report) = Reconciler::new(geocoder).reconcile(&only(&["AD"]), &existing).unwrap();

    assert_eq!(table.get(&cc("AD")), Some(&previous));
    let entry = report.entry(&cc("AD")).unwrap();
    assert_eq!(entry.outcome, Outcome::Failed(FailureReason::UndeterminedCoordinates));
    assert!(entry.record.is_some());
}

#[test]
fn test_provider_failure_keeps_previous_record_and_continues() {
    let previous = record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5));
    let fresh = record((6.0, 51.0), (2.5, 49.5), (4.5, 50.5));
    let mut existing = GeoTable::new();
    existing.insert(cc("AD"), previous);

    let geocoder = ScriptedGeocoder::new()
        .with_response("Andorra", Some(cc("AD")), GeoResultSet::failed("timeout"))
        .with_response("Andorra", None, GeoResultSet::failed("timeout"))
        .with_response("Belgium", Some(cc("BE")), GeoResultSet::new(vec![candidate("country", fresh)]));

    let (table, report) = Reconciler::new(geocoder)
        .reconcile(&only(&["AD", "BE"]), &existing)
        .unwrap();

    assert_eq!(table.get(&cc("AD")), Some(&previous));
    assert_eq!(table.get(&cc("BE")), Some(&fresh));
    assert_eq!(report.failed(), vec![cc("AD")]);
    assert_eq!(report.changed(), vec![cc("BE")]);
}

#[test]
fn test_second_run_is_unchanged() {
    let r = record((10.0, 50.0), (-5.0, 40.0), (2.5, 45.0));
    let geocoder = ScriptedGeocoder::new()
        .with_response("Germany", Some(cc("DE")), GeoResultSet::new(vec![candidate("country", r)]))
        .with_response("Austria", Some(cc("AT")), GeoResultSet::new(vec![candidate("country", r)]));
    let reconciler = Reconciler::new(geocoder);
    let selection = only(&["DE", "AT", "TV"]);

    let (first, _) = reconciler.reconcile(&selection, &GeoTable::new()).unwrap();
    let (second_table, second) = reconciler.reconcile(&selection, &first).unwrap();

    assert_eq!(second.unchanged().len(), 3);
    assert!(second.changed().is_empty());
    assert_eq!(second_table, first);
}

#[test]
fn test_unrequested_codes_untouched() {
    let kept = record((1.0, 1.0), (0.0, 0.0), (0.5, 0.5));
    let mut existing = GeoTable::new();
    existing.insert(cc("FR"), kept);

    let (table, report) = Reconciler::new(ScriptedGeocoder::new())
        .reconcile(&only(&["TV"]), &existing)
        .unwrap();

    assert_eq!(table.get(&cc("FR")), Some(&kept));
    assert_eq!(report.entries.len(), 1);
}

#[test]
fn test_incomplete_override_aborts_before_querying() {
    let overrides = OverrideTable::empty().with(
        cc("AD"),
        OverrideStrategy::Composite {
            sub_queries: vec![SubQuery::new("Canillo", Selector::Default).edit(Corner::NorthEast, None)],
            center: CenterRule::Midpoint,
        },
    );
    let reconciler = Reconciler::new(ScriptedGeocoder::new()).with_overrides(overrides);

    let result = reconciler.reconcile(&only(&["BE"]), &GeoTable::new());

    assert!(matches!(result, Err(ReconcileError::Misconfiguration { code, .. }) if code == cc("AD")));
    assert!(reconciler.geocoder().calls().is_empty());
}

#[test]
fn test_code_without_name_or_override_is_misconfiguration() {
    let reconciler = Reconciler::new(ScriptedGeocoder::new());

    let result = reconciler.reconcile(&only(&["XK"]), &GeoTable::new());

    assert!(matches!(result, Err(ReconcileError::Misconfiguration { .. })));
}

#[test]
fn test_midpoint_center_rule() {
    let overrides = OverrideTable::empty().with(
        cc("EC"),
        OverrideStrategy::Composite {
            sub_queries: vec![
                SubQuery::new("East", Selector::Default).edit(Corner::NorthEast, Some(Axis::Longitude)),
                SubQuery::new("Rest", Selector::Kind("state".into()))
                    .edit(Corner::NorthEast, Some(Axis::Latitude))
                    .edit(Corner::SouthWest, None),
            ],
            center: CenterRule::Midpoint,
        },
    );
    let geocoder = ScriptedGeocoder::new()
        .with_response(
            "East",
            Some(cc("EC")),
            GeoResultSet::new(vec![candidate("state", record((-75.0, 0.0), (-76.0, -1.0), (0.0, 0.0)))]),
        )
        .with_response(
            "Rest",
            Some(cc("EC")),
            GeoResultSet::new(vec![
                candidate("city", record((9.0, 9.0), (9.0, 9.0), (9.0, 9.0))),
                candidate("state", record((-79.0, 1.5), (-81.0, -5.0), (0.0, 0.0))),
            ]),
        );

    let (table, _) = Reconciler::new(geocoder)
        .with_overrides(overrides)
        .reconcile(&only(&["EC"]), &GeoTable::new())
        .unwrap();

    assert_eq!(
        table.get(&cc("EC")),
        Some(&record((-75.0, 1.5), (-81.0, -5.0), (-78.0, -1.75)))
    );
}
