use countrygeo_core::error::CountryGeoError;
use countrygeo_core::models::{BoundingBox, CountryCode, CountryGeoRecord, GeoTable, LonLat};
use countrygeo_store::{TableFile, TableLayout};
use std::fs;
use tempfile::TempDir;

fn embedded() -> TableLayout {
    TableLayout::Embedded { anchor: "COUNTRIES_GEO".to_string(), null_literal: "None".to_string() }
}

fn sample_table() -> GeoTable {
    let mut table = GeoTable::new();
    table.insert(
        CountryCode::from_static("TV"),
        CountryGeoRecord::new(
            BoundingBox::new(LonLat::new(179.871061, -5.64223), LonLat::new(176.078332, -10.791658)),
            LonLat::new(179.198333, -8.521111),
        ),
    );
    table.insert(
        CountryCode::from_static("AQ"),
        CountryGeoRecord::new(BoundingBox::UNKNOWN, LonLat::UNKNOWN),
    );
    table
}

const PREFIX: &str = "# Generated geodata.\n\nCOUNTRIES_GEO = ";
const SUFFIX: &str = "\n\n\ndef country_bbox(code):\n    return COUNTRIES_GEO[code]['bbox']\n";

#[test]
fn test_missing_json_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("countries_geo.json");

    let (file, table) = TableFile::load(&path, TableLayout::Json).unwrap();

    assert!(table.is_empty());
    assert_eq!(file.path(), path.as_path());
    assert!(!path.exists());
}

#[test]
fn test_json_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("countries_geo.json");

    let (file, _) = TableFile::load(&path, TableLayout::Json).unwrap();
    file.save(&sample_table()).unwrap();

    let (_, reloaded) = TableFile::load(&path, TableLayout::Json).unwrap();
    assert_eq!(reloaded, sample_table());

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"AQ\""));
    assert!(raw.find("\"AQ\"").unwrap() < raw.find("\"TV\"").unwrap());
}

#[test]
fn test_embedded_round_trip_preserves_surroundings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.py");
    let original = format!("{}{{\n    \"XX\": None\n}}{}", PREFIX, SUFFIX);
    fs::write(&path, &original).unwrap();

    // The existing block cannot be decoded as a table
    assert!(TableFile::load(&path, embedded()).is_err());

    fs::write(&path, format!("{}{{\n}}{}", PREFIX, SUFFIX)).unwrap();
    let (file, table) = TableFile::load(&path, embedded()).unwrap();
    assert!(table.is_empty());

    file.save(&sample_table()).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with(PREFIX));
    assert!(raw.ends_with(SUFFIX));
    assert!(raw.contains("None"));
    assert!(!raw.contains("null"));

    let (_, reloaded) = TableFile::load(&path, embedded()).unwrap();
    assert_eq!(reloaded, sample_table());
}

#[test]
fn test_embedded_save_is_stable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.py");
    fs::write(&path, format!("{}{{\n}}{}", PREFIX, SUFFIX)).unwrap();

    let (file, _) = TableFile::load(&path, embedded()).unwrap();
    file.save(&sample_table()).unwrap();
    let first = fs::read_to_string(&path).unwrap();

    let (file, table) = TableFile::load(&path, embedded()).unwrap();
    file.save(&table).unwrap();
    let second = fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_anchor_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.py");
    fs::write(&path, "OTHER = {\n}\n").unwrap();

    let err = TableFile::load(&path, embedded()).unwrap_err();
    assert!(matches!(err, CountryGeoError::TableAnchorMissing { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "OTHER = {\n}\n");
}

#[test]
fn test_missing_host_file_is_an_error() {
    let dir = TempDir::new().unwrap();

    let err = TableFile::load(dir.path().join("data.py"), embedded()).unwrap_err();
    assert!(matches!(err, CountryGeoError::TableNotFound { .. }));
}
