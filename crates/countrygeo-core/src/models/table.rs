use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::country::CountryCode;
use super::geometry::CountryGeoRecord;

/// The country→geodata table, ordered by country code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoTable {
    records: BTreeMap<CountryCode, CountryGeoRecord>,
}

impl GeoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &CountryCode) -> Option<&CountryGeoRecord> {
        self.records.get(code)
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, code: CountryCode, record: CountryGeoRecord) -> Option<CountryGeoRecord> {
        self.records.insert(code, record)
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.records.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &CountryCode> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CountryCode, &CountryGeoRecord)> {
        self.records.iter()
    }
}

impl FromIterator<(CountryCode, CountryGeoRecord)> for GeoTable {
    fn from_iter<I: IntoIterator<Item = (CountryCode, CountryGeoRecord)>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
