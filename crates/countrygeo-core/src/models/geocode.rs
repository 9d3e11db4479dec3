//! Candidates returned by a geocoding provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::country::CountryCode;
use super::geometry::{BoundingBox, LonLat};

/// Component holding the classification tag of a candidate.
pub const COMPONENT_TYPE: &str = "_type";

/// Component holding the ISO 3166-1 alpha-2 code of a candidate.
pub const COMPONENT_ISO_CODE: &str = "ISO_3166-1_alpha-2";

/// One classified candidate for a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoQueryResult {
    pub bbox: Option<BoundingBox>,
    pub center: Option<LonLat>,
    pub components: Map<String, Value>,
}

impl GeoQueryResult {
    /// Build a candidate with the given classification.
    pub fn new(kind: impl Into<String>) -> Self {
        let mut components = Map::new();
        components.insert(COMPONENT_TYPE.to_string(), Value::String(kind.into()));
        Self { bbox: None, center: None, components }
    }

    pub fn with_iso_code(mut self, code: &CountryCode) -> Self {
        self.components
            .insert(COMPONENT_ISO_CODE.to_string(), Value::String(code.to_string()));
        self
    }

    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_center(mut self, center: LonLat) -> Self {
        self.center = Some(center);
        self
    }

    /// Classification tag, e.g. "country", "state", "island".
    pub fn kind(&self) -> Option<&str> {
        self.components.get(COMPONENT_TYPE).and_then(Value::as_str)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    /// ISO code component, uppercased when present.
    pub fn iso_code(&self) -> Option<CountryCode> {
        self.components
            .get(COMPONENT_ISO_CODE)
            .and_then(Value::as_str)
            .and_then(|code| CountryCode::parse(code).ok())
    }

    pub fn has_component(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }
}

/// Ordered candidates for one query, with a selected ("default") candidate.
///
/// A provider failure is represented by an empty set carrying an error
/// message; it never aborts the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoResultSet {
    results: Vec<GeoQueryResult>,
    error: Option<String>,
    selected: usize,
}

impl GeoResultSet {
    pub fn new(results: Vec<GeoQueryResult>) -> Self {
        Self { results, error: None, selected: 0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A failed query: no candidates, with the provider's message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { results: Vec::new(), error: Some(message.into()), selected: 0 }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// No error and at least one candidate.
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && !self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoQueryResult> {
        self.results.iter()
    }

    pub fn get(&self, index: usize) -> Option<&GeoQueryResult> {
        self.results.get(index)
    }

    /// Make another candidate the selected one. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.results.len() {
            self.selected = index;
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected candidate, if the set is not empty.
    pub fn current(&self) -> Option<&GeoQueryResult> {
        self.results.get(self.selected)
    }

    pub fn kind(&self) -> Option<&str> {
        self.current().and_then(GeoQueryResult::kind)
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.current().and_then(|r| r.bbox)
    }

    pub fn center(&self) -> Option<LonLat> {
        self.current().and_then(|r| r.center)
    }
}

impl<'a> IntoIterator for &'a GeoResultSet {
    type Item = &'a GeoQueryResult;
    type IntoIter = std::slice::Iter<'a, GeoQueryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl fmt::Display for GeoResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => write!(f, "<[ERROR - {}]>", error),
            None if self.results.is_empty() => write!(f, "<[ERROR - No results found]>"),
            None => write!(
                f,
                "<[OK] {} result(s), #{} {}>",
                self.results.len(),
                self.selected + 1,
                self.kind().unwrap_or("unclassified")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: &str) -> GeoQueryResult {
        GeoQueryResult::new(kind)
            .with_bbox(BoundingBox::new(LonLat::new(1.0, 2.0), LonLat::new(0.0, 0.0)))
    }

    #[test]
    fn test_selection_drives_accessors() {
        let mut set = GeoResultSet::new(vec![candidate("city"), candidate("country")]);
        assert_eq!(set.kind(), Some("city"));
        set.select(1);
        assert_eq!(set.kind(), Some("country"));
        set.select(7);
        assert_eq!(set.selected_index(), 1);
    }

    #[test]
    fn test_failed_set_is_not_ok() {
        let set = GeoResultSet::failed("quota exceeded");
        assert!(!set.is_ok());
        assert!(set.current().is_none());
        assert_eq!(set.error(), Some("quota exceeded"));
        assert_eq!(set.to_string(), "<[ERROR - quota exceeded]>");

        assert!(!GeoResultSet::empty().is_ok());
        assert!(GeoResultSet::new(vec![candidate("state")]).is_ok());
    }

    #[test]
    fn test_iso_code_component() {
        let nl = CountryCode::from_static("NL");
        let result = GeoQueryResult::new("state").with_iso_code(&nl);
        assert_eq!(result.iso_code(), Some(nl));
        let lowercase = GeoQueryResult::new("state").with_component(COMPONENT_ISO_CODE, "nl");
        assert_eq!(lowercase.iso_code(), Some(nl));
        assert_eq!(GeoQueryResult::new("state").iso_code(), None);
    }
}
