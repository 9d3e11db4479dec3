//! In-memory geocoder answering from a fixed script.
//!
//! Used by tests to drive the reconciler without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use super::Geocoder;
use crate::models::{CountryCode, GeoResultSet};

/// One recorded geocoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeCall {
    pub query: String,
    pub country: Option<CountryCode>,
    pub multiple: bool,
}

/// Geocoder returning scripted responses keyed by `(query, country)`.
///
/// Unscripted queries answer with an empty result set. Single-result queries
/// only see the first scripted candidate, like a provider called with a limit of one.
#[derive(Debug, Default)]
pub struct ScriptedGeocoder {
    responses: HashMap<(String, Option<CountryCode>), GeoResultSet>,
    calls: Mutex<Vec<GeocodeCall>>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a query, builder style.
    pub fn with_response(
        mut self,
        query: impl Into<String>,
        country: Option<CountryCode>,
        response: GeoResultSet,
    ) -> Self {
        self.respond(query, country, response);
        self
    }

    pub fn respond(
        &mut self,
        query: impl Into<String>,
        country: Option<CountryCode>,
        response: GeoResultSet,
    ) {
        self.responses.insert((query.into(), country), response);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<GeocodeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether a query was issued, regardless of country constraint.
    pub fn was_queried(&self, query: &str) -> bool {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).iter().any(|c| c.query == query)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Geocoder for ScriptedGeocoder {
    fn geocode(&self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(GeocodeCall {
            query: query.to_string(),
            country: country.copied(),
            multiple,
        });

        let Some(response) = self.responses.get(&(query.to_string(), country.copied())) else {
            return GeoResultSet::empty();
        };
        if multiple || response.len() <= 1 {
            return response.clone();
        }
        GeoResultSet::new(response.iter().take(1).cloned().collect())
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoQueryResult;

    #[test]
    fn test_scripted_responses_and_call_log() {
        let es = CountryCode::from_static("ES");
        let geocoder = ScriptedGeocoder::new().with_response(
            "Galicia",
            Some(es),
            GeoResultSet::new(vec![GeoQueryResult::new("city"), GeoQueryResult::new("state")]),
        );

        assert_eq!(geocoder.geocode("Galicia", Some(&es), true).len(), 2);
        assert_eq!(geocoder.geocode("Galicia", Some(&es), false).len(), 1);
        assert!(geocoder.geocode("Galicia", None, true).is_empty());

        let calls = geocoder.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], GeocodeCall { query: "Galicia".into(), country: None, multiple: true });
        assert!(geocoder.was_queried("Galicia"));
        assert!(!geocoder.was_queried("Andalucía"));
    }

    #[test]
    fn test_failed_response_passes_through() {
        let geocoder = ScriptedGeocoder::new().with_response(
            "Tuvalu",
            None,
            GeoResultSet::failed("network error"),
        );
        let result = geocoder.geocode("Tuvalu", None, false);
        assert_eq!(result.error(), Some("network error"));
    }
}
