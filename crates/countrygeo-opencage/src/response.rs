//! OpenCage response bodies and their conversion to candidates.

use countrygeo_core::models::{BoundingBox, GeoQueryResult, GeoResultSet, LonLat};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Response from the OpenCage geocoding API
#[derive(Debug, Deserialize)]
pub struct OpenCageResponse {
    #[serde(default)]
    pub results: Vec<OpenCageResult>,
    pub status: Option<OpenCageStatus>,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageStatus {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageResult {
    #[serde(default)]
    pub components: Map<String, Value>,
    pub bounds: Option<OpenCageBounds>,
    pub geometry: Option<OpenCagePoint>,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageBounds {
    pub northeast: OpenCagePoint,
    pub southwest: OpenCagePoint,
}

/// OpenCage reports points as latitude/longitude objects
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OpenCagePoint {
    pub lat: f64,
    pub lng: f64,
}

impl From<OpenCagePoint> for LonLat {
    fn from(p: OpenCagePoint) -> Self {
        LonLat::new(p.lng, p.lat)
    }
}

/// Convert a decoded response into a result set.
///
/// A status other than 200 becomes an error set carrying the provider's message.
pub fn into_result_set(response: OpenCageResponse) -> GeoResultSet {
    if let Some(status) = &response.status {
        if status.code != 200 {
            return GeoResultSet::failed(status.message.clone());
        }
    }

    let results = response
        .results
        .into_iter()
        .map(|r| GeoQueryResult {
            bbox: r.bounds.map(|b| BoundingBox::new(b.northeast.into(), b.southwest.into())),
            center: r.geometry.map(LonLat::from),
            components: r.components,
        })
        .collect();
    GeoResultSet::new(results)
}
