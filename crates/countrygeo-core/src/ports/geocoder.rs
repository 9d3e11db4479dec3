use crate::models::{CountryCode, GeoResultSet};

/// Port for free-text geocoding lookups
pub trait Geocoder: Send + Sync {
    /// Geocode a free-text query
    ///
    /// # Arguments
    /// * `query` - Place name to look up
    /// * `country` - Restrict candidates to this country, or search the whole world
    /// * `multiple` - Ask for several candidates instead of the single best match
    ///
    /// # Returns
    /// Zero or more classified candidates. Failures (network, quota, invalid
    /// key) are reported through `GeoResultSet::error`, never as a panic.
    fn geocode(&self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet;

    /// Provider identifier for diagnostics
    fn provider_name(&self) -> &str;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet {
        (**self).geocode(query, country, multiple)
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet {
        (**self).geocode(query, country, multiple)
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}
