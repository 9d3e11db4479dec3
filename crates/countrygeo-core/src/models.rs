pub mod country;
pub mod geocode;
pub mod geometry;
pub mod table;

pub use country::{all_countries, country_name, known_country, CountryCode};
pub use geocode::{GeoQueryResult, GeoResultSet, COMPONENT_ISO_CODE, COMPONENT_TYPE};
pub use geometry::{Axis, BoundingBox, Corner, CountryGeoRecord, LonLat};
pub use table::GeoTable;
