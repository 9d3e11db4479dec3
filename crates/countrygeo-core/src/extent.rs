//! Padded country extents for map viewports.
//!
//! Map widgets open on a country's bounding box grown by a small buffer so
//! that border places are not drawn on the very edge of the view.

use crate::models::geometry::{BoundingBox, CountryGeoRecord, LonLat};
use crate::models::{CountryCode, GeoTable};

const DEFAULT_BUFFER: f64 = 0.1;
const TINY_BUFFER: f64 = 0.01;

/// Coordinates beyond this (in absolute value) are left unpadded.
const ANTIMERIDIAN_GUARD: f64 = 179.9;

/// Which countries get which buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferPolicy {
    /// Countries small enough that a 0.1° buffer would dwarf them
    pub tiniest: Vec<CountryCode>,
    /// Countries whose extent is used as-is
    pub no_buffer: Vec<CountryCode>,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            tiniest: codes(&[
                "AD", "AI", "BL", "BM", "GI", "KN", "LI", "MC", "MF", "MO", "MS", "MT", "NR", "SM",
                "SX", "TV", "VA", "VG",
            ]),
            no_buffer: codes(&["AQ", "FJ", "KI", "NZ", "RU"]),
        }
    }
}

fn codes(list: &[&'static str]) -> Vec<CountryCode> {
    list.iter().map(|&c| CountryCode::from_static(c)).collect()
}

impl BufferPolicy {
    /// Buffer in degrees for a country
    pub fn buffer_for(&self, code: &CountryCode) -> f64 {
        if self.no_buffer.contains(code) {
            0.0
        } else if self.tiniest.contains(code) {
            TINY_BUFFER
        } else {
            DEFAULT_BUFFER
        }
    }
}

/// The country's record with its bounding box padded and rounded outward to 3 decimals.
///
/// Returns `None` for unknown countries and for records with undetermined coordinates.
pub fn buffered_extent(
    table: &GeoTable,
    code: &CountryCode,
    policy: &BufferPolicy,
) -> Option<CountryGeoRecord> {
    let record = table.get(code)?;
    if !record.bbox.is_determined() {
        return None;
    }
    let buffer = policy.buffer_for(code);

    let grow = |c: f64| if c < ANTIMERIDIAN_GUARD { c + buffer } else { c };
    let shrink = |c: f64| if c > -ANTIMERIDIAN_GUARD { c - buffer } else { c };
    let ne = record.bbox.northeast;
    let sw = record.bbox.southwest;

    let bbox = BoundingBox::new(
        LonLat(ne.0.map(|c| ceil3(grow(c))), ne.1.map(|c| ceil3(grow(c)))),
        LonLat(sw.0.map(|c| floor3(shrink(c))), sw.1.map(|c| floor3(shrink(c)))),
    );
    Some(CountryGeoRecord::new(bbox, record.center))
}

fn ceil3(value: f64) -> f64 {
    (value * 1000.0).ceil() / 1000.0
}

fn floor3(value: f64) -> f64 {
    (value * 1000.0).floor() / 1000.0
}
