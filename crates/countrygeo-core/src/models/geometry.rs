//! Coordinates, bounding boxes and per-country geodata records.
//!
//! All coordinate pairs are (longitude, latitude). Components may be unknown,
//! which serialises as `null`; a record with any unknown component is not
//! "determined" and must never be written as a successful result.

use serde::{Deserialize, Serialize};

/// Position inside a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Index 0: east/west
    Longitude,
    /// Index 1: north/south
    Latitude,
}

/// Corner of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    NorthEast,
    SouthWest,
}

/// A (longitude, latitude) pair with optional components.
///
/// Serialises as a two-element array, e.g. `[4.46, 51.92]` or `[null, null]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat(pub Option<f64>, pub Option<f64>);

impl LonLat {
    pub const UNKNOWN: LonLat = LonLat(None, None);

    pub fn new(lon: f64, lat: f64) -> Self {
        Self(Some(lon), Some(lat))
    }

    pub fn lon(&self) -> Option<f64> {
        self.0
    }

    pub fn lat(&self) -> Option<f64> {
        self.1
    }

    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Longitude => self.0,
            Axis::Latitude => self.1,
        }
    }

    pub fn set(&mut self, axis: Axis, value: Option<f64>) {
        match axis {
            Axis::Longitude => self.0 = value,
            Axis::Latitude => self.1 = value,
        }
    }

    /// Both components are known.
    pub fn is_determined(&self) -> bool {
        self.0.is_some() && self.1.is_some()
    }

    pub fn to_coord(&self) -> Option<geo::Coord<f64>> {
        Some(geo::Coord { x: self.0?, y: self.1? })
    }
}

impl From<geo::Coord<f64>> for LonLat {
    fn from(c: geo::Coord<f64>) -> Self {
        LonLat::new(c.x, c.y)
    }
}

/// Rectangle in longitude/latitude space, given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub northeast: LonLat,
    pub southwest: LonLat,
}

impl BoundingBox {
    pub const UNKNOWN: BoundingBox =
        BoundingBox { northeast: LonLat::UNKNOWN, southwest: LonLat::UNKNOWN };

    pub fn new(northeast: LonLat, southwest: LonLat) -> Self {
        Self { northeast, southwest }
    }

    pub fn corner(&self, corner: Corner) -> &LonLat {
        match corner {
            Corner::NorthEast => &self.northeast,
            Corner::SouthWest => &self.southwest,
        }
    }

    pub fn corner_mut(&mut self, corner: Corner) -> &mut LonLat {
        match corner {
            Corner::NorthEast => &mut self.northeast,
            Corner::SouthWest => &mut self.southwest,
        }
    }

    /// Copy one axis of a corner, or the whole corner when `axis` is `None`.
    pub fn copy_from(&mut self, source: &LonLat, corner: Corner, axis: Option<Axis>) {
        let target = self.corner_mut(corner);
        match axis {
            Some(axis) => target.set(axis, source.get(axis)),
            None => *target = *source,
        }
    }

    /// All four components are known.
    pub fn is_determined(&self) -> bool {
        self.northeast.is_determined() && self.southwest.is_determined()
    }

    pub fn to_rect(&self) -> Option<geo::Rect<f64>> {
        Some(geo::Rect::new(self.southwest.to_coord()?, self.northeast.to_coord()?))
    }

    /// Midpoint of the box, rounded to 7 decimal places.
    pub fn midpoint(&self) -> Option<LonLat> {
        let center = self.to_rect()?.center();
        Some(LonLat::new(round_to(center.x, 7), round_to(center.y, 7)))
    }
}

/// Geodata persisted for one country.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CountryGeoRecord {
    pub bbox: BoundingBox,
    pub center: LonLat,
}

impl CountryGeoRecord {
    pub fn new(bbox: BoundingBox, center: LonLat) -> Self {
        Self { bbox, center }
    }

    pub fn is_determined(&self) -> bool {
        self.bbox.is_determined() && self.center.is_determined()
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
