//! Per-country override routines.
//!
//! Some countries cannot be geocoded reliably with a single query: dispersed
//! island groups, overseas territories inflating the box, or names with
//! several conflicting candidates. Each such country maps to an
//! [`OverrideStrategy`] that replaces the generic decision path entirely.

use countrygeo_core::models::{Axis, BoundingBox, CountryCode, CountryGeoRecord, Corner, LonLat};
use std::collections::BTreeMap;

use crate::error::ReconcileError;

/// How a sub-query picks its candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Single-result query, use the provider's first answer
    Default,
    /// First candidate with this classification among multiple results
    Kind(String),
    /// First candidate carrying this component among multiple results
    HasComponent(String),
}

/// Copy one corner (or one axis of it) from the sub-query's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerEdit {
    pub corner: Corner,
    pub axis: Option<Axis>,
}

impl CornerEdit {
    pub const fn new(corner: Corner, axis: Option<Axis>) -> Self {
        Self { corner, axis }
    }

    fn covers(&self, corner: Corner, axis: Axis) -> bool {
        self.corner == corner && self.axis.map_or(true, |a| a == axis)
    }
}

/// Query for a named sub-region of the country
#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    pub region: String,
    pub selector: Selector,
    pub edits: Vec<CornerEdit>,
    /// Use this sub-region's center as the country center
    pub take_center: bool,
}

impl SubQuery {
    pub fn new(region: impl Into<String>, selector: Selector) -> Self {
        Self {
            region: region.into(),
            selector,
            edits: Vec::new(),
            take_center: false,
        }
    }

    pub fn edit(mut self, corner: Corner, axis: Option<Axis>) -> Self {
        self.edits.push(CornerEdit::new(corner, axis));
        self
    }

    pub fn with_center(mut self) -> Self {
        self.take_center = true;
        self
    }
}

/// Where a composite override gets its center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CenterRule {
    /// Curated geographic center
    Fixed(LonLat),
    /// Center of the sub-query marked `take_center`
    FromSubQuery,
    /// Midpoint of the composed box
    Midpoint,
}

/// Replacement for the generic decision path of one country
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideStrategy {
    /// Box composed from sub-region queries
    Composite {
        sub_queries: Vec<SubQuery>,
        center: CenterRule,
    },
    /// Hard-coded box and center
    Fixed(CountryGeoRecord),
    /// Unconstrained query; among `country` candidates keep the one reaching furthest north
    Northernmost { query: String },
}

impl OverrideStrategy {
    /// Check the entry can produce a complete record
    pub fn validate(&self, code: &CountryCode) -> Result<(), ReconcileError> {
        let misconfigured = |reason: String| ReconcileError::Misconfiguration { code: *code, reason };

        match self {
            OverrideStrategy::Composite { sub_queries, center } => {
                for corner in [Corner::NorthEast, Corner::SouthWest] {
                    for axis in [Axis::Longitude, Axis::Latitude] {
                        let covered = sub_queries
                            .iter()
                            .flat_map(|q| q.edits.iter())
                            .any(|e| e.covers(corner, axis));
                        if !covered {
                            return Err(misconfigured(format!(
                                "no sub-query sets the {:?} {:?}",
                                corner, axis
                            )));
                        }
                    }
                }
                if sub_queries.iter().any(|q| q.region.trim().is_empty()) {
                    return Err(misconfigured("sub-query with an empty region name".to_string()));
                }
                match center {
                    CenterRule::Fixed(point) if !in_range(point) => {
                        Err(misconfigured(format!("center {:?} is out of range", point)))
                    }
                    CenterRule::FromSubQuery if !sub_queries.iter().any(|q| q.take_center) => {
                        Err(misconfigured("no sub-query provides the center".to_string()))
                    }
                    _ => Ok(()),
                }
            }
            OverrideStrategy::Fixed(record) => {
                let points = [record.bbox.northeast, record.bbox.southwest, record.center];
                match points.iter().find(|p| !in_range(p)) {
                    Some(point) => Err(misconfigured(format!("{:?} is out of range", point))),
                    None => Ok(()),
                }
            }
            OverrideStrategy::Northernmost { query } if query.trim().is_empty() => {
                Err(misconfigured("empty disambiguation query".to_string()))
            }
            OverrideStrategy::Northernmost { .. } => Ok(()),
        }
    }
}

fn in_range(point: &LonLat) -> bool {
    matches!(
        (point.lon(), point.lat()),
        (Some(lon), Some(lat)) if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
    )
}

/// Closed mapping of country codes to override strategies
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<CountryCode, OverrideStrategy>,
}

impl OverrideTable {
    /// Table without overrides
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: CountryCode, strategy: OverrideStrategy) {
        self.entries.insert(code, strategy);
    }

    pub fn with(mut self, code: CountryCode, strategy: OverrideStrategy) -> Self {
        self.insert(code, strategy);
        self
    }

    pub fn get(&self, code: &CountryCode) -> Option<&OverrideStrategy> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.entries.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &CountryCode> {
        self.entries.keys()
    }

    /// Validate every entry
    pub fn validate(&self) -> Result<(), ReconcileError> {
        self.entries
            .iter()
            .try_for_each(|(code, strategy)| strategy.validate(code))
    }

    /// The maintained overrides
    pub fn builtin() -> Self {
        use Axis::{Latitude as LAT, Longitude as LON};
        use Corner::{NorthEast as NE, SouthWest as SW};

        let state = || Selector::Kind("state".to_string());
        let region = |name: &str| SubQuery::new(name, Selector::Default);
        let composite = |sub_queries: Vec<SubQuery>, center: CenterRule| OverrideStrategy::Composite {
            sub_queries,
            center,
        };
        let fixed_center = |lon: f64, lat: f64| CenterRule::Fixed(LonLat::new(lon, lat));
        let cc = CountryCode::from_static;

        let mut table = Self::empty();

        // Mainland plus Tasmania
        table.insert(
            cc("AU"),
            composite(
                vec![
                    SubQuery::new("Queensland", state()).edit(NE, None),
                    SubQuery::new("Western Australia", state()).edit(SW, Some(LON)),
                    SubQuery::new("Tasmania", Selector::HasComponent("island".to_string()))
                        .edit(SW, Some(LAT)),
                ],
                fixed_center(134.354806, -25.610111),
            ),
        );

        // Without the Pacific islands
        table.insert(
            cc("CL"),
            composite(
                vec![
                    region("Provincia de la Antártica Chilena")
                        .edit(NE, Some(LON))
                        .edit(SW, Some(LAT)),
                    region("Región Aysén del General Carlos Ibáñez del Campo").edit(SW, Some(LON)),
                    region("Región de Arica y Parinacota").edit(NE, Some(LAT)),
                ],
                fixed_center(-71.312389, -35.697472),
            ),
        );

        // Without the Galápagos
        table.insert(
            cc("EC"),
            composite(
                vec![
                    region("Orellana").edit(NE, Some(LON)),
                    region("Manabí").edit(SW, Some(LON)),
                    SubQuery::new("Esmeraldas", state()).edit(NE, Some(LAT)),
                    region("Zamora-Chinchipe").edit(SW, Some(LAT)),
                ],
                CenterRule::Midpoint,
            ),
        );

        // Mainland Spain only
        table.insert(
            cc("ES"),
            composite(
                vec![
                    SubQuery::new("Galicia", state()).edit(NE, Some(LAT)).edit(SW, Some(LON)),
                    region("Cataluña").edit(NE, Some(LON)),
                    region("Andalucía").edit(SW, Some(LAT)),
                ],
                fixed_center(-3.684234, 40.30926),
            ),
        );

        // The city, not the maritime zone
        table.insert(
            cc("MC"),
            composite(
                vec![SubQuery::new("Monaco", Selector::Kind("city".to_string()))
                    .edit(NE, None)
                    .edit(SW, None)
                    .with_center()],
                CenterRule::FromSubQuery,
            ),
        );

        // Mainland Norway only
        table.insert(
            cc("NO"),
            composite(
                vec![
                    region("Finnmark").edit(NE, None),
                    region("Rogaland").edit(SW, Some(LON)),
                    region("Vest-Agder").edit(SW, Some(LAT)),
                ],
                fixed_center(12.307778, 63.990556),
            ),
        );

        // Mainland Portugal only
        table.insert(
            cc("PT"),
            composite(
                vec![
                    region("Terras de Trás-os-Montes").edit(NE, Some(LON)),
                    region("Alto Minho").edit(NE, Some(LAT)),
                    region("Área Metropolitana de Lisboa").edit(SW, Some(LON)),
                    region("Algarve").edit(SW, Some(LAT)),
                ],
                fixed_center(-8.130573, 39.694502),
            ),
        );

        // Without Pedra Branca
        table.insert(
            cc("SG"),
            composite(
                vec![
                    region("South East Community Development Council").edit(NE, Some(LON)),
                    region("North West Community Development Council").edit(NE, Some(LAT)),
                    region("South West Community Development Council").edit(SW, None),
                ],
                fixed_center(103.8, 1.366667),
            ),
        );

        // Provider box is wrong and no atoll geocodes reliably
        table.insert(
            cc("TV"),
            OverrideStrategy::Fixed(CountryGeoRecord::new(
                BoundingBox::new(LonLat::new(179.871061, -5.64223), LonLat::new(176.078332, -10.791658)),
                LonLat::new(179.198333, -8.521111),
            )),
        );

        // Contiguous states
        table.insert(
            cc("US"),
            composite(
                vec![
                    region("Maine").edit(NE, Some(LON)),
                    region("Minnesota").edit(NE, Some(LAT)),
                    region("California").edit(SW, Some(LON)),
                    region("Florida").edit(SW, Some(LAT)),
                ],
                fixed_center(-98.583333, 39.833333),
            ),
        );

        table.insert(
            cc("VN"),
            composite(
                vec![
                    region("Đông Bắc").edit(NE, Some(LAT)),
                    region("Tây Bắc").edit(SW, Some(LON)),
                    region("Đồng Bằng Sông Cửu Long").edit(SW, Some(LAT)),
                    region("Duyên Hải Nam Trung Bộ").edit(NE, Some(LON)),
                ],
                fixed_center(107.579167, 16.466667),
            ),
        );

        // Two conflicting `country` candidates for the same name
        for (code, query) in [
            ("CY", "Cyprus"),
            ("JE", "Jersey"),
            ("MY", "Malaysia"),
            ("PG", "Papua New Guinea"),
            ("SY", "Syria"),
        ] {
            table.insert(
                cc(code),
                OverrideStrategy::Northernmost { query: query.to_string() },
            );
        }

        table
    }
}
