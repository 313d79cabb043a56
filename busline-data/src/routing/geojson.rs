//! `GeoJSON` geometry shared by the backend response types.

use busline_core::LngLat;
use serde::Deserialize;

/// A `GeoJSON` `LineString`; positions are `[lng, lat]`.
#[derive(Debug, Default, Deserialize)]
pub struct LineString {
    /// Positions in wire order.
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    /// Positions as typed wire-order points.
    pub fn into_points(self) -> impl Iterator<Item = LngLat> {
        self.coordinates.into_iter().map(LngLat::from_pair)
    }
}
