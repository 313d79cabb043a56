//! Coordinates with an explicit axis order.
//!
//! Map widgets speak latitude first while routing services speak longitude
//! first. [`LatLng`] and [`LngLat`] keep the two orders apart at the type
//! level; crossing between them always goes through [`LatLng::to_lng_lat`] or
//! [`LngLat::to_lat_lng`].
//!
//! # Examples
//! ```
//! use busline_core::{LatLng, LngLat};
//!
//! let school = LatLng::new(21.0285, 105.8542);
//! let wire = school.to_lng_lat();
//! assert_eq!(wire.to_pair(), [105.8542, 21.0285]);
//! assert_eq!(wire.to_lat_lng(), school);
//! ```

use std::fmt;

use geo::{Coord, Point};

/// A position in display order: latitude, then longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    /// Latitude in decimal degrees.
    #[cfg_attr(feature = "serde", serde(rename = "latitude", alias = "lat"))]
    pub lat: f64,
    /// Longitude in decimal degrees.
    #[cfg_attr(feature = "serde", serde(rename = "longitude", alias = "lng"))]
    pub lng: f64,
}

impl LatLng {
    /// Construct a display-order coordinate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to the routing wire order.
    #[must_use]
    pub const fn to_lng_lat(self) -> LngLat {
        LngLat {
            lng: self.lng,
            lat: self.lat,
        }
    }

    /// Whether both axes are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A position in routing wire order: longitude, then latitude.
///
/// This is the order OSRM, Mapbox and OpenRouteService use both in URLs and
/// in GeoJSON geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LngLat {
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl LngLat {
    /// Construct a wire-order coordinate.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Read a `[lng, lat]` pair as found in GeoJSON geometry.
    #[must_use]
    pub const fn from_pair(pair: [f64; 2]) -> Self {
        let [lng, lat] = pair;
        Self { lng, lat }
    }

    /// Write the coordinate as a `[lng, lat]` pair.
    #[must_use]
    pub const fn to_pair(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Convert to display order.
    #[must_use]
    pub const fn to_lat_lng(self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Formats as `lng,lat`, the segment syntax used in routing URLs.
impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

impl From<LngLat> for Point<f64> {
    fn from(value: LngLat) -> Self {
        Self::new(value.lng, value.lat)
    }
}

impl From<LngLat> for Coord<f64> {
    fn from(value: LngLat) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<LatLng> for Point<f64> {
    fn from(value: LatLng) -> Self {
        value.to_lng_lat().into()
    }
}
