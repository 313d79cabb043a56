//! Pickup stops and the depot that brackets every route.

use std::fmt;

use crate::LatLng;

/// Fallback school location used when no depot is configured.
pub const DEFAULT_DEPOT_LOCATION: LatLng = LatLng::new(21.0285, 105.8542);

/// Identifier of a [`Stop`], unique within the stop universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StopId(pub u64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StopId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A geocoded pickup or drop-off location.
///
/// Stops come from the student and bus-stop registries and are never
/// modified once loaded.
///
/// # Examples
///
/// ```
/// use busline_core::{LatLng, Stop, StopId};
///
/// let stop = Stop::new(1, "Nguyen Van Nam", LatLng::new(21.0315, 105.8612))
///     .with_address("45 Lang Street");
/// assert_eq!(stop.id, StopId(1));
/// assert_eq!(stop.address, "45 Lang Street");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Unique identifier.
    pub id: StopId,
    /// Display name, usually the student or stop name.
    pub name: String,
    /// Geospatial position.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub location: LatLng,
    /// Postal address shown alongside the marker.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,
}

impl Stop {
    /// Construct a stop without an address.
    pub fn new(id: impl Into<StopId>, name: impl Into<String>, location: LatLng) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            address: String::new(),
        }
    }

    /// Attach a postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

/// The school location every route departs from and returns to.
///
/// # Examples
///
/// ```
/// use busline_core::{DEFAULT_DEPOT_LOCATION, Depot, LatLng};
///
/// assert_eq!(Depot::from_optional(None).location, DEFAULT_DEPOT_LOCATION);
/// let custom = LatLng::new(10.0, 106.0);
/// assert_eq!(Depot::from_optional(Some(custom)).location, custom);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Depot {
    /// Position of the school.
    pub location: LatLng,
}

impl Depot {
    /// Construct a depot at `location`.
    #[must_use]
    pub const fn new(location: LatLng) -> Self {
        Self { location }
    }

    /// Use `location` when supplied, otherwise [`DEFAULT_DEPOT_LOCATION`].
    #[must_use]
    pub fn from_optional(location: Option<LatLng>) -> Self {
        Self::new(location.unwrap_or(DEFAULT_DEPOT_LOCATION))
    }
}

impl Default for Depot {
    fn default() -> Self {
        Self::new(DEFAULT_DEPOT_LOCATION)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn stop_reads_registry_shape() {
        let json = r#"{
            "id": 3,
            "name": "Le Van Hung",
            "latitude": 21.0355,
            "longitude": 105.8585,
            "address": "12 Nguyen Luong Bang"
        }"#;
        let stop: Stop = serde_json::from_str(json).expect("stop should decode");
        assert_eq!(stop.id, StopId(3));
        assert_eq!(stop.location, LatLng::new(21.0355, 105.8585));
    }

    #[rstest]
    fn stop_address_defaults_to_empty() {
        let json = r#"{"id": 1, "name": "A", "lat": 1.0, "lng": 2.0}"#;
        let stop: Stop = serde_json::from_str(json).expect("stop should decode");
        assert!(stop.address.is_empty());
    }

    #[rstest]
    fn depot_is_a_bare_coordinate() {
        let depot: Depot =
            serde_json::from_str(r#"{"latitude": 10.0, "longitude": 106.0}"#).expect("depot");
        assert_eq!(depot.location, LatLng::new(10.0, 106.0));
    }
}
