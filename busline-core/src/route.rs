//! Computed route geometry and what the map ends up drawing.
//!
//! A [`RoutePath`] is what a routing provider returns: the full road
//! geometry plus distance and duration. A [`RouteResult`] is what the editing
//! session displays, which is either a provider path or a straight-line
//! fallback without metrics.

use std::time::Duration;

use crate::{LatLng, LngLat};

/// Distance and duration of a computed route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteMetrics {
    /// Total travel distance in metres.
    pub distance_meters: f64,
    /// Total travel time in seconds.
    pub duration_seconds: f64,
}

impl RouteMetrics {
    /// Travel time as a [`Duration`]. Negative or non-finite values map to
    /// zero.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_seconds).unwrap_or(Duration::ZERO)
    }
}

/// A road-following path returned by a routing provider.
///
/// # Examples
/// ```
/// use busline_core::{LatLng, RoutePath};
///
/// let path = RoutePath::new(
///     vec![LatLng::new(21.0285, 105.8542), LatLng::new(21.0315, 105.8612)],
///     850.0,
///     120.0,
/// );
/// assert_eq!(path.points.len(), 2);
/// assert_eq!(path.metrics().duration().as_secs(), 120);
/// assert!(RoutePath::empty().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePath {
    /// Geometry in display order, as delivered by the provider.
    pub points: Vec<LatLng>,
    /// Total travel distance in metres.
    pub distance_meters: f64,
    /// Total travel time in seconds.
    pub duration_seconds: f64,
}

impl RoutePath {
    /// Construct a path from display-order points and its metrics.
    #[must_use]
    pub const fn new(points: Vec<LatLng>, distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            points,
            distance_meters,
            duration_seconds,
        }
    }

    /// Build a path from provider geometry in wire order.
    pub fn from_wire<I>(geometry: I, distance_meters: f64, duration_seconds: f64) -> Self
    where
        I: IntoIterator<Item = LngLat>,
    {
        Self::new(
            geometry.into_iter().map(LngLat::to_lat_lng).collect(),
            distance_meters,
            duration_seconds,
        )
    }

    /// A path with no points, returned when fewer than two waypoints were
    /// requested.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), 0.0, 0.0)
    }

    /// Whether the path has no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance and duration of the path.
    #[must_use]
    pub const fn metrics(&self) -> RouteMetrics {
        RouteMetrics {
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
        }
    }
}

/// The route currently shown for an editing session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    /// Points to draw, in display order.
    pub path: Vec<LatLng>,
    /// Metrics of a provider route; `None` for a straight-line fallback.
    pub metrics: Option<RouteMetrics>,
}

impl RouteResult {
    /// Display a provider route.
    #[must_use]
    pub fn routed(path: RoutePath) -> Self {
        let metrics = path.metrics();
        Self {
            path: path.points,
            metrics: Some(metrics),
        }
    }

    /// Display straight segments through `waypoints` with no metrics.
    #[must_use]
    pub fn straight_line(waypoints: &[LngLat]) -> Self {
        Self {
            path: waypoints.iter().copied().map(LngLat::to_lat_lng).collect(),
            metrics: None,
        }
    }

    /// Whether this is the degraded straight-line rendering.
    #[must_use]
    pub const fn is_straight_line(&self) -> bool {
        self.metrics.is_none()
    }
}
