//! Routing provider trait shared by the HTTP backends and the mock generator.

use std::sync::Arc;

use crate::{LngLat, RoutePath};

use super::{RouteOptions, RoutingError};

/// Minimum number of waypoints that describes a route.
pub const MIN_WAYPOINTS: usize = 2;

/// Whether `waypoints` is long enough to ask a provider for a route.
///
/// # Examples
/// ```
/// use busline_core::{LngLat, needs_route};
///
/// assert!(!needs_route(&[LngLat::new(0.0, 0.0)]));
/// assert!(needs_route(&[LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]));
/// ```
#[must_use]
pub const fn needs_route(waypoints: &[LngLat]) -> bool {
    waypoints.len() >= MIN_WAYPOINTS
}

/// Compute a single best route through ordered waypoints.
///
/// Implementers must preserve the provider's point order and return the
/// geometry in display order. When fewer than [`MIN_WAYPOINTS`] waypoints
/// are supplied they must return [`RoutePath::empty`] rather than an error.
///
/// # Examples
///
/// ```rust
/// use busline_core::{LngLat, RouteOptions, RoutePath, RoutingError, RoutingProvider, needs_route};
///
/// struct Straight;
///
/// impl RoutingProvider for Straight {
///     fn compute_route(
///         &self,
///         waypoints: &[LngLat],
///         _options: &RouteOptions,
///     ) -> Result<RoutePath, RoutingError> {
///         if !needs_route(waypoints) {
///             return Ok(RoutePath::empty());
///         }
///         Ok(RoutePath::from_wire(waypoints.iter().copied(), 0.0, 0.0))
///     }
/// }
///
/// let waypoints = [LngLat::new(105.85, 21.02), LngLat::new(105.86, 21.03)];
/// let path = Straight.compute_route(&waypoints, &RouteOptions::default())?;
/// assert_eq!(path.points.len(), 2);
/// assert_eq!(path.points[0].lat, 21.02);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait RoutingProvider {
    /// Return the route through `waypoints` in the given order.
    ///
    /// # Errors
    ///
    /// Returns a [`RoutingError`] when the backend cannot produce a route.
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError>;
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for &P {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        (**self).compute_route(waypoints, options)
    }
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for Box<P> {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        (**self).compute_route(waypoints, options)
    }
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for Arc<P> {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        (**self).compute_route(waypoints, options)
    }
}
