//! Deterministic routing providers for unit and behaviour tests.

use std::cell::Cell;

use crate::distance::straight_line_meters;
use crate::{LngLat, RouteOptions, RoutePath, RoutingError, RoutingProvider, needs_route};

/// Provider that echoes the waypoints as the route geometry.
///
/// Distance is the straight-line length; duration is one second per metre
/// so assertions stay simple.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLineProvider;

impl RoutingProvider for StraightLineProvider {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        _options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        if !needs_route(waypoints) {
            return Ok(RoutePath::empty());
        }
        let distance = straight_line_meters(waypoints);
        Ok(RoutePath::from_wire(
            waypoints.iter().copied(),
            distance,
            distance,
        ))
    }
}

/// Provider that fails every request with a fixed error.
#[derive(Debug, Clone)]
pub struct FailingRoutingProvider {
    error: RoutingError,
}

impl FailingRoutingProvider {
    /// Fail with `error`.
    #[must_use]
    pub const fn with_error(error: RoutingError) -> Self {
        Self { error }
    }

    /// Fail with [`RoutingError::NoRoute`].
    #[must_use]
    pub const fn no_route() -> Self {
        Self::with_error(RoutingError::NoRoute)
    }
}

impl RoutingProvider for FailingRoutingProvider {
    fn compute_route(
        &self,
        _waypoints: &[LngLat],
        _options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        Err(self.error.clone())
    }
}

/// Wraps a provider and counts how often it is called.
#[derive(Debug, Default)]
pub struct CountingProvider<P> {
    inner: P,
    calls: Cell<usize>,
}

impl<P> CountingProvider<P> {
    /// Count calls made to `inner`.
    pub const fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    /// Number of `compute_route` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<P: RoutingProvider> RoutingProvider for CountingProvider<P> {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.compute_route(waypoints, options)
    }
}
