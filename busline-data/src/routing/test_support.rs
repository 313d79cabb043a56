//! Test utilities for routing providers.
//!
//! This module provides [`StubRoutingProvider`], a deterministic test double
//! for [`RoutingProvider`] that returns pre-configured responses without
//! making HTTP requests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use busline_core::{LngLat, RouteOptions, RoutePath, RoutingError, RoutingProvider, needs_route};

/// Stub `RoutingProvider` for testing.
///
/// # Example
///
/// ```
/// use busline_core::{LngLat, RouteOptions, RoutePath, RoutingProvider};
/// use busline_data::routing::test_support::StubRoutingProvider;
///
/// let waypoints = [LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)];
/// let provider = StubRoutingProvider::with_path(RoutePath::from_wire(waypoints, 10.0, 2.0));
///
/// let path = provider.compute_route(&waypoints, &RouteOptions::default())?;
/// assert_eq!(path.distance_meters, 10.0);
/// assert_eq!(provider.calls(), 1);
/// # Ok::<(), busline_core::RoutingError>(())
/// ```
#[derive(Debug)]
pub struct StubRoutingProvider {
    response: StubResponse,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<LngLat>>>,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Path(RoutePath),
    Echo,
    Error(RoutingError),
}

impl StubRoutingProvider {
    fn from_response(response: StubResponse) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns `path` for any routable input.
    #[must_use]
    pub fn with_path(path: RoutePath) -> Self {
        Self::from_response(StubResponse::Path(path))
    }

    /// Create a provider that echoes the waypoints with zero metrics.
    #[must_use]
    pub fn echo() -> Self {
        Self::from_response(StubResponse::Echo)
    }

    /// Create a provider that returns the given error.
    ///
    /// Fewer than two waypoints still yield an empty path.
    #[must_use]
    pub fn with_error(error: RoutingError) -> Self {
        Self::from_response(StubResponse::Error(error))
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of routable requests answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Waypoint lists received so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<LngLat>> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl RoutingProvider for StubRoutingProvider {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        _options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        if !needs_route(waypoints) {
            return Ok(RoutePath::empty());
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(waypoints.to_vec());
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.response {
            StubResponse::Path(path) => Ok(path.clone()),
            StubResponse::Echo => Ok(RoutePath::from_wire(waypoints.iter().copied(), 0.0, 0.0)),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn waypoints() -> Vec<LngLat> {
        vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]
    }

    #[rstest]
    fn with_error_returns_configured_error() {
        let provider = StubRoutingProvider::with_error(RoutingError::NetworkError {
            url: "http://example.com".to_owned(),
            message: "connection refused".to_owned(),
        });

        let err = provider
            .compute_route(&waypoints(), &RouteOptions::default())
            .expect_err("should fail");

        assert!(matches!(err, RoutingError::NetworkError { .. }));
        assert_eq!(provider.requests(), vec![waypoints()]);
    }

    #[rstest]
    fn short_input_is_not_counted() {
        let provider = StubRoutingProvider::echo();

        let path = provider
            .compute_route(&waypoints()[..1], &RouteOptions::default())
            .expect("should succeed");

        assert!(path.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
