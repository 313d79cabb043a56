//! Answer with a mock route when the primary backend fails.

use busline_core::{
    LngLat, MockRouteGenerator, RouteOptions, RoutePath, RoutingError, RoutingProvider,
};

/// Wraps a provider and substitutes a [`MockRouteGenerator`] path for any
/// failure.
///
/// The substituted path carries estimated metrics, so the session displays it
/// as a regular route. Leave this off when callers must tell real routes
/// from estimates.
#[derive(Debug, Clone)]
pub struct FallbackRoutingProvider<P> {
    primary: P,
    fallback: MockRouteGenerator,
}

impl<P> FallbackRoutingProvider<P> {
    /// Fall back from `primary` to `fallback`.
    pub const fn new(primary: P, fallback: MockRouteGenerator) -> Self {
        Self { primary, fallback }
    }

    /// The wrapped provider.
    pub const fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: RoutingProvider> RoutingProvider for FallbackRoutingProvider<P> {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        let path = self
            .primary
            .compute_route(waypoints, options)
            .unwrap_or_else(|err| {
                log::warn!("routing provider failed, using mock route: {err}");
                self.fallback.generate(waypoints)
            });
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::test_support::StubRoutingProvider;
    use rstest::rstest;

    fn waypoints() -> Vec<LngLat> {
        vec![LngLat::new(105.8542, 21.0285), LngLat::new(105.8612, 21.0315)]
    }

    #[rstest]
    fn success_passes_through() {
        let expected = RoutePath::from_wire(waypoints(), 900.0, 120.0);
        let provider = FallbackRoutingProvider::new(
            StubRoutingProvider::with_path(expected.clone()),
            MockRouteGenerator::default(),
        );
        let path = provider
            .compute_route(&waypoints(), &RouteOptions::default())
            .expect("primary succeeds");
        assert_eq!(path, expected);
    }

    #[rstest]
    fn failure_uses_mock_route() {
        let mock = MockRouteGenerator::with_seed(3);
        let provider = FallbackRoutingProvider::new(
            StubRoutingProvider::with_error(RoutingError::Timeout {
                url: "http://osrm.example.com/route/v1/driving".to_owned(),
                timeout_secs: 10,
            }),
            mock,
        );
        let path = provider
            .compute_route(&waypoints(), &RouteOptions::default())
            .expect("fallback always answers");
        assert_eq!(path, mock.generate(&waypoints()));
    }
}
