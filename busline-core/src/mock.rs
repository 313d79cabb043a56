//! Offline route generator for development and provider fallback.
//!
//! The generator draws a smooth-looking path between consecutive waypoints
//! by interpolating intermediate points and nudging each one with a small
//! jitter, so segments do not look ruler-straight on the map. Metrics come
//! from [`crate::distance`]: haversine distance times the road factor, and a
//! fixed average speed.
//!
//! The jitter source is a ChaCha RNG seeded from the generator's seed, so
//! the same waypoints always produce the same path.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::distance::{AVERAGE_SPEED_KMH, estimate_road_meters, travel_seconds};
use crate::{LngLat, RouteOptions, RoutePath, RoutingError, RoutingProvider, needs_route};

/// Number of interpolated points inserted between two waypoints.
pub const INTERMEDIATE_POINTS: RangeInclusive<u32> = 8..=15;

/// Peak-to-peak jitter applied to interpolated longitudes, in degrees.
/// Latitudes receive half of it.
pub const JITTER_DEGREES: f64 = 5e-4;

/// Seed used by [`MockRouteGenerator::default`].
pub const DEFAULT_MOCK_SEED: u64 = 0x5c_4001_b005;

/// Deterministic, network-free [`RoutingProvider`].
///
/// # Examples
/// ```
/// use busline_core::{LngLat, MockRouteGenerator, RouteOptions, RoutingProvider};
///
/// let school = LngLat::new(105.8542, 21.0285);
/// let stop = LngLat::new(105.8612, 21.0315);
/// let path = MockRouteGenerator::default()
///     .compute_route(&[school, stop], &RouteOptions::default())?;
///
/// assert!(path.points.len() >= 10 && path.points.len() <= 17);
/// assert_eq!(path.points.first(), Some(&school.to_lat_lng()));
/// assert_eq!(path.points.last(), Some(&stop.to_lat_lng()));
/// assert!(path.distance_meters > 0.0);
/// # Ok::<(), busline_core::RoutingError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockRouteGenerator {
    seed: u64,
    speed_kmh: f64,
}

impl Default for MockRouteGenerator {
    fn default() -> Self {
        Self::with_seed(DEFAULT_MOCK_SEED)
    }
}

impl MockRouteGenerator {
    /// Create a generator whose jitter is derived from `seed`.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            speed_kmh: AVERAGE_SPEED_KMH,
        }
    }

    /// Override the average speed used for durations.
    #[must_use]
    pub const fn with_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    /// Seed in use.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a path through `waypoints`.
    ///
    /// Returns [`RoutePath::empty`] for fewer than two waypoints.
    #[must_use]
    pub fn generate(&self, waypoints: &[LngLat]) -> RoutePath {
        if !needs_route(waypoints) {
            return RoutePath::empty();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut geometry = Vec::new();
        for pair in waypoints.windows(2) {
            if let [start, end] = pair {
                geometry.push(*start);
                interpolate(&mut rng, *start, *end, &mut geometry);
            }
        }
        if let Some(last) = waypoints.last() {
            geometry.push(*last);
        }

        let distance = estimate_road_meters(waypoints).round();
        let duration = travel_seconds(distance, self.speed_kmh).round();
        RoutePath::from_wire(geometry, distance, duration)
    }
}

fn interpolate(rng: &mut ChaCha8Rng, start: LngLat, end: LngLat, out: &mut Vec<LngLat>) {
    let count = rng.gen_range(INTERMEDIATE_POINTS);
    let steps = f64::from(count + 1);
    for step in 1..=count {
        let ratio = f64::from(step) / steps;
        let variation = (rng.r#gen::<f64>() - 0.5) * JITTER_DEGREES;
        out.push(LngLat::new(
            start.lng + (end.lng - start.lng) * ratio + variation,
            start.lat + (end.lat - start.lat) * ratio + variation * 0.5,
        ));
    }
}

impl RoutingProvider for MockRouteGenerator {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        _options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        Ok(self.generate(waypoints))
    }
}
