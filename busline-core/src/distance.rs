//! Great-circle distance estimates for offline route metrics.
//!
//! Real road distance is approximated by multiplying the straight-line
//! haversine distance by [`ROAD_INDIRECTION_FACTOR`]. Only the mock
//! generator relies on these estimates; real providers report their own
//! metrics.

use geo::{Distance, Haversine, Point};

use crate::LngLat;

/// Ratio between road travel distance and straight-line distance.
pub const ROAD_INDIRECTION_FACTOR: f64 = 1.3;

/// Average bus speed assumed for estimated durations, in km/h.
pub const AVERAGE_SPEED_KMH: f64 = 25.0;

/// Haversine distance between two points in metres.
///
/// # Examples
/// ```
/// use busline_core::{LngLat, distance::haversine_meters};
///
/// let a = LngLat::new(105.8542, 21.0285);
/// assert_eq!(haversine_meters(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_meters(from: LngLat, to: LngLat) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to))
}

/// Sum of haversine distances between consecutive waypoints, in metres.
#[must_use]
pub fn straight_line_meters(waypoints: &[LngLat]) -> f64 {
    waypoints
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some(haversine_meters(*from, *to)),
            _ => None,
        })
        .sum()
}

/// Estimated road distance through `waypoints`, in metres.
#[must_use]
pub fn estimate_road_meters(waypoints: &[LngLat]) -> f64 {
    straight_line_meters(waypoints) * ROAD_INDIRECTION_FACTOR
}

/// Seconds needed to cover `distance_meters` at `speed_kmh`.
///
/// Returns zero for a non-positive speed.
#[must_use]
pub fn travel_seconds(distance_meters: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }
    distance_meters / (speed_kmh * 1000.0) * 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_near(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[rstest]
    fn one_degree_of_latitude_is_about_111_km() {
        let meters = haversine_meters(LngLat::new(0.0, 0.0), LngLat::new(0.0, 1.0));
        assert_near(meters, 111_195.0, 50.0);
    }

    #[rstest]
    fn straight_line_sums_legs() {
        let a = LngLat::new(0.0, 0.0);
        let b = LngLat::new(0.0, 1.0);
        let total = straight_line_meters(&[a, b, a]);
        assert_near(total, 2.0 * haversine_meters(a, b), 1e-6);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[LngLat::new(1.0, 1.0)])]
    fn short_inputs_have_zero_distance(#[case] waypoints: &[LngLat]) {
        assert_eq!(straight_line_meters(waypoints), 0.0);
    }

    #[rstest]
    fn road_estimate_applies_indirection_factor() {
        let waypoints = [LngLat::new(105.8542, 21.0285), LngLat::new(105.8612, 21.0315)];
        assert_near(
            estimate_road_meters(&waypoints),
            straight_line_meters(&waypoints) * 1.3,
            1e-9,
        );
    }

    #[rstest]
    fn twenty_five_km_takes_an_hour() {
        assert_near(travel_seconds(25_000.0, AVERAGE_SPEED_KMH), 3600.0, 1e-9);
        assert_eq!(travel_seconds(1000.0, 0.0), 0.0);
    }
}
