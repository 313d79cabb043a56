//! OSRM backend: Route, Table and Trip services.
//!
//! The Route service backs [`RoutingProvider`]. Table and Trip are exposed
//! as inherent methods for stop-order suggestions; no optimisation runs
//! locally.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/>

use busline_core::{LngLat, RouteOptions, RouteProfile, RoutePath, RoutingError, RoutingProvider};
use serde::Deserialize;

use super::geojson::LineString;
use super::provider::{
    HttpRoutingProviderConfig, HttpTransport, ProviderBuildError, coordinate_path,
};

/// Public OSRM demo server.
pub const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org";

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM, `"Ok"` on success.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One route or trip from an OSRM response.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Full geometry in `[lng, lat]` order.
    pub geometry: LineString,
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// OSRM Table API response.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Durations in seconds; `None` where no route exists.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
    /// Distances in metres; `None` where no route exists.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

/// OSRM Trip API response.
#[derive(Debug, Deserialize)]
pub struct TripResponse {
    /// Status code from OSRM.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Input coordinates snapped to the network, in input order.
    #[serde(default)]
    pub waypoints: Vec<TripWaypoint>,
    /// Computed trips; a single trip for connected inputs.
    #[serde(default)]
    pub trips: Vec<Route>,
}

/// Where an input coordinate ended up in the trip.
#[derive(Debug, Deserialize)]
pub struct TripWaypoint {
    /// Position of this input coordinate within its trip.
    pub waypoint_index: usize,
    /// Trip the coordinate belongs to.
    #[serde(default)]
    pub trips_index: usize,
}

fn check_code(code: String, message: Option<String>) -> Result<(), RoutingError> {
    if code == "Ok" {
        return Ok(());
    }
    if code == "NoRoute" {
        return Err(RoutingError::NoRoute);
    }
    Err(RoutingError::ServiceError {
        code,
        message: message.unwrap_or_default(),
    })
}

/// Pairwise distances and durations between waypoints.
///
/// `None` marks an unreachable pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    /// Distances in metres.
    pub distances: Vec<Vec<Option<f64>>>,
    /// Durations in seconds.
    pub durations: Vec<Vec<Option<f64>>>,
}

/// A suggested visiting order computed by OSRM Trip.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedTrip {
    /// Trip geometry, distance and duration.
    pub path: RoutePath,
    /// Indices into the input waypoints, in visiting order.
    pub order: Vec<usize>,
}

/// Endpoints fixed by a Trip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripOptions {
    /// Start at the first input coordinate.
    pub source_first: bool,
    /// End at the last input coordinate.
    pub destination_last: bool,
    /// Return to the start.
    pub roundtrip: bool,
}

impl Default for TripOptions {
    fn default() -> Self {
        Self {
            source_first: true,
            destination_last: true,
            roundtrip: true,
        }
    }
}

/// Routing provider backed by an OSRM server. No credential is needed.
#[derive(Debug)]
pub struct OsrmRoutingProvider {
    config: HttpRoutingProviderConfig,
    transport: HttpTransport,
}

impl OsrmRoutingProvider {
    /// Create a provider for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingProviderConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }

    const fn profile(profile: RouteProfile) -> &'static str {
        match profile {
            RouteProfile::Driving => "driving",
            RouteProfile::Walking => "foot",
            RouteProfile::Cycling => "bike",
        }
    }

    fn service_url(&self, service: &str, profile: RouteProfile, waypoints: &[LngLat]) -> String {
        self.config.endpoint(&format!(
            "{service}/v1/{}/{}",
            Self::profile(profile),
            coordinate_path(waypoints)
        ))
    }

    /// Build the Route API URL, without query parameters.
    fn build_route_url(&self, waypoints: &[LngLat], options: &RouteOptions) -> String {
        self.service_url("route", options.profile, waypoints)
    }

    async fn fetch_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        let url = self.build_route_url(waypoints, options);
        let request = self.transport.client().get(&url).query(&[
            ("overview", "full"),
            ("geometries", "geojson"),
            ("steps", "true"),
            ("annotations", "true"),
        ]);
        let response: RouteResponse = self.transport.fetch_coded_json(request, &url).await?;
        Self::convert_route(response)
    }

    fn convert_route(response: RouteResponse) -> Result<RoutePath, RoutingError> {
        check_code(response.code, response.message)?;
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        Ok(route.into_path())
    }

    /// Fetch pairwise distances and durations between `waypoints`.
    ///
    /// # Errors
    ///
    /// Returns a [`RoutingError`] when the request fails or OSRM reports an
    /// error code.
    pub fn distance_matrix(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<DistanceMatrix, RoutingError> {
        if waypoints.is_empty() {
            return Ok(DistanceMatrix {
                distances: Vec::new(),
                durations: Vec::new(),
            });
        }
        let url = self.service_url("table", options.profile, waypoints);
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("annotations", "distance,duration")]);
        let response: TableResponse = self
            .transport
            .block_on(self.transport.fetch_coded_json(request, &url))?;
        Self::convert_table(response)
    }

    fn convert_table(response: TableResponse) -> Result<DistanceMatrix, RoutingError> {
        check_code(response.code, response.message)?;
        let sanitise = |matrix: Vec<Vec<Option<f64>>>| {
            matrix
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| cell.filter(|v| *v >= 0.0 && v.is_finite()))
                        .collect()
                })
                .collect()
        };
        let durations = response
            .durations
            .ok_or_else(|| RoutingError::ParseError {
                message: "OSRM response missing durations array".to_owned(),
            })?;
        let distances = response
            .distances
            .ok_or_else(|| RoutingError::ParseError {
                message: "OSRM response missing distances array".to_owned(),
            })?;
        Ok(DistanceMatrix {
            distances: sanitise(distances),
            durations: sanitise(durations),
        })
    }

    /// Ask OSRM Trip for a visiting order of `waypoints`.
    ///
    /// # Errors
    ///
    /// Returns a [`RoutingError`] when the request fails, OSRM reports an
    /// error code, or the response has no trip.
    pub fn optimize_trip(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
        trip: TripOptions,
    ) -> Result<OptimizedTrip, RoutingError> {
        if waypoints.len() < busline_core::MIN_WAYPOINTS {
            return Ok(OptimizedTrip {
                path: RoutePath::empty(),
                order: (0..waypoints.len()).collect(),
            });
        }
        let url = self.service_url("trip", options.profile, waypoints);
        let request = self.transport.client().get(&url).query(&[
            ("overview", "full"),
            ("geometries", "geojson"),
            ("steps", "true"),
            ("source", if trip.source_first { "first" } else { "any" }),
            (
                "destination",
                if trip.destination_last { "last" } else { "any" },
            ),
            ("roundtrip", if trip.roundtrip { "true" } else { "false" }),
        ]);
        let response: TripResponse = self
            .transport
            .block_on(self.transport.fetch_coded_json(request, &url))?;
        Self::convert_trip(response)
    }

    fn convert_trip(response: TripResponse) -> Result<OptimizedTrip, RoutingError> {
        check_code(response.code, response.message)?;
        let route = response
            .trips
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        let mut ranked: Vec<(usize, usize)> = response
            .waypoints
            .iter()
            .enumerate()
            .filter(|(_, waypoint)| waypoint.trips_index == 0)
            .map(|(input, waypoint)| (waypoint.waypoint_index, input))
            .collect();
        ranked.sort_unstable();
        Ok(OptimizedTrip {
            path: route.into_path(),
            order: ranked.into_iter().map(|(_, input)| input).collect(),
        })
    }
}

impl Route {
    fn into_path(self) -> RoutePath {
        RoutePath::from_wire(self.geometry.into_points(), self.distance, self.duration)
    }
}

impl RoutingProvider for OsrmRoutingProvider {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        if !busline_core::needs_route(waypoints) {
            return Ok(RoutePath::empty());
        }
        self.transport.block_on(self.fetch_route(waypoints, options))
    }
}
