//! OpenRouteService backend.
//!
//! Requests go to the `GeoJSON` variant of the directions endpoint; the plain
//! JSON variant returns an encoded polyline instead of coordinates. The API
//! key is sent in the `Authorization` header.

use busline_core::{LngLat, RouteOptions, RouteProfile, RoutePath, RoutingError, RoutingProvider};
use serde::{Deserialize, Serialize};

use super::geojson::LineString;
use super::provider::{HttpRoutingProviderConfig, HttpTransport, ProviderBuildError};

/// OpenRouteService API root.
pub const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";

/// Directions request body.
#[derive(Debug, Serialize)]
pub struct DirectionsRequest {
    /// Waypoints as `[lng, lat]`.
    pub coordinates: Vec<[f64; 2]>,
    /// Include turn-by-turn instructions.
    pub instructions: bool,
    /// Include elevation in returned positions.
    pub elevation: bool,
}

/// `GeoJSON` directions response.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    /// One feature per route.
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One route as a `GeoJSON` feature.
#[derive(Debug, Deserialize)]
pub struct Feature {
    /// Route geometry.
    pub geometry: LineString,
    /// Route metadata.
    pub properties: FeatureProperties,
}

/// Properties of a route feature.
#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    /// Totals for the whole route.
    #[serde(default)]
    pub summary: Summary,
}

/// Route totals. ORS omits both fields for zero-length routes.
#[derive(Debug, Default, Deserialize)]
pub struct Summary {
    /// Distance in metres.
    #[serde(default)]
    pub distance: f64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// Routing provider backed by OpenRouteService.
#[derive(Debug)]
pub struct OpenRouteServiceProvider {
    config: HttpRoutingProviderConfig,
    api_key: String,
    transport: HttpTransport,
}

impl OpenRouteServiceProvider {
    /// Create a provider using `api_key`.
    ///
    /// A blank key is accepted here and reported as
    /// [`RoutingError::MissingCredential`] on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(
        config: HttpRoutingProviderConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config,
            api_key: api_key.into(),
            transport,
        })
    }

    const fn profile(profile: RouteProfile) -> &'static str {
        match profile {
            RouteProfile::Driving => "driving-car",
            RouteProfile::Walking => "foot-walking",
            RouteProfile::Cycling => "cycling-regular",
        }
    }

    fn build_url(&self, options: &RouteOptions) -> String {
        self.config.endpoint(&format!(
            "v2/directions/{}/geojson",
            Self::profile(options.profile)
        ))
    }

    fn build_body(waypoints: &[LngLat]) -> DirectionsRequest {
        DirectionsRequest {
            coordinates: waypoints.iter().map(|point| point.to_pair()).collect(),
            instructions: true,
            elevation: false,
        }
    }

    async fn fetch_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        let url = self.build_url(options);
        let request = self
            .transport
            .client()
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&Self::build_body(waypoints));
        let response: FeatureCollection = self.transport.fetch_json(request, &url).await?;
        Self::convert_response(response)
    }

    fn convert_response(response: FeatureCollection) -> Result<RoutePath, RoutingError> {
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        let summary = feature.properties.summary;
        Ok(RoutePath::from_wire(
            feature.geometry.into_points(),
            summary.distance,
            summary.duration,
        ))
    }
}

impl RoutingProvider for OpenRouteServiceProvider {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        if !busline_core::needs_route(waypoints) {
            return Ok(RoutePath::empty());
        }
        if self.api_key.trim().is_empty() {
            return Err(RoutingError::MissingCredential {
                provider: "openrouteservice",
            });
        }
        self.transport.block_on(self.fetch_route(waypoints, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busline_core::LatLng;
    use rstest::rstest;

    fn provider(key: &str) -> OpenRouteServiceProvider {
        OpenRouteServiceProvider::with_config(
            HttpRoutingProviderConfig::new(DEFAULT_ORS_BASE_URL),
            key,
        )
        .expect("provider should build")
    }

    #[rstest]
    #[case(RouteProfile::Driving, "driving-car")]
    #[case(RouteProfile::Walking, "foot-walking")]
    #[case(RouteProfile::Cycling, "cycling-regular")]
    fn url_targets_geojson_endpoint(#[case] profile: RouteProfile, #[case] segment: &str) {
        let url = provider("key").build_url(&RouteOptions::with_profile(profile));
        assert_eq!(
            url,
            format!("https://api.openrouteservice.org/v2/directions/{segment}/geojson")
        );
    }

    #[rstest]
    fn body_lists_coordinates_in_wire_order() {
        let body = OpenRouteServiceProvider::build_body(&[
            LngLat::new(105.8542, 21.0285),
            LngLat::new(105.8612, 21.0315),
        ]);
        let json = serde_json::to_value(&body).expect("body should serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": [[105.8542, 21.0285], [105.8612, 21.0315]],
                "instructions": true,
                "elevation": false
            })
        );
    }

    #[rstest]
    fn missing_key_is_reported() {
        let err = provider("")
            .compute_route(
                &[LngLat::new(0.0, 0.0), LngLat::new(0.1, 0.1)],
                &RouteOptions::default(),
            )
            .expect_err("blank key should fail");
        assert_eq!(
            err,
            RoutingError::MissingCredential {
                provider: "openrouteservice"
            }
        );
    }

    #[rstest]
    fn convert_response_reads_first_feature() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[105.85, 21.02], [105.86, 21.03]]},
                "properties": {"summary": {"distance": 2104.3, "duration": 301.9}, "segments": []}
            }]
        }"#;
        let response: FeatureCollection = serde_json::from_str(json).expect("should deserialise");
        let path = OpenRouteServiceProvider::convert_response(response).expect("should convert");
        assert_eq!(path.points[0], LatLng::new(21.02, 105.85));
        assert_eq!(path.distance_meters, 2104.3);
        assert_eq!(path.duration_seconds, 301.9);
    }

    #[rstest]
    fn convert_response_rejects_empty_collection() {
        let response: FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection", "features": []}"#)
                .expect("should deserialise");
        assert_eq!(
            OpenRouteServiceProvider::convert_response(response),
            Err(RoutingError::NoRoute)
        );
    }
}
