//! Mapbox Directions backend.
//!
//! The access token travels as the `access_token` query parameter. It is
//! attached with `RequestBuilder::query` so the URL recorded in errors
//! never contains it.

use busline_core::{LngLat, RouteOptions, RouteProfile, RoutePath, RoutingError, RoutingProvider};
use serde::Deserialize;

use super::geojson::LineString;
use super::provider::{
    HttpRoutingProviderConfig, HttpTransport, ProviderBuildError, coordinate_path,
};

/// Mapbox Directions API root, up to the profile segment.
pub const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";

/// Mapbox Directions API response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// `"Ok"` on success.
    pub code: Option<String>,
    /// Error description on failure.
    pub message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// One route from a Mapbox response.
#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    /// Full geometry in `[lng, lat]` order.
    pub geometry: LineString,
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// Routing provider backed by Mapbox Directions.
#[derive(Debug)]
pub struct MapboxRoutingProvider {
    config: HttpRoutingProviderConfig,
    access_token: String,
    transport: HttpTransport,
}

impl MapboxRoutingProvider {
    /// Create a provider using `access_token`.
    ///
    /// A blank token is accepted here and reported as
    /// [`RoutingError::MissingCredential`] on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(
        config: HttpRoutingProviderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config,
            access_token: access_token.into(),
            transport,
        })
    }

    const fn profile(profile: RouteProfile) -> &'static str {
        match profile {
            RouteProfile::Driving => "driving",
            RouteProfile::Walking => "walking",
            RouteProfile::Cycling => "cycling",
        }
    }

    /// Build the Directions URL, without query parameters.
    fn build_url(&self, waypoints: &[LngLat], options: &RouteOptions) -> String {
        self.config.endpoint(&format!(
            "{}/{}",
            Self::profile(options.profile),
            coordinate_path(waypoints)
        ))
    }

    async fn fetch_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        let url = self.build_url(waypoints, options);
        let request = self.transport.client().get(&url).query(&[
            ("access_token", self.access_token.as_str()),
            ("geometries", "geojson"),
            ("overview", "full"),
            ("steps", "true"),
            ("alternatives", "false"),
        ]);
        let response: DirectionsResponse =
            self.transport.fetch_coded_json(request, &url).await?;
        Self::convert_response(response)
    }

    fn convert_response(response: DirectionsResponse) -> Result<RoutePath, RoutingError> {
        match response.code.as_deref() {
            None | Some("Ok") => {}
            Some("NoRoute") => return Err(RoutingError::NoRoute),
            Some(code) => {
                return Err(RoutingError::ServiceError {
                    code: code.to_owned(),
                    message: response.message.unwrap_or_default(),
                });
            }
        }
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        Ok(RoutePath::from_wire(
            route.geometry.into_points(),
            route.distance,
            route.duration,
        ))
    }
}

impl RoutingProvider for MapboxRoutingProvider {
    fn compute_route(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<RoutePath, RoutingError> {
        if !busline_core::needs_route(waypoints) {
            return Ok(RoutePath::empty());
        }
        if self.access_token.trim().is_empty() {
            return Err(RoutingError::MissingCredential { provider: "mapbox" });
        }
        self.transport.block_on(self.fetch_route(waypoints, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn provider(token: &str) -> MapboxRoutingProvider {
        MapboxRoutingProvider::with_config(
            HttpRoutingProviderConfig::new(DEFAULT_MAPBOX_BASE_URL),
            token,
        )
        .expect("provider should build")
    }

    fn waypoints() -> Vec<LngLat> {
        vec![LngLat::new(105.8542, 21.0285), LngLat::new(105.8612, 21.0315)]
    }

    #[rstest]
    fn url_carries_profile_but_not_token() {
        let url = provider("pk.secret").build_url(
            &waypoints(),
            &RouteOptions::with_profile(RouteProfile::Walking),
        );
        assert_eq!(
            url,
            "https://api.mapbox.com/directions/v5/mapbox/walking/105.8542,21.0285;105.8612,21.0315"
        );
        assert!(!url.contains("pk.secret"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_token_is_a_missing_credential(#[case] token: &str) {
        let err = provider(token)
            .compute_route(&waypoints(), &RouteOptions::default())
            .expect_err("blank token should fail");
        assert_eq!(err, RoutingError::MissingCredential { provider: "mapbox" });
    }

    #[rstest]
    fn convert_response_takes_first_route() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[105.85, 21.02], [105.86, 21.03]]},
                "distance": 1830.0,
                "duration": 264.5,
                "legs": []
            }],
            "waypoints": []
        }"#;
        let response: DirectionsResponse = serde_json::from_str(json).expect("should deserialise");
        let path = MapboxRoutingProvider::convert_response(response).expect("should convert");
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.points[1].lat, 21.03);
        assert_eq!(path.duration_seconds, 264.5);
    }

    #[rstest]
    fn convert_response_rejects_missing_routes() {
        let response: DirectionsResponse =
            serde_json::from_str(r#"{"code": "NoSegment", "message": "No road near point"}"#)
                .expect("should deserialise");
        assert_eq!(
            MapboxRoutingProvider::convert_response(response),
            Err(RoutingError::ServiceError {
                code: "NoSegment".to_owned(),
                message: "No road near point".to_owned(),
            })
        );

        let empty: DirectionsResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).expect("should deserialise");
        assert_eq!(
            MapboxRoutingProvider::convert_response(empty),
            Err(RoutingError::NoRoute)
        );
    }

    #[rstest]
    fn client_error_body_becomes_a_service_error() {
        let base = crate::routing::provider::serve_once(
            "422 Unprocessable Entity",
            r#"{"code": "NoSegment", "message": "No road near point"}"#,
        );
        let provider =
            MapboxRoutingProvider::with_config(HttpRoutingProviderConfig::new(base), "pk.test")
                .expect("provider should build");
        let err = provider
            .compute_route(&waypoints(), &RouteOptions::default())
            .expect_err("a 422 should fail");
        assert_eq!(
            err,
            RoutingError::ServiceError {
                code: "NoSegment".to_owned(),
                message: "No road near point".to_owned(),
            }
        );
    }
}
