//! Backend selection.
//!
//! [`ProviderConfig`] is a plain value. Library code never reads the process
//! environment; the CLI resolves the value from files, environment and flags
//! and hands it to [`build_routing_provider`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use busline_core::mock::DEFAULT_MOCK_SEED;
use busline_core::{MockRouteGenerator, RoutingProvider};

use super::fallback::FallbackRoutingProvider;
use super::mapbox::{DEFAULT_MAPBOX_BASE_URL, MapboxRoutingProvider};
use super::openrouteservice::{DEFAULT_ORS_BASE_URL, OpenRouteServiceProvider};
use super::osrm::{DEFAULT_OSRM_BASE_URL, OsrmRoutingProvider};
use super::provider::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpRoutingProviderConfig, ProviderBuildError,
};

/// A routing provider that can be shared with worker threads.
pub type SharedRoutingProvider = Arc<dyn RoutingProvider + Send + Sync>;

/// The service that computes routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingBackend {
    /// OSRM; needs no credential.
    #[default]
    Osrm,
    /// Mapbox Directions; needs an access token.
    Mapbox,
    /// OpenRouteService; needs an API key.
    OpenRouteService,
    /// Offline mock generator.
    Mock,
}

impl RoutingBackend {
    /// Resolve a configured backend name, case-insensitively.
    ///
    /// `ors` is accepted for OpenRouteService. Unknown names select OSRM
    /// with a warning rather than failing start-up.
    ///
    /// # Examples
    /// ```
    /// use busline_data::routing::RoutingBackend;
    ///
    /// assert_eq!(RoutingBackend::from_name("ORS"), RoutingBackend::OpenRouteService);
    /// assert_eq!(RoutingBackend::from_name("here"), RoutingBackend::Osrm);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "osrm" => Self::Osrm,
            "mapbox" => Self::Mapbox,
            "openrouteservice" | "ors" => Self::OpenRouteService,
            "mock" => Self::Mock,
            other => {
                log::warn!("unknown routing provider {other:?}, using osrm");
                Self::Osrm
            }
        }
    }

    /// Canonical backend name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Osrm => "osrm",
            Self::Mapbox => "mapbox",
            Self::OpenRouteService => "openrouteservice",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for RoutingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to build the routing provider, read once at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Selected backend.
    pub backend: RoutingBackend,
    /// Use the mock generator regardless of `backend`.
    pub force_mock: bool,
    /// Mapbox access token.
    pub mapbox_access_token: Option<String>,
    /// OpenRouteService API key.
    pub ors_api_key: Option<String>,
    /// OSRM server root.
    pub osrm_base_url: String,
    /// Mapbox Directions root, up to the profile segment.
    pub mapbox_base_url: String,
    /// OpenRouteService root.
    pub ors_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent for requests.
    pub user_agent: String,
    /// Answer with a mock route when the backend fails.
    pub fallback_to_mock: bool,
    /// Seed for the mock generator.
    pub mock_seed: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderConfig")
            .field("backend", &self.backend)
            .field("force_mock", &self.force_mock)
            .field("mapbox_access_token", &redact(&self.mapbox_access_token))
            .field("ors_api_key", &redact(&self.ors_api_key))
            .field("osrm_base_url", &self.osrm_base_url)
            .field("mapbox_base_url", &self.mapbox_base_url)
            .field("ors_base_url", &self.ors_base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("fallback_to_mock", &self.fallback_to_mock)
            .field("mock_seed", &self.mock_seed)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: RoutingBackend::default(),
            force_mock: false,
            mapbox_access_token: None,
            ors_api_key: None,
            osrm_base_url: DEFAULT_OSRM_BASE_URL.to_owned(),
            mapbox_base_url: DEFAULT_MAPBOX_BASE_URL.to_owned(),
            ors_base_url: DEFAULT_ORS_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            fallback_to_mock: false,
            mock_seed: DEFAULT_MOCK_SEED,
        }
    }
}

impl ProviderConfig {
    /// The backend that will actually be built.
    #[must_use]
    pub const fn effective_backend(&self) -> RoutingBackend {
        if self.force_mock {
            RoutingBackend::Mock
        } else {
            self.backend
        }
    }

    fn http(&self, base_url: &str) -> HttpRoutingProviderConfig {
        HttpRoutingProviderConfig::new(base_url)
            .with_timeout(self.timeout)
            .with_user_agent(self.user_agent.clone())
    }

    fn mock(&self) -> MockRouteGenerator {
        MockRouteGenerator::with_seed(self.mock_seed)
    }
}

fn credential(value: Option<&String>, backend: RoutingBackend) -> String {
    match value {
        Some(secret) if !secret.trim().is_empty() => secret.clone(),
        _ => {
            log::warn!("{backend} selected without a credential; requests will fail");
            String::new()
        }
    }
}

/// Build the provider selected by `config`.
///
/// # Errors
///
/// Returns an error if an HTTP backend's client or runtime fails to build.
///
/// # Examples
/// ```
/// use busline_data::routing::{ProviderConfig, build_routing_provider};
/// use busline_core::{LngLat, RouteOptions, RoutingProvider};
///
/// let config = ProviderConfig { force_mock: true, ..ProviderConfig::default() };
/// let provider = build_routing_provider(&config)?;
/// let path = provider.compute_route(
///     &[LngLat::new(105.8542, 21.0285), LngLat::new(105.8612, 21.0315)],
///     &RouteOptions::default(),
/// )?;
/// assert!(!path.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_routing_provider(
    config: &ProviderConfig,
) -> Result<SharedRoutingProvider, ProviderBuildError> {
    let backend = config.effective_backend();
    log::debug!("using routing provider {backend}");
    let primary: SharedRoutingProvider = match backend {
        RoutingBackend::Mock => return Ok(Arc::new(config.mock())),
        RoutingBackend::Osrm => Arc::new(OsrmRoutingProvider::with_config(
            config.http(&config.osrm_base_url),
        )?),
        RoutingBackend::Mapbox => Arc::new(MapboxRoutingProvider::with_config(
            config.http(&config.mapbox_base_url),
            credential(config.mapbox_access_token.as_ref(), backend),
        )?),
        RoutingBackend::OpenRouteService => Arc::new(OpenRouteServiceProvider::with_config(
            config.http(&config.ors_base_url),
            credential(config.ors_api_key.as_ref(), backend),
        )?),
    };
    if config.fallback_to_mock {
        return Ok(Arc::new(FallbackRoutingProvider::new(
            primary,
            config.mock(),
        )));
    }
    Ok(primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use busline_core::{LngLat, RouteOptions, RoutingError};
    use rstest::rstest;

    #[rstest]
    #[case("osrm", RoutingBackend::Osrm)]
    #[case("Mapbox", RoutingBackend::Mapbox)]
    #[case("openrouteservice", RoutingBackend::OpenRouteService)]
    #[case(" ors ", RoutingBackend::OpenRouteService)]
    #[case("mock", RoutingBackend::Mock)]
    #[case("google", RoutingBackend::Osrm)]
    #[case("", RoutingBackend::Osrm)]
    fn backend_names_resolve(#[case] name: &str, #[case] expected: RoutingBackend) {
        assert_eq!(RoutingBackend::from_name(name), expected);
    }

    #[rstest]
    fn force_mock_overrides_backend() {
        let config = ProviderConfig {
            backend: RoutingBackend::Mapbox,
            force_mock: true,
            ..ProviderConfig::default()
        };
        assert_eq!(config.effective_backend(), RoutingBackend::Mock);
    }

    #[rstest]
    fn debug_output_redacts_credentials() {
        let config = ProviderConfig {
            mapbox_access_token: Some("pk.secret".to_owned()),
            ors_api_key: Some("ors-secret".to_owned()),
            ..ProviderConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("pk.secret"));
        assert!(!rendered.contains("ors-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn mapbox_without_token_fails_per_request() {
        let config = ProviderConfig {
            backend: RoutingBackend::Mapbox,
            ..ProviderConfig::default()
        };
        let provider = build_routing_provider(&config).expect("provider should build");
        let err = provider
            .compute_route(
                &[LngLat::new(0.0, 0.0), LngLat::new(0.1, 0.1)],
                &RouteOptions::default(),
            )
            .expect_err("missing token should fail");
        assert_eq!(err, RoutingError::MissingCredential { provider: "mapbox" });
    }

    #[rstest]
    fn fallback_wraps_failing_backend() {
        let config = ProviderConfig {
            backend: RoutingBackend::OpenRouteService,
            fallback_to_mock: true,
            ..ProviderConfig::default()
        };
        let provider = build_routing_provider(&config).expect("provider should build");
        let path = provider
            .compute_route(
                &[LngLat::new(0.0, 0.0), LngLat::new(0.1, 0.1)],
                &RouteOptions::default(),
            )
            .expect("fallback should answer");
        assert!(path.points.len() >= 10);
    }
}
