//! HTTP routing backends behind [`busline_core::RoutingProvider`].
//!
//! Three services are supported: OSRM (no credential), Mapbox Directions
//! (access token) and OpenRouteService (API key). [`build_routing_provider`]
//! picks one from a [`ProviderConfig`], or the offline mock generator, and
//! can wrap it in a [`FallbackRoutingProvider`].
//!
//! # Architecture
//!
//! The provider trait is synchronous. Each backend blocks on its async HTTP
//! call internally; async applications dispatch through [`RouteWorker`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use busline_core::{LngLat, RouteOptions, RoutingProvider};
//! use busline_data::routing::{HttpRoutingProviderConfig, OsrmRoutingProvider};
//!
//! let config = HttpRoutingProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let provider = OsrmRoutingProvider::with_config(config)?;
//!
//! let path = provider.compute_route(
//!     &[LngLat::new(105.8542, 21.0285), LngLat::new(105.8612, 21.0315)],
//!     &RouteOptions::default(),
//! )?;
//! println!("{} m in {} s", path.distance_meters, path.duration_seconds);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod fallback;
mod geojson;
mod mapbox;
mod openrouteservice;
mod osrm;
mod provider;
mod worker;

#[doc(hidden)]
pub mod test_support;

pub use config::{ProviderConfig, RoutingBackend, SharedRoutingProvider, build_routing_provider};
pub use fallback::FallbackRoutingProvider;
pub use mapbox::{DEFAULT_MAPBOX_BASE_URL, MapboxRoutingProvider};
pub use openrouteservice::{DEFAULT_ORS_BASE_URL, OpenRouteServiceProvider};
pub use osrm::{
    DEFAULT_OSRM_BASE_URL, DistanceMatrix, OptimizedTrip, OsrmRoutingProvider, TripOptions,
};
pub use provider::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpRoutingProviderConfig, ProviderBuildError,
};
pub use worker::RouteWorker;

pub(crate) use provider::HttpTransport;
