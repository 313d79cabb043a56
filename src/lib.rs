//! Facade crate for busline school-bus route planning.
//!
//! This crate re-exports the core sequencing and routing types and, behind
//! the `http` feature, the HTTP routing backends and records client.

#![forbid(unsafe_code)]

pub use busline_core::{
    DEFAULT_DEPOT_LOCATION, Depot, LatLng, LngLat, MIN_WAYPOINTS, MockRouteGenerator,
    RefreshOutcome, RouteCompletion, RouteMetrics, RouteOptions, RoutePath, RouteProfile,
    RouteResult, RouteSession, RouteTicket, RoutingError, RoutingProvider, SequenceError, Stop,
    StopId, StopSequence, Toggle, distance, format, needs_route,
};

#[cfg(feature = "http")]
pub use busline_data::routing::{
    ProviderConfig, RouteWorker, RoutingBackend, SharedRoutingProvider, build_routing_provider,
};

#[cfg(feature = "http")]
pub use busline_data::{AssignmentError, RouteAssignmentClient};
