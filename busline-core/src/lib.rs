//! Core domain types for school-bus route planning.
//!
//! A route is an ordered list of pickup stops bracketed by the school depot.
//! This crate owns the ordering state ([`StopSequence`]), the coordinate
//! types that keep display order ([`LatLng`]) apart from provider wire order
//! ([`LngLat`]), the [`RoutingProvider`] seam implemented by the HTTP
//! backends in `busline-data`, an offline [`MockRouteGenerator`], and the
//! [`RouteSession`] glue that decides which computed route is displayed.
//!
//! Nothing here performs I/O.

mod coord;
pub mod distance;
pub mod format;
pub mod mock;
mod route;
pub mod routing;
mod sequence;
pub mod session;
mod stop;
pub mod test_support;

pub use coord::{LatLng, LngLat};
pub use mock::MockRouteGenerator;
pub use route::{RouteMetrics, RoutePath, RouteResult};
pub use routing::{
    MIN_WAYPOINTS, RouteOptions, RouteProfile, RoutingError, RoutingProvider, needs_route,
};
pub use sequence::{SequenceError, StopSequence, Toggle};
pub use session::{RefreshOutcome, RouteCompletion, RouteSession, RouteTicket};
pub use stop::{DEFAULT_DEPOT_LOCATION, Depot, Stop, StopId};
