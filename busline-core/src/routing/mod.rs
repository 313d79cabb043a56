//! Turn an ordered waypoint list into a drawable route.
//!
//! The `RoutingProvider` trait abstracts the external route-computation
//! services. Callers supply waypoints in wire order ([`LngLat`]) and receive
//! a [`RoutePath`](crate::RoutePath) whose geometry is already in display
//! order.
//!
//! Backend failures are returned as [`RoutingError`] values. Fewer than two
//! waypoints is not an error: providers return an empty path.
//!
//! [`LngLat`]: crate::LngLat

mod error;
mod profile;
mod provider;

pub use error::RoutingError;
pub use profile::{RouteOptions, RouteProfile};
pub use provider::{MIN_WAYPOINTS, RoutingProvider, needs_route};
