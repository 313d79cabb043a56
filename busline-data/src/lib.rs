//! External service adapters for busline.
//!
//! Responsibilities:
//! - Implement [`busline_core::RoutingProvider`] over OSRM, Mapbox and
//!   OpenRouteService.
//! - Select the backend from an injected [`routing::ProviderConfig`].
//! - Persist finished stop assignments to the records service.
//!
//! Boundaries:
//! - Do not encode sequencing rules (live in `busline-core`).
//! - Never read the process environment; configuration is passed in.
//! - Keep blocking calls off async executors; see [`routing::RouteWorker`].
//!
//! Invariants:
//! - Credentials never appear in error values or log lines.
//! - No global mutable state.

pub mod records;
pub mod routing;

pub use records::{AssignmentError, DEFAULT_API_BASE_URL, RouteAssignmentClient};
