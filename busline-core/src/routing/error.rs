use thiserror::Error;

/// Errors from [`crate::routing::RoutingProvider::compute_route`].
///
/// URLs carried by the variants never include credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The selected backend needs an access token or API key.
    #[error("{provider} requires a credential but none was configured")]
    MissingCredential {
        /// Backend name.
        provider: &'static str,
    },
    /// The request could not reach the routing service.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Request URL without query parameters.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL without query parameters.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}: {message}")]
    HttpError {
        /// Request URL without query parameters.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The service reported a failure code in its response body.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `"NoRoute"` or `"InvalidQuery"`.
        code: String,
        /// Service message, possibly empty.
        message: String,
    },
    /// The service answered successfully but returned no routes.
    #[error("routing service returned no route")]
    NoRoute,
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
    /// The background task computing the route stopped before finishing.
    #[error("route computation was interrupted: {message}")]
    Interrupted {
        /// Why the task stopped.
        message: String,
    },
}
