//! Client for the records service that stores route assignments.
//!
//! Closing an editing session persists the ordered stop ids with
//! `POST {api}/routes/{id}/students` and a `{ "studentIds": [...] }` body.

use busline_core::StopId;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::routing::{HttpRoutingProviderConfig, HttpTransport, ProviderBuildError};

/// Default records service root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Errors from [`RouteAssignmentClient::assign_stops`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    /// The request could not reach the records service.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The records service rejected the bearer token.
    #[error("{url} rejected the credentials (HTTP {status})")]
    Unauthorised {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The records service answered with another non-success status.
    #[error("{url} returned HTTP {status}")]
    Rejected {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentBody<'a> {
    student_ids: &'a [u64],
}

/// Synchronous client for route assignment persistence.
#[derive(Debug)]
pub struct RouteAssignmentClient {
    config: HttpRoutingProviderConfig,
    token: Option<String>,
    transport: HttpTransport,
}

impl RouteAssignmentClient {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingProviderConfig::new(base_url))
    }

    /// Create a client with explicit connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config,
            token: None,
            transport,
        })
    }

    /// Send `token` as a bearer credential.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    fn assignment_url(&self, route_id: u64) -> String {
        self.config.endpoint(&format!("routes/{route_id}/students"))
    }

    /// Replace the stops assigned to `route_id` with `stops`, in order.
    ///
    /// # Errors
    ///
    /// Returns an [`AssignmentError`] when the request fails or the service
    /// answers with a non-success status.
    pub fn assign_stops(&self, route_id: u64, stops: &[StopId]) -> Result<(), AssignmentError> {
        let url = self.assignment_url(route_id);
        let ids: Vec<u64> = stops.iter().map(|id| id.0).collect();
        let mut request = self
            .transport
            .client()
            .post(&url)
            .json(&AssignmentBody { student_ids: &ids });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let status = self
            .transport
            .block_on(async move { request.send().await.map(|response| response.status()) })
            .map_err(|err| AssignmentError::Network {
                url: url.clone(),
                message: err.without_url().to_string(),
            })?;
        log::debug!("assigned {} stops to route {route_id}: {status}", ids.len());
        Self::check_status(status, url)
    }

    fn check_status(status: StatusCode, url: String) -> Result<(), AssignmentError> {
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AssignmentError::Unauthorised {
                url,
                status: status.as_u16(),
            });
        }
        Err(AssignmentError::Rejected {
            url,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn url_targets_route_students() {
        let client = RouteAssignmentClient::new("http://localhost:8000/api/").expect("client");
        assert_eq!(
            client.assignment_url(42),
            "http://localhost:8000/api/routes/42/students"
        );
    }

    #[rstest]
    fn body_uses_student_ids_key() {
        let ids = [7_u64, 3, 9];
        let json = serde_json::to_value(AssignmentBody { student_ids: &ids }).expect("serialise");
        assert_eq!(json, serde_json::json!({ "studentIds": [7, 3, 9] }));
    }

    #[rstest]
    #[case(StatusCode::OK, None)]
    #[case(StatusCode::NO_CONTENT, None)]
    #[case(StatusCode::UNAUTHORIZED, Some("unauthorised"))]
    #[case(StatusCode::FORBIDDEN, Some("unauthorised"))]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, Some("rejected"))]
    fn statuses_map_to_errors(#[case] status: StatusCode, #[case] expected: Option<&str>) {
        let outcome = RouteAssignmentClient::check_status(status, "u".to_owned());
        let kind = match outcome {
            Ok(()) => None,
            Err(AssignmentError::Unauthorised { .. }) => Some("unauthorised"),
            Err(AssignmentError::Rejected { .. }) => Some("rejected"),
            Err(other) => panic!("unexpected error {other:?}"),
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn blank_token_is_ignored() {
        let client = RouteAssignmentClient::new(DEFAULT_API_BASE_URL)
            .expect("client")
            .with_token("  ");
        assert!(client.token.is_none());
    }
}
