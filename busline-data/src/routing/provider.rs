//! Shared HTTP plumbing for the routing backends.
//!
//! [`RoutingProvider`](busline_core::RoutingProvider) is synchronous so the
//! editing session stays embeddable in synchronous contexts. Each backend
//! owns an [`HttpTransport`]: a `reqwest` client plus a `current_thread`
//! Tokio runtime that is reused across calls to block on the async request.
//!
//! # Runtime behaviour
//!
//! When called from outside any Tokio runtime, the transport uses its own
//! stored runtime. When called from within a multi-threaded runtime
//! (detected via [`Handle::try_current()`] and [`RuntimeFlavor::MultiThread`])
//! it uses that runtime's handle with [`tokio::task::block_in_place`] to
//! avoid nested runtime panics. Inside a `current_thread` runtime it falls
//! back to its own runtime, which may deadlock if the caller's runtime is
//! driving IO this request depends on; prefer
//! [`RouteWorker`](super::RouteWorker) there.

use std::future::Future;
use std::time::Duration;

use busline_core::{LngLat, RoutingError};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Error type for HTTP provider construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "busline-routing/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings shared by every HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRoutingProviderConfig {
    /// Base URL of the service, without a trailing path separator.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpRoutingProviderConfig {
    /// Create a configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Join `path` onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Format waypoints as the `lng,lat;lng,lat` path segment used by OSRM and
/// Mapbox.
pub(crate) fn coordinate_path(waypoints: &[LngLat]) -> String {
    waypoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

/// HTTP client and runtime owned by a backend.
pub(crate) struct HttpTransport {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    pub(crate) fn new(config: &HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout: config.timeout,
        })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Drive `future` to completion from synchronous code.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }

    /// Send `request` and decode a JSON body.
    ///
    /// `url` is the credential-free URL used in error values.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, RoutingError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, url))?;

        response
            .json()
            .await
            .map_err(|err| RoutingError::ParseError {
                message: err.without_url().to_string(),
            })
    }

    /// Fetch JSON from a service that explains client errors in the body.
    ///
    /// OSRM and Mapbox answer failures such as `NoSegment` with a 4xx status
    /// and a `code` field. Such bodies are decoded so the caller can map the
    /// code; a 4xx body without a string `code` stays an HTTP error.
    pub(crate) async fn fetch_coded_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, RoutingError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))?;
        let status = response.status();
        if !status.is_client_error() {
            let response = response
                .error_for_status()
                .map_err(|err| self.convert_reqwest_error(err, url))?;
            return response
                .json()
                .await
                .map_err(|err| RoutingError::ParseError {
                    message: err.without_url().to_string(),
                });
        }

        let status_error = || RoutingError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message: format!("HTTP status client error ({status})"),
        };
        let body: serde_json::Value = response.json().await.map_err(|_| status_error())?;
        if !body.get("code").is_some_and(serde_json::Value::is_string) {
            return Err(status_error());
        }
        serde_json::from_value(body).map_err(|_| status_error())
    }

    /// Convert a reqwest error to a `RoutingError`.
    ///
    /// The request URL is stripped from the message because it may carry an
    /// access token.
    pub(crate) fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        RoutingError::NetworkError {
            url: url.to_owned(),
            message: error.without_url().to_string(),
        }
    }
}

/// Answer one HTTP request on a local port with a canned JSON reply.
///
/// Returns the base URL to point a provider at.
#[cfg(test)]
pub(crate) fn serve_once(status: &'static str, body: &'static str) -> String {
    serve_once_recording(status, body).0
}

/// Like [`serve_once`], also yielding the received request head.
#[cfg(test)]
pub(crate) fn serve_once_recording(
    status: &'static str,
    body: &'static str,
) -> (String, std::sync::mpsc::Receiver<String>) {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    let (sender, receiver) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept request");
        let mut request = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        let _ = sender.send(String::from_utf8_lossy(&request).into_owned());
        let reply = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(reply.as_bytes()).expect("write reply");
    });
    (format!("http://{addr}"), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpRoutingProviderConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[rstest]
    fn default_timeout_is_ten_seconds() {
        let config = HttpRoutingProviderConfig::new("http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[rstest]
    #[case("http://osrm.example.com")]
    #[case("http://osrm.example.com/")]
    fn endpoint_joins_without_double_slash(#[case] base: &str) {
        let config = HttpRoutingProviderConfig::new(base);
        assert_eq!(
            config.endpoint("route/v1/driving"),
            "http://osrm.example.com/route/v1/driving"
        );
    }

    #[rstest]
    fn coordinate_path_uses_wire_order() {
        let path = coordinate_path(&[LngLat::new(105.8542, 21.0285), LngLat::new(-0.1, 51.5)]);
        assert_eq!(path, "105.8542,21.0285;-0.1,51.5");
    }

    #[rstest]
    fn unreachable_host_is_a_network_error() {
        let config = HttpRoutingProviderConfig::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let transport = HttpTransport::new(&config).expect("transport should build");
        let url = config.endpoint("route");
        let request = transport.client().get(&url);
        let result: Result<serde_json::Value, RoutingError> =
            transport.block_on(transport.fetch_json(request, &url));
        let err = result.expect_err("nothing listens on the discard port");
        assert!(
            matches!(
                err,
                RoutingError::NetworkError { .. } | RoutingError::Timeout { .. }
            ),
            "unexpected error {err:?}"
        );
    }

    fn fetch_coded(base_url: &str) -> Result<serde_json::Value, RoutingError> {
        let config = HttpRoutingProviderConfig::new(base_url);
        let transport = HttpTransport::new(&config).expect("transport should build");
        let url = config.endpoint("route");
        let request = transport.client().get(&url);
        transport.block_on(transport.fetch_coded_json(request, &url))
    }

    #[rstest]
    fn client_error_with_code_is_decoded() {
        let base = serve_once(
            "400 Bad Request",
            r#"{"code": "NoSegment", "message": "Could not find a matching segment"}"#,
        );
        let body = fetch_coded(&base).expect("coded body should decode");
        assert_eq!(body["code"], "NoSegment");
    }

    #[rstest]
    fn client_error_without_code_stays_an_http_error() {
        let base = serve_once("401 Unauthorized", r#"{"message": "Not Authorized"}"#);
        let err = fetch_coded(&base).expect_err("uncoded 4xx should fail");
        assert!(
            matches!(err, RoutingError::HttpError { status: 401, .. }),
            "unexpected error {err:?}"
        );
    }
}
