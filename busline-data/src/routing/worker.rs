//! Run provider calls off the async executor.
//!
//! The HTTP backends block until the response arrives, so async callers hand
//! [`RouteTicket`]s to a [`RouteWorker`], which runs each call on Tokio's
//! blocking pool. Completions come back tagged with the ticket generation and
//! go straight into [`RouteSession::complete_refresh`], which discards the
//! ones a later edit has superseded. There is no cancel operation; a
//! superseded call simply runs to completion and is ignored.
//!
//! HTTP providers own a Tokio runtime, and dropping a runtime from async code
//! panics. Keep the last handle to such a provider outside async tasks.
//!
//! [`RouteSession::complete_refresh`]: busline_core::RouteSession::complete_refresh

use std::sync::Arc;

use busline_core::{RouteCompletion, RouteTicket, RoutingError};
use tokio::task::JoinHandle;

use super::config::SharedRoutingProvider;

/// Dispatches route computations to Tokio's blocking pool.
#[derive(Clone)]
pub struct RouteWorker {
    provider: SharedRoutingProvider,
}

impl std::fmt::Debug for RouteWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteWorker")
            .field("provider", &"<dyn RoutingProvider>")
            .finish()
    }
}

impl RouteWorker {
    /// Run calls against `provider`.
    #[must_use]
    pub const fn new(provider: SharedRoutingProvider) -> Self {
        Self { provider }
    }

    /// Start computing `ticket` and return the task handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit(&self, ticket: RouteTicket) -> JoinHandle<RouteCompletion> {
        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || ticket.compute(&*provider))
    }

    /// Compute `ticket` and wait for the completion.
    ///
    /// A task that panics or is cancelled yields a completion carrying
    /// [`RoutingError::Interrupted`], so the session still falls back to
    /// straight segments.
    pub async fn compute(&self, ticket: RouteTicket) -> RouteCompletion {
        let retained = ticket.clone();
        match self.submit(ticket).await {
            Ok(completion) => completion,
            Err(err) => {
                log::warn!("route task for generation {} failed: {err}", retained.generation());
                retained.complete(Err(RoutingError::Interrupted {
                    message: err.to_string(),
                }))
            }
        }
    }
}
