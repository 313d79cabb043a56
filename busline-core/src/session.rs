//! Route-editing session: sequencing state bridged to a routing provider.
//!
//! A [`RouteSession`] owns the depot and the [`StopSequence`] for one route
//! being edited. Every effective change bumps the session generation and
//! drops the displayed [`RouteResult`]. A refresh is split in two halves so
//! the provider call can run elsewhere:
//!
//! 1. [`RouteSession::begin_refresh`] snapshots the waypoint list
//!    `[depot, stops.., depot]` into a [`RouteTicket`] tagged with the
//!    current generation.
//! 2. [`RouteSession::complete_refresh`] applies the ticket's
//!    [`RouteCompletion`] only if the generation still matches; completions
//!    for superseded states are discarded.
//!
//! A failed provider call degrades to straight segments through the
//! waypoints with no distance or duration.

use crate::{
    Depot, LngLat, RouteOptions, RoutePath, RouteResult, RoutingError, RoutingProvider,
    SequenceError, Stop, StopId, StopSequence, Toggle,
};

/// Build the closed waypoint loop `[depot, stops.., depot]` in wire order.
///
/// Returns an empty list when no stop is selected.
///
/// # Examples
/// ```
/// use busline_core::{Depot, LatLng, Stop, session::build_waypoints};
///
/// let depot = Depot::new(LatLng::new(21.0285, 105.8542));
/// let stop = Stop::new(1, "A", LatLng::new(21.0315, 105.8612));
/// let waypoints = build_waypoints(&depot, &[stop.clone()]);
/// assert_eq!(
///     waypoints,
///     vec![
///         depot.location.to_lng_lat(),
///         stop.location.to_lng_lat(),
///         depot.location.to_lng_lat(),
///     ]
/// );
/// assert!(build_waypoints(&depot, &[]).is_empty());
/// ```
#[must_use]
pub fn build_waypoints(depot: &Depot, stops: &[Stop]) -> Vec<LngLat> {
    if stops.is_empty() {
        return Vec::new();
    }
    let depot_point = depot.location.to_lng_lat();
    let mut waypoints = Vec::with_capacity(stops.len() + 2);
    waypoints.push(depot_point);
    waypoints.extend(stops.iter().map(|stop| stop.location.to_lng_lat()));
    waypoints.push(depot_point);
    waypoints
}

/// A route computation request bound to the session state that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    generation: u64,
    waypoints: Vec<LngLat>,
    options: RouteOptions,
}

impl RouteTicket {
    /// Generation of the session state that issued this ticket.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Waypoints to route, depot first and last.
    #[must_use]
    pub fn waypoints(&self) -> &[LngLat] {
        &self.waypoints
    }

    /// Options for the provider call.
    #[must_use]
    pub const fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Run the provider call for this ticket.
    #[must_use]
    pub fn compute<P: RoutingProvider + ?Sized>(self, provider: &P) -> RouteCompletion {
        let outcome = provider.compute_route(&self.waypoints, &self.options);
        self.complete(outcome)
    }

    /// Pair this ticket with an outcome obtained elsewhere.
    #[must_use]
    pub fn complete(self, outcome: Result<RoutePath, RoutingError>) -> RouteCompletion {
        RouteCompletion {
            generation: self.generation,
            waypoints: self.waypoints,
            outcome,
        }
    }
}

/// The outcome of a [`RouteTicket`], ready to hand back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCompletion {
    /// Generation of the ticket that produced this completion.
    pub generation: u64,
    /// Waypoints that were routed.
    pub waypoints: Vec<LngLat>,
    /// Provider result.
    pub outcome: Result<RoutePath, RoutingError>,
}

/// What [`RouteSession::complete_refresh`] did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The provider route is now displayed.
    Routed,
    /// The provider failed; straight segments are displayed instead.
    StraightLine(RoutingError),
    /// The session changed after the ticket was issued; nothing was applied.
    Stale,
}

/// State of one route-assignment editing session.
///
/// # Examples
/// ```
/// use busline_core::{Depot, LatLng, MockRouteGenerator, RouteSession, Stop};
/// use busline_core::session::RefreshOutcome;
///
/// let mut session = RouteSession::new(Depot::default());
/// session.toggle(Stop::new(1, "A", LatLng::new(21.0315, 105.8612)));
///
/// let outcome = session.refresh(&MockRouteGenerator::default());
/// assert_eq!(outcome, Some(RefreshOutcome::Routed));
/// assert!(session.result().is_some_and(|result| result.metrics.is_some()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSession {
    depot: Depot,
    sequence: StopSequence,
    options: RouteOptions,
    generation: u64,
    result: Option<RouteResult>,
}

impl RouteSession {
    /// Open an empty session.
    #[must_use]
    pub fn new(depot: Depot) -> Self {
        Self::with_sequence(depot, StopSequence::new())
    }

    /// Open a session seeded with a route's existing stops.
    pub fn open<I>(depot: Depot, existing: I) -> Self
    where
        I: IntoIterator<Item = Stop>,
    {
        Self::with_sequence(depot, StopSequence::from_stops(existing))
    }

    fn with_sequence(depot: Depot, sequence: StopSequence) -> Self {
        Self {
            depot,
            sequence,
            options: RouteOptions::default(),
            generation: 0,
            result: None,
        }
    }

    /// Use `options` for subsequent provider calls.
    #[must_use]
    pub const fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    /// Current depot.
    #[must_use]
    pub const fn depot(&self) -> &Depot {
        &self.depot
    }

    /// Options sent with every provider call.
    #[must_use]
    pub const fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Current stop selection.
    #[must_use]
    pub const fn sequence(&self) -> &StopSequence {
        &self.sequence
    }

    /// Current generation; bumped by every effective change.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Route displayed for the current state, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&RouteResult> {
        self.result.as_ref()
    }

    /// Waypoints for the current state.
    #[must_use]
    pub fn waypoints(&self) -> Vec<LngLat> {
        build_waypoints(&self.depot, self.sequence.stops())
    }

    /// Move the depot. A change to the same location is ignored.
    pub fn set_depot(&mut self, depot: Depot) -> bool {
        if self.depot == depot {
            return false;
        }
        self.depot = depot;
        self.invalidate();
        true
    }

    /// Add or remove `stop`; see [`StopSequence::toggle`].
    pub fn toggle(&mut self, stop: Stop) -> Toggle {
        let toggled = self.sequence.toggle(stop);
        self.invalidate();
        toggled
    }

    /// Remove a stop by id; see [`StopSequence::remove`].
    pub fn remove(&mut self, id: StopId) -> bool {
        let removed = self.sequence.remove(id);
        if removed {
            self.invalidate();
        }
        removed
    }

    /// Move a stop one place earlier; see [`StopSequence::move_up`].
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::IndexOutOfRange`] for an invalid index.
    pub fn move_up(&mut self, index: usize) -> Result<bool, SequenceError> {
        let moved = self.sequence.move_up(index)?;
        if moved {
            self.invalidate();
        }
        Ok(moved)
    }

    /// Move a stop one place later; see [`StopSequence::move_down`].
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::IndexOutOfRange`] for an invalid index.
    pub fn move_down(&mut self, index: usize) -> Result<bool, SequenceError> {
        let moved = self.sequence.move_down(index)?;
        if moved {
            self.invalidate();
        }
        Ok(moved)
    }

    /// Drop every selected stop, e.g. when switching the route being edited.
    pub fn clear(&mut self) -> bool {
        let cleared = self.sequence.clear();
        if cleared {
            self.invalidate();
        }
        cleared
    }

    /// Snapshot the current state into a ticket.
    ///
    /// Returns `None`, and clears the displayed route, when no stop is
    /// selected: there is nothing to compute.
    pub fn begin_refresh(&mut self) -> Option<RouteTicket> {
        if self.sequence.is_empty() {
            self.result = None;
            return None;
        }
        Some(RouteTicket {
            generation: self.generation,
            waypoints: self.waypoints(),
            options: self.options,
        })
    }

    /// Apply a completion if it still describes the current state.
    pub fn complete_refresh(&mut self, completion: RouteCompletion) -> RefreshOutcome {
        if completion.generation != self.generation {
            log::debug!(
                "discarding route for generation {} (session is at {})",
                completion.generation,
                self.generation
            );
            return RefreshOutcome::Stale;
        }
        match completion.outcome {
            Ok(path) => {
                self.result = Some(RouteResult::routed(path));
                RefreshOutcome::Routed
            }
            Err(err) => {
                log::warn!("route computation failed, drawing straight segments: {err}");
                self.result = Some(RouteResult::straight_line(&completion.waypoints));
                RefreshOutcome::StraightLine(err)
            }
        }
    }

    /// Compute and apply a route synchronously.
    ///
    /// Returns `None` when no stop is selected.
    pub fn refresh<P: RoutingProvider + ?Sized>(&mut self, provider: &P) -> Option<RefreshOutcome> {
        let ticket = self.begin_refresh()?;
        let completion = ticket.compute(provider);
        Some(self.complete_refresh(completion))
    }

    /// Close the session, yielding the id list to persist.
    #[must_use]
    pub fn into_assignment(self) -> Vec<StopId> {
        self.sequence.ids()
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.result = None;
    }
}
