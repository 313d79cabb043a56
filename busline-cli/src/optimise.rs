//! Optimise command: ask the OSRM trip service for a stop order.
//!
//! The depot stays first and last; only the stops in between are reordered.
//! The suggestion is printed, never applied to the plan file.

use std::io::Write;
use std::time::Duration;

use busline_core::format::{format_distance, format_duration};
use busline_core::{LatLng, LngLat, RouteOptions, RouteProfile, RoutingError, StopId};
use busline_data::routing::{
    DEFAULT_OSRM_BASE_URL, DEFAULT_TIMEOUT_SECS, HttpRoutingProviderConfig, OptimizedTrip,
    OsrmRoutingProvider, TripOptions,
};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::require_existing;
use crate::plan::load_plan;
use crate::route::write_report;
use crate::{
    ARG_OSRM_BASE_URL, ARG_PLAN, ARG_PROFILE, ARG_TIMEOUT_SECS, CliError, ENV_OPTIMISE_PLAN,
};

/// CLI arguments for the `optimise` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "optimise",
    long_about = "Suggest a visiting order for the planned stops. The \
                 optimisation runs in an OSRM instance's trip service; the \
                 depot stays at both ends of the route.",
    about = "Suggest a stop order using OSRM"
)]
#[ortho_config(prefix = "BUSLINE")]
pub(crate) struct OptimiseArgs {
    /// Path to a JSON file containing the stop plan.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server.
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Travel mode: driving, walking or cycling. Overrides the plan.
    #[arg(long = ARG_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<RouteProfile>,
}

impl OptimiseArgs {
    pub(crate) fn into_config(self) -> Result<OptimiseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimiseConfig::try_from(merged)
    }
}

/// Resolved `optimise` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptimiseConfig {
    /// Path to the JSON plan file.
    pub(crate) plan: Utf8PathBuf,
    /// Base URL for the OSRM trip service.
    pub(crate) osrm_base_url: String,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Travel mode override.
    pub(crate) profile: Option<RouteProfile>,
}

impl TryFrom<OptimiseArgs> for OptimiseConfig {
    type Error = CliError;

    fn try_from(args: OptimiseArgs) -> Result<Self, Self::Error> {
        let plan = args.plan.ok_or(CliError::MissingArgument {
            field: ARG_PLAN,
            env: ENV_OPTIMISE_PLAN,
        })?;
        Ok(Self {
            plan,
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_owned()),
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            profile: args.profile,
        })
    }
}

/// Orders waypoints for a depot-bracketed trip.
pub(crate) trait TripPlanner {
    /// Suggest a visiting order; the first and last waypoints stay fixed.
    fn plan_trip(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<OptimizedTrip, RoutingError>;
}

impl TripPlanner for OsrmRoutingProvider {
    fn plan_trip(
        &self,
        waypoints: &[LngLat],
        options: &RouteOptions,
    ) -> Result<OptimizedTrip, RoutingError> {
        let trip = TripOptions {
            source_first: true,
            destination_last: true,
            roundtrip: false,
        };
        self.optimize_trip(waypoints, options, trip)
    }
}

/// Builds a trip planner for the current optimise invocation.
pub(crate) trait TripPlannerBuilder {
    fn build(&self, config: &OptimiseConfig) -> Result<Box<dyn TripPlanner>, CliError>;
}

pub(crate) struct OsrmTripPlannerBuilder;

impl TripPlannerBuilder for OsrmTripPlannerBuilder {
    fn build(&self, config: &OptimiseConfig) -> Result<Box<dyn TripPlanner>, CliError> {
        let http = HttpRoutingProviderConfig::new(config.osrm_base_url.clone())
            .with_timeout(config.timeout);
        let provider = OsrmRoutingProvider::with_config(http).map_err(|source| {
            CliError::BuildProvider {
                backend: "osrm",
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}

/// JSON report printed by the `optimise` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OptimiseReport {
    /// Travel mode.
    pub(crate) profile: RouteProfile,
    /// Stop ids in plan order.
    pub(crate) original_order: Vec<StopId>,
    /// Stop ids in the suggested order.
    pub(crate) suggested_order: Vec<StopId>,
    /// Geometry of the suggested trip.
    pub(crate) path: Vec<LatLng>,
    /// Trip distance in metres.
    pub(crate) distance_meters: f64,
    /// Trip duration in seconds.
    pub(crate) duration_seconds: f64,
    /// Human-readable distance.
    pub(crate) distance: String,
    /// Human-readable duration.
    pub(crate) duration: String,
}

pub(crate) fn run_optimise(args: OptimiseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_optimise_with(args, &OsrmTripPlannerBuilder, &mut stdout)
}

pub(crate) fn run_optimise_with(
    args: OptimiseArgs,
    builder: &dyn TripPlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_optimise(args, builder)?;
    write_report(writer, &report)
}

fn execute_optimise(
    args: OptimiseArgs,
    builder: &dyn TripPlannerBuilder,
) -> Result<OptimiseReport, CliError> {
    let config = args.into_config()?;
    require_existing(&config.plan, ARG_PLAN)?;
    let plan = load_plan(&config.plan)?;
    let session = plan.session(&config.plan, config.profile)?;
    let original_order = session.sequence().ids();

    let planner = builder.build(&config)?;
    let trip = planner
        .plan_trip(&session.waypoints(), session.options())
        .map_err(|source| CliError::Optimise { source })?;
    let suggested_order = stops_in_trip_order(&original_order, &trip.order);
    log::info!("optimised the order of {} stops", suggested_order.len());

    Ok(OptimiseReport {
        profile: session.options().profile,
        original_order,
        suggested_order,
        distance: format_distance(trip.path.distance_meters),
        duration: format_duration(trip.path.duration_seconds),
        distance_meters: trip.path.distance_meters,
        duration_seconds: trip.path.duration_seconds,
        path: trip.path.points,
    })
}

/// Map a trip's waypoint order back to stop ids.
///
/// Waypoint 0 and the last waypoint are the depot; waypoint `i` in between
/// is stop `i - 1`.
fn stops_in_trip_order(stops: &[StopId], order: &[usize]) -> Vec<StopId> {
    order
        .iter()
        .filter_map(|&waypoint| waypoint.checked_sub(1).and_then(|index| stops.get(index)))
        .copied()
        .collect()
}
