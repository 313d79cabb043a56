//! Route command implementation for the busline CLI.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use busline_core::format::{format_distance, format_duration};
use busline_core::{LatLng, RefreshOutcome, RouteMetrics, RouteProfile, RouteSession, StopId};
use busline_data::routing::{
    ProviderConfig, RoutingBackend, SharedRoutingProvider, build_routing_provider,
};
use busline_data::{DEFAULT_API_BASE_URL, RouteAssignmentClient};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::require_existing;
use crate::plan::load_plan;
use crate::{
    ARG_API_BASE_URL, ARG_API_TOKEN, ARG_ASSIGN_ROUTE_ID, ARG_FALLBACK_TO_MOCK,
    ARG_MAPBOX_BASE_URL, ARG_MAPBOX_TOKEN, ARG_MOCK, ARG_MOCK_SEED, ARG_ORS_BASE_URL, ARG_ORS_KEY,
    ARG_OSRM_BASE_URL, ARG_PLAN, ARG_PROFILE, ARG_PROVIDER, ARG_TIMEOUT_SECS, CliError,
    ENV_ROUTE_PLAN,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "route",
    long_about = "Compute the road route for a stop plan. The route starts \
                 and ends at the depot and visits the planned stops in \
                 order. When the provider fails the report falls back to \
                 straight segments without distance or duration.",
    about = "Compute the route for a stop plan"
)]
#[ortho_config(prefix = "BUSLINE")]
pub(crate) struct RouteArgs {
    /// Path to a JSON file containing the stop plan.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan: Option<Utf8PathBuf>,
    /// Routing provider: osrm, mapbox, openrouteservice or mock.
    #[arg(long = ARG_PROVIDER, value_name = "name")]
    #[serde(default)]
    pub(crate) provider: Option<String>,
    /// Use the offline mock generator regardless of the provider.
    #[arg(long = ARG_MOCK, num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) mock: Option<bool>,
    /// Answer with a mock route when the provider fails.
    #[arg(long = ARG_FALLBACK_TO_MOCK, num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) fallback_to_mock: Option<bool>,
    /// Seed for the mock generator.
    #[arg(long = ARG_MOCK_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) mock_seed: Option<u64>,
    /// Mapbox access token.
    #[arg(long = ARG_MAPBOX_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) mapbox_token: Option<String>,
    /// OpenRouteService API key.
    #[arg(long = ARG_ORS_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) ors_key: Option<String>,
    /// Base URL for the OSRM server.
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for Mapbox Directions, up to the profile segment.
    #[arg(long = ARG_MAPBOX_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) mapbox_base_url: Option<String>,
    /// Base URL for OpenRouteService.
    #[arg(long = ARG_ORS_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) ors_base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Travel mode: driving, walking or cycling. Overrides the plan.
    #[arg(long = ARG_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<RouteProfile>,
    /// Persist the stop order to this route in the records service.
    #[arg(long = ARG_ASSIGN_ROUTE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) assign_route_id: Option<u64>,
    /// Root of the records service API.
    #[arg(long = ARG_API_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) api_base_url: Option<String>,
    /// Bearer token for the records service.
    #[arg(long = ARG_API_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) api_token: Option<String>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }

    fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::default();
        if let Some(name) = &self.provider {
            config.backend = RoutingBackend::from_name(name);
        }
        if let Some(force) = self.mock {
            config.force_mock = force;
        }
        if let Some(fallback) = self.fallback_to_mock {
            config.fallback_to_mock = fallback;
        }
        if let Some(seed) = self.mock_seed {
            config.mock_seed = seed;
        }
        config.mapbox_access_token.clone_from(&self.mapbox_token);
        config.ors_api_key.clone_from(&self.ors_key);
        if let Some(url) = &self.osrm_base_url {
            config.osrm_base_url.clone_from(url);
        }
        if let Some(url) = &self.mapbox_base_url {
            config.mapbox_base_url.clone_from(url);
        }
        if let Some(url) = &self.ors_base_url {
            config.ors_base_url.clone_from(url);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Where to persist the final stop order.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct AssignmentTarget {
    /// Route receiving the stops.
    pub(crate) route_id: u64,
    /// Records service root.
    pub(crate) api_base_url: String,
    /// Optional bearer token.
    pub(crate) token: Option<String>,
}

impl fmt::Debug for AssignmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignmentTarget")
            .field("route_id", &self.route_id)
            .field("api_base_url", &self.api_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    /// Path to the JSON plan file.
    pub(crate) plan: Utf8PathBuf,
    /// Routing provider selection.
    pub(crate) provider: ProviderConfig,
    /// Travel mode override.
    pub(crate) profile: Option<RouteProfile>,
    /// Assignment to persist after routing.
    pub(crate) assignment: Option<AssignmentTarget>,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let provider = args.provider_config();
        let plan = args.plan.ok_or(CliError::MissingArgument {
            field: ARG_PLAN,
            env: ENV_ROUTE_PLAN,
        })?;
        let assignment = args.assign_route_id.map(|route_id| AssignmentTarget {
            route_id,
            api_base_url: args
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            token: args.api_token.clone(),
        });
        Ok(Self {
            plan,
            provider,
            profile: args.profile,
            assignment,
        })
    }
}

/// How the reported route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RouteStatus {
    /// The provider returned a road route.
    Routed,
    /// The provider failed; the path joins the waypoints directly.
    StraightLine,
    /// No stops were planned, so nothing was routed.
    Empty,
}

/// JSON report printed by the `route` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RouteReport {
    /// Backend that served the request.
    pub(crate) provider: String,
    /// Travel mode.
    pub(crate) profile: RouteProfile,
    /// Stop ids in route order.
    pub(crate) stop_ids: Vec<StopId>,
    /// How the path was obtained.
    pub(crate) status: RouteStatus,
    /// Provider failure behind a straight-line path.
    pub(crate) error: Option<String>,
    /// Points to draw, depot first and last.
    pub(crate) path: Vec<LatLng>,
    /// Provider metrics; absent for straight lines.
    pub(crate) metrics: Option<RouteMetrics>,
    /// Human-readable distance.
    pub(crate) distance: Option<String>,
    /// Human-readable duration.
    pub(crate) duration: Option<String>,
    /// Route the stop order was persisted to.
    pub(crate) assigned_route_id: Option<u64>,
}

impl RouteReport {
    fn new(
        provider: RoutingBackend,
        session: &RouteSession,
        outcome: Option<RefreshOutcome>,
    ) -> Self {
        let (status, error) = match outcome {
            Some(RefreshOutcome::Routed) => (RouteStatus::Routed, None),
            Some(RefreshOutcome::StraightLine(err)) => {
                (RouteStatus::StraightLine, Some(err.to_string()))
            }
            Some(RefreshOutcome::Stale) | None => (RouteStatus::Empty, None),
        };
        let result = session.result();
        let metrics = result.and_then(|shown| shown.metrics);
        Self {
            provider: provider.as_str().to_owned(),
            profile: session.options().profile,
            stop_ids: session.sequence().ids(),
            status,
            error,
            path: result.map(|shown| shown.path.clone()).unwrap_or_default(),
            metrics,
            distance: metrics.map(|m| format_distance(m.distance_meters)),
            duration: metrics.map(|m| format_duration(m.duration_seconds)),
            assigned_route_id: None,
        }
    }
}

/// External services used by the `route` command.
pub(crate) trait RouteServices {
    /// Build the provider selected by `config`.
    fn provider(&self, config: &ProviderConfig) -> Result<SharedRoutingProvider, CliError>;

    /// Persist `stops` as the ordered assignment of `target`.
    fn assign(&self, target: &AssignmentTarget, stops: &[StopId]) -> Result<(), CliError>;
}

pub(crate) struct DefaultRouteServices;

impl RouteServices for DefaultRouteServices {
    fn provider(&self, config: &ProviderConfig) -> Result<SharedRoutingProvider, CliError> {
        build_routing_provider(config).map_err(|source| CliError::BuildProvider {
            backend: config.effective_backend().as_str(),
            source,
        })
    }

    fn assign(&self, target: &AssignmentTarget, stops: &[StopId]) -> Result<(), CliError> {
        let mut client = RouteAssignmentClient::new(target.api_base_url.clone()).map_err(
            |source| CliError::BuildRecordsClient {
                base_url: target.api_base_url.clone(),
                source,
            },
        )?;
        if let Some(token) = &target.token {
            client = client.with_token(token.clone());
        }
        client
            .assign_stops(target.route_id, stops)
            .map_err(|source| CliError::Assign {
                route_id: target.route_id,
                source,
            })
    }
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &DefaultRouteServices, &mut stdout)
}

pub(crate) fn run_route_with(
    args: RouteArgs,
    services: &dyn RouteServices,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_route(args, services)?;
    write_report(writer, &report)
}

fn execute_route(args: RouteArgs, services: &dyn RouteServices) -> Result<RouteReport, CliError> {
    let config = args.into_config()?;
    require_existing(&config.plan, ARG_PLAN)?;
    let plan = load_plan(&config.plan)?;
    let mut session = plan.session(&config.plan, config.profile)?;

    let provider = services.provider(&config.provider)?;
    let outcome = session.refresh(&*provider);
    let backend = config.provider.effective_backend();
    log::info!(
        "routed {} stops with {backend} ({})",
        session.sequence().len(),
        session.options().profile
    );
    let mut report = RouteReport::new(backend, &session, outcome);

    if let Some(target) = &config.assignment {
        services.assign(target, &report.stop_ids)?;
        log::info!(
            "assigned {} stops to route {}",
            report.stop_ids.len(),
            target.route_id
        );
        report.assigned_route_id = Some(target.route_id);
    }
    Ok(report)
}

pub(crate) fn write_report<T: Serialize>(
    writer: &mut dyn Write,
    report: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
