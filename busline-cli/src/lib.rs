//! Command-line interface for planning school-bus routes.
//!
//! `busline route` computes the road path for a stop plan with the
//! configured routing provider; `busline optimise` asks OSRM for a visiting
//! order. Options layer from configuration files, `BUSLINE_*` environment
//! variables and flags.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod optimise;
mod plan;
mod route;

pub use error::CliError;

use optimise::{OptimiseArgs, run_optimise};
use route::{RouteArgs, run_route};

const ARG_PLAN: &str = "plan";
const ARG_PROVIDER: &str = "provider";
const ARG_MOCK: &str = "mock";
const ARG_FALLBACK_TO_MOCK: &str = "fallback-to-mock";
const ARG_MOCK_SEED: &str = "mock-seed";
const ARG_MAPBOX_TOKEN: &str = "mapbox-token";
const ARG_ORS_KEY: &str = "ors-key";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_MAPBOX_BASE_URL: &str = "mapbox-base-url";
const ARG_ORS_BASE_URL: &str = "ors-base-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_PROFILE: &str = "profile";
const ARG_ASSIGN_ROUTE_ID: &str = "assign-route-id";
const ARG_API_BASE_URL: &str = "api-base-url";
const ARG_API_TOKEN: &str = "api-token";
const ENV_ROUTE_PLAN: &str = "BUSLINE_CMDS_ROUTE_PLAN";
const ENV_OPTIMISE_PLAN: &str = "BUSLINE_CMDS_OPTIMISE_PLAN";

/// Run the busline CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// plan cannot be read, or a remote service call fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Route(args) => run_route(args),
        Command::Optimise(args) => run_optimise(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "busline",
    about = "Sequence school-bus stops and compute their road route",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the route for a stop plan.
    Route(RouteArgs),
    /// Suggest a stop order using the OSRM trip service.
    Optimise(OptimiseArgs),
}

#[cfg(test)]
mod tests;
