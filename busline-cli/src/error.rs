//! Error types emitted by the busline CLI.

use std::sync::Arc;

use busline_core::RoutingError;
use busline_data::AssignmentError;
use busline_data::routing::ProviderBuildError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the busline CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the plan file failed.
    #[error("failed to open plan at {path:?}: {source}")]
    OpenPlan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Plan JSON could not be decoded.
    #[error("failed to parse plan JSON at {path:?}: {source}")]
    ParsePlan {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The plan orders a stop it does not define.
    #[error("plan at {path:?} orders stop {id}, which is not listed in its stops")]
    UnknownStop { path: Utf8PathBuf, id: u64 },
    /// Constructing the routing provider failed.
    #[error("failed to build {backend} routing provider: {source}")]
    BuildProvider {
        backend: &'static str,
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the records client failed.
    #[error("failed to build records client for {base_url:?}: {source}")]
    BuildRecordsClient {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The records service refused the assignment.
    #[error("failed to assign stops to route {route_id}: {source}")]
    Assign {
        route_id: u64,
        #[source]
        source: AssignmentError,
    },
    /// The trip service could not order the stops.
    #[error("trip optimisation failed: {source}")]
    Optimise {
        #[source]
        source: RoutingError,
    },
    /// Serialising the command report failed.
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
