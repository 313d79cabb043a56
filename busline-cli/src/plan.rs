//! Stop plans read from JSON files.
//!
//! ```json
//! {
//!   "depot": { "latitude": 21.0285, "longitude": 105.8542 },
//!   "stops": [
//!     { "id": 1, "name": "Nguyen Van Nam", "latitude": 21.0315, "longitude": 105.8612 }
//!   ],
//!   "order": [1],
//!   "profile": "driving"
//! }
//! ```
//!
//! `depot`, `order` and `profile` are optional. Without `order` every listed
//! stop is visited in file order; with it, only the ordered stops are.

use std::io::BufReader;

use busline_core::{Depot, LatLng, RouteOptions, RouteProfile, RouteSession, Stop, StopId};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::CliError;
use crate::fs::open_utf8_file;

/// A depot, candidate stops and the order to visit them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RoutePlan {
    /// School location; the default depot when absent.
    #[serde(default)]
    pub(crate) depot: Option<LatLng>,
    /// Candidate stops.
    #[serde(default)]
    pub(crate) stops: Vec<Stop>,
    /// Ids of the selected stops in route order.
    #[serde(default)]
    pub(crate) order: Option<Vec<StopId>>,
    /// Travel mode used unless configuration overrides it.
    #[serde(default)]
    pub(crate) profile: Option<RouteProfile>,
}

impl RoutePlan {
    /// Selected stops in route order.
    pub(crate) fn ordered_stops(&self, path: &Utf8Path) -> Result<Vec<Stop>, CliError> {
        let Some(order) = &self.order else {
            return Ok(self.stops.clone());
        };
        order
            .iter()
            .map(|id| {
                self.stops
                    .iter()
                    .find(|stop| stop.id == *id)
                    .cloned()
                    .ok_or_else(|| CliError::UnknownStop {
                        path: path.to_path_buf(),
                        id: id.0,
                    })
            })
            .collect()
    }

    /// Open an editing session seeded with the planned stops.
    ///
    /// Stops whose coordinates fall outside WGS84 are skipped with a warning;
    /// an invalid depot falls back to the default one.
    pub(crate) fn session(
        &self,
        path: &Utf8Path,
        profile: Option<RouteProfile>,
    ) -> Result<RouteSession, CliError> {
        let options = RouteOptions::with_profile(profile.or(self.profile).unwrap_or_default());
        let stops = self
            .ordered_stops(path)?
            .into_iter()
            .filter(|stop| {
                let valid = stop.location.is_valid();
                if !valid {
                    log::warn!(
                        "skipping stop {} in {path}: invalid coordinates {:?}",
                        stop.id,
                        stop.location
                    );
                }
                valid
            });
        Ok(RouteSession::open(self.depot(path), stops).with_options(options))
    }

    fn depot(&self, path: &Utf8Path) -> Depot {
        let location = self.depot.filter(|location| {
            let valid = location.is_valid();
            if !valid {
                log::warn!("ignoring depot in {path}: invalid coordinates {location:?}");
            }
            valid
        });
        Depot::from_optional(location)
    }
}

/// Loads a JSON-encoded [`RoutePlan`] from disk.
pub(crate) fn load_plan(path: &Utf8Path) -> Result<RoutePlan, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlan {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParsePlan {
        path: path.to_path_buf(),
        source,
    })
}
