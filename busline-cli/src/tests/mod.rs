//! Shared test harness modules for the busline CLI.

use super::*;

mod helpers;
mod route_steps;
