//! Behaviour-driven step definitions driving the route CLI scenarios.

use super::helpers::{sample_plan, utf8_tempdir, write_plan};
use super::*;
use crate::route::{
    AssignmentTarget, DefaultRouteServices, RouteReport, RouteServices, RouteStatus,
    run_route_with,
};
use busline_core::StopId;
use busline_core::test_support::FailingRoutingProvider;
use busline_data::routing::{ProviderConfig, SharedRoutingProvider};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tempfile::TempDir;

/// Records assignments instead of calling the records service.
#[derive(Debug, Default)]
struct StubRouteServices {
    failing: Cell<bool>,
    assignments: RefCell<Vec<(u64, Vec<StopId>)>>,
}

impl RouteServices for StubRouteServices {
    fn provider(&self, config: &ProviderConfig) -> Result<SharedRoutingProvider, CliError> {
        if self.failing.get() {
            return Ok(Arc::new(FailingRoutingProvider::no_route()));
        }
        DefaultRouteServices.provider(config)
    }

    fn assign(&self, target: &AssignmentTarget, stops: &[StopId]) -> Result<(), CliError> {
        self.assignments
            .borrow_mut()
            .push((target.route_id, stops.to_vec()));
        Ok(())
    }
}

struct RouteWorld {
    _tmp: TempDir,
    plan_path: Utf8PathBuf,
    include_plan: Cell<bool>,
    cli_args: RefCell<Vec<String>>,
    services: StubRouteServices,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RouteWorld {
    fn new() -> Self {
        let (tmp, root) = utf8_tempdir();
        Self {
            _tmp: tmp,
            plan_path: root.join("plan.json"),
            include_plan: Cell::new(true),
            cli_args: RefCell::new(Vec::new()),
            services: StubRouteServices::default(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["busline".to_owned(), "route".to_owned()];
        if self.include_plan.get() {
            argv.push(self.plan_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn report(&self) -> RouteReport {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be a JSON route report")
    }

    fn error_matches(&self, check: impl FnOnce(&CliError) -> bool) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        assert!(check(error), "unexpected error {error:?}");
    }
}

#[fixture]
fn route_world() -> RouteWorld {
    RouteWorld::new()
}

// --- Given steps ---

#[given("a plan with three stops exists on disk")]
fn plan_with_three_stops(#[from(route_world)] world: &RouteWorld) {
    write_plan(&world.plan_path, &sample_plan());
}

#[given("a plan ordering stops 2 then 1 exists on disk")]
fn plan_ordering_two_then_one(#[from(route_world)] world: &RouteWorld) {
    let mut plan = sample_plan();
    plan["order"] = json!([2, 1]);
    write_plan(&world.plan_path, &plan);
}

#[given("a plan ordering an unknown stop exists on disk")]
fn plan_ordering_unknown_stop(#[from(route_world)] world: &RouteWorld) {
    let mut plan = sample_plan();
    plan["order"] = json!([1, 404]);
    write_plan(&world.plan_path, &plan);
}

#[given("I pass the {flag} flag")]
fn pass_flag(flag: String, #[from(route_world)] world: &RouteWorld) {
    world
        .cli_args
        .borrow_mut()
        .push(flag.trim_matches('"').to_owned());
}

#[given("I ask to assign the stops to route 7")]
fn assign_to_route_seven(#[from(route_world)] world: &RouteWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_ASSIGN_ROUTE_ID}"), "7".to_owned()]);
}

#[given("the routing provider finds no route")]
fn provider_finds_no_route(#[from(route_world)] world: &RouteWorld) {
    world.services.failing.set(true);
}

#[given("I omit the plan path")]
fn omit_plan_path(#[from(route_world)] world: &RouteWorld) {
    world.include_plan.set(false);
}

// --- When steps ---

#[when("I run the route command")]
fn run_route_command(#[from(route_world)] world: &RouteWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Route(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_route_with(args, &world.services, &mut *buffer)
        }
        Command::Optimise(_) => panic!("expected route command"),
    });
    world.result.replace(Some(outcome));
}

// --- Then steps ---

#[then("the command succeeds with a routed report for stops 1, 2 and 3")]
fn routed_report(#[from(route_world)] world: &RouteWorld) {
    let report = world.report();
    assert_eq!(report.status, RouteStatus::Routed);
    assert_eq!(report.provider, "mock");
    assert_eq!(report.stop_ids, vec![StopId(1), StopId(2), StopId(3)]);
    assert!(report.path.len() >= 10, "mock paths interpolate points");
    let metrics = report.metrics.expect("routed reports carry metrics");
    assert!(metrics.distance_meters > 0.0);
    assert!(report.distance.is_some_and(|text| text.ends_with(" km") || text.ends_with(" m")));
    assert!(report.duration.is_some_and(|text| text.contains("min")));
    assert!(report.error.is_none());
}

#[then("the report draws 5 straight points without metrics")]
fn straight_line_report(#[from(route_world)] world: &RouteWorld) {
    let report = world.report();
    assert_eq!(report.status, RouteStatus::StraightLine);
    assert_eq!(report.path.len(), 5);
    assert_eq!(report.path.first(), report.path.last());
    assert!(report.metrics.is_none());
    assert!(report.distance.is_none());
    assert!(report.error.is_some());
}

#[then("route 7 receives stops 2 then 1")]
fn route_receives_stops(#[from(route_world)] world: &RouteWorld) {
    let assignments = world.services.assignments.borrow();
    assert_eq!(*assignments, vec![(7, vec![StopId(2), StopId(1)])]);
}

#[then("the report names route 7 as assigned")]
fn report_names_route(#[from(route_world)] world: &RouteWorld) {
    assert_eq!(world.report().assigned_route_id, Some(7));
}

#[then("the command fails because the plan orders an unknown stop")]
fn fails_on_unknown_stop(#[from(route_world)] world: &RouteWorld) {
    world.error_matches(|error| matches!(error, CliError::UnknownStop { id: 404, .. }));
}

#[then("the command fails because the plan path is missing")]
fn fails_on_missing_plan(#[from(route_world)] world: &RouteWorld) {
    world.error_matches(
        |error| matches!(error, CliError::MissingArgument { field, .. } if *field == ARG_PLAN),
    );
}

macro_rules! register_route_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/route_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(route_world)] world: RouteWorld) {
            let _ = world;
        }
    };
}

register_route_scenario!(route_with_mock, "routing a plan with the mock generator");
register_route_scenario!(
    route_straight_line_fallback,
    "falling back to straight segments when the provider fails"
);
register_route_scenario!(
    route_persists_assignment,
    "persisting the planned order to the records service"
);
register_route_scenario!(
    route_unknown_stop,
    "rejecting a plan that orders an unknown stop"
);
register_route_scenario!(route_missing_plan, "rejecting missing plan paths");
