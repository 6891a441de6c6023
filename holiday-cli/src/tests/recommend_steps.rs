//! Behaviour-driven step definitions driving the recommend CLI scenarios.

use super::helpers::{StubEngineBuilder, Workspace, write_utf8};
use super::*;
use crate::recommend::run_recommend_with;
use camino::Utf8PathBuf;
use holiday_core::RecommendationPage;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct RecommendWorld {
    workspace: Workspace,
    sightings_db: Utf8PathBuf,
    include_api_key: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RecommendWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let sightings_db = workspace.path("sightings.db");
        Self {
            workspace,
            sightings_db,
            include_api_key: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "holiday".to_owned(),
            "recommend".to_owned(),
            format!("--{ARG_SIGHTINGS_DB}"),
            self.sightings_db.as_str().to_owned(),
        ];
        if *self.include_api_key.borrow() {
            argv.extend([format!("--{ARG_API_KEY}"), "test-key".to_owned()]);
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn page(&self) -> RecommendationPage {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be a JSON page")
    }

    fn listed(&self) -> Vec<String> {
        self.page()
            .page
            .items
            .into_iter()
            .map(|recommendation| recommendation.place_name)
            .collect()
    }

    fn error(&self) -> String {
        let borrowed = self.result.borrow();
        match borrowed.as_ref().expect("result recorded") {
            Ok(()) => panic!("expected the command to fail"),
            Err(err) => format!("{err:?}"),
        }
    }
}

#[fixture]
fn world() -> RecommendWorld {
    RecommendWorld::new()
}

#[given("a sightings database exists on disk")]
fn sightings_database_exists(#[from(world)] world: &RecommendWorld) {
    write_utf8(&world.sightings_db, b"sqlite");
    assert!(world.workspace.path("sightings.db").exists());
}

#[given("I ask for destinations ordered by distance")]
fn order_by_distance(#[from(world)] world: &RecommendWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_SORT_BY}"), "distance".to_owned()]);
}

#[given("I ask for destinations ordered by altitude")]
fn order_by_altitude(#[from(world)] world: &RecommendWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_SORT_BY}"), "altitude".to_owned()]);
}

#[given("I set a threshold of 150 miles")]
fn set_threshold(#[from(world)] world: &RecommendWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_ORIGIN}"),
        "Irvine".to_owned(),
        format!("--{ARG_DISTANCE}"),
        "150".to_owned(),
    ]);
}

#[given("I omit the API key")]
fn omit_api_key(#[from(world)] world: &RecommendWorld) {
    *world.include_api_key.borrow_mut() = false;
}

#[when("I run the recommend command")]
fn run_recommend_command(#[from(world)] world: &RecommendWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Recommend(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_recommend_with(args, &StubEngineBuilder, &mut *buffer)
        }
        other => panic!("expected recommend command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and lists Yosemite National Park before Big Sur")]
fn lists_yosemite_first(#[from(world)] world: &RecommendWorld) {
    let page = world.page();
    assert_eq!(page.origin, holiday_core::DEFAULT_ORIGIN);
    assert_eq!(page.page.number, 1);
    let listed: Vec<&str> = page
        .page
        .items
        .iter()
        .map(|recommendation| recommendation.place_name.as_str())
        .collect();
    assert_eq!(listed, ["Yosemite National Park", "Big Sur"]);
}

#[then("places beyond the threshold or without a route are omitted")]
fn distant_places_omitted(#[from(world)] world: &RecommendWorld) {
    let listed = world.listed();
    assert!(!listed.iter().any(|name| name == "Lake Tahoe"));
    assert!(!listed.iter().any(|name| name == "Death Valley"));
}

#[then("Big Sur is listed first")]
fn big_sur_first(#[from(world)] world: &RecommendWorld) {
    assert_eq!(
        world.listed().first().map(String::as_str),
        Some("Big Sur")
    );
}

#[then("only Big Sur is listed")]
fn only_big_sur(#[from(world)] world: &RecommendWorld) {
    let page = world.page();
    assert_eq!(page.origin, "Irvine");
    let listed: Vec<String> = page
        .page
        .items
        .into_iter()
        .map(|recommendation| recommendation.place_name)
        .collect();
    assert_eq!(listed, ["Big Sur"]);
}

#[then("the command fails because the ordering is unknown")]
fn fails_unknown_ordering(#[from(world)] world: &RecommendWorld) {
    let error = world.error();
    assert!(error.contains("InvalidSortKey"), "unexpected error {error}");
    assert!(error.contains("altitude"), "unexpected error {error}");
}

#[then("the command fails because the API key is missing")]
fn fails_missing_api_key(#[from(world)] world: &RecommendWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(*field, ARG_API_KEY);
            assert_eq!(*env, ENV_RECOMMEND_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the sightings database is missing")]
fn fails_missing_database(#[from(world)] world: &RecommendWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::MissingSourceFile { field, path }) => {
            assert_eq!(*field, ARG_SIGHTINGS_DB);
            assert_eq!(*path, world.sightings_db);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

macro_rules! register_recommend_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/recommend_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RecommendWorld) {
            let _ = world;
        }
    };
}

register_recommend_scenario!(
    recommend_default_threshold,
    "recommending destinations within the default threshold"
);
register_recommend_scenario!(recommend_by_distance, "ordering destinations by distance");
register_recommend_scenario!(recommend_narrow_threshold, "narrowing the threshold");
register_recommend_scenario!(recommend_unknown_ordering, "rejecting an unknown ordering");
register_recommend_scenario!(recommend_missing_api_key, "rejecting a missing API key");
register_recommend_scenario!(
    recommend_missing_database,
    "rejecting a missing sightings database"
);
