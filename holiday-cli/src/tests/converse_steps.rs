//! Behaviour-driven step definitions driving the converse CLI scenarios.

use super::helpers::{StubEngineBuilder, Workspace, write_utf8};
use super::*;
use crate::converse::run_converse_with;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use std::cell::RefCell;

struct ConverseWorld {
    _workspace: Workspace,
    sightings_db: Utf8PathBuf,
    transcript: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl ConverseWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let sightings_db = workspace.path("sightings.db");
        Self {
            _workspace: workspace,
            sightings_db,
            transcript: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn say(&self, intent: &str, parameters: Value) {
        let line = json!({
            "queryResult": {
                "intent": { "displayName": intent },
                "parameters": parameters,
            }
        });
        self.transcript.borrow_mut().push(line.to_string());
    }

    fn replies(&self) -> Vec<String> {
        let borrowed = self.result.borrow();
        if let Err(err) = borrowed.as_ref().expect("result recorded") {
            panic!("expected success, found {err:?}");
        }
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        stdout
            .lines()
            .map(|line| {
                let reply: Value = serde_json::from_str(line).expect("reply should be JSON");
                reply
                    .get("fulfillmentText")
                    .and_then(Value::as_str)
                    .expect("fulfillmentText")
                    .to_owned()
            })
            .collect()
    }

    fn last_reply(&self) -> String {
        self.replies().pop().expect("at least one reply")
    }
}

#[fixture]
fn world() -> ConverseWorld {
    ConverseWorld::new()
}

#[given("a sightings database exists for the conversation")]
fn sightings_database_exists(#[from(world)] world: &ConverseWorld) {
    write_utf8(&world.sightings_db, b"sqlite");
}

#[given("the user sets the origin to Irvine")]
fn set_origin(#[from(world)] world: &ConverseWorld) {
    world.say("set-origin", json!({ "city": "Irvine", "state": "CA" }));
}

#[given("the user sets the distance to 500 miles")]
fn set_distance(#[from(world)] world: &ConverseWorld) {
    world.say("set-distance", json!({ "distance": { "amount": 500, "unit": "mi" } }));
}

#[given("the user sets the distance to 0 miles")]
fn set_zero_distance(#[from(world)] world: &ConverseWorld) {
    world.say("set-distance", json!({ "distance": 0 }));
}

#[given("the user asks for recommendations")]
fn ask_for_recommendations(#[from(world)] world: &ConverseWorld) {
    world.say("get-recommendations", json!({}));
}

#[given("the user asks for more recommendations")]
fn ask_for_more(#[from(world)] world: &ConverseWorld) {
    world.say("next-recommendations", json!({}));
}

#[given("the user asks about the weather")]
fn ask_about_weather(#[from(world)] world: &ConverseWorld) {
    world.say("weather", json!({}));
}

#[given("the transcript contains a line that is not JSON")]
fn malformed_line(#[from(world)] world: &ConverseWorld) {
    world.transcript.borrow_mut().push("set origin to Irvine".to_owned());
}

#[when("I run the converse command")]
fn run_converse_command(#[from(world)] world: &ConverseWorld) {
    let invocation = vec![
        "holiday".to_owned(),
        "converse".to_owned(),
        format!("--{ARG_SIGHTINGS_DB}"),
        world.sightings_db.as_str().to_owned(),
        format!("--{ARG_API_KEY}"),
        "test-key".to_owned(),
    ];
    // Trailing blank lines are skipped.
    let input = format!("{}\n\n\n", world.transcript.borrow().join("\n"));
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Converse(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_converse_with(args, &StubEngineBuilder, input.as_bytes(), &mut *buffer)
        }
        other => panic!("expected converse command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("three replies are printed")]
fn three_replies(#[from(world)] world: &ConverseWorld) {
    let replies = world.replies();
    assert_eq!(replies.len(), 3);
    let first = replies.first().expect("origin reply");
    assert!(first.starts_with("Origin set to Irvine, CA."), "{first}");
}

#[then("the last reply lists Yosemite National Park and Big Sur")]
fn last_reply_lists_places(#[from(world)] world: &ConverseWorld) {
    let reply = world.last_reply();
    assert!(reply.contains("Origin is Irvine, CA."), "{reply}");
    let yosemite = reply.find("Yosemite National Park").expect("Yosemite listed");
    let big_sur = reply.find("Big Sur").expect("Big Sur listed");
    assert!(yosemite < big_sur, "{reply}");
    assert!(!reply.contains("Lake Tahoe"), "{reply}");
    assert!(reply.contains("say 'next'"), "{reply}");
}

#[then("the reply asks for both the origin and the distance")]
fn reply_asks_for_both(#[from(world)] world: &ConverseWorld) {
    assert_eq!(
        world.last_reply(),
        "Please specify the place name for the origin and the distance threshold before asking for recommendations."
    );
}

#[then("the reply asks for a valid distance")]
fn reply_asks_for_valid_distance(#[from(world)] world: &ConverseWorld) {
    assert_eq!(world.last_reply(), "Please specify a valid distance value.");
}

#[then("the last reply says there are no more recommendations")]
fn reply_no_more(#[from(world)] world: &ConverseWorld) {
    assert_eq!(world.last_reply(), "Sorry, there are no more recommendations.");
}

#[then("the reply says the request was not understood")]
fn reply_not_understood(#[from(world)] world: &ConverseWorld) {
    assert_eq!(world.last_reply(), "Sorry, I couldn't understand that.");
}

#[then("the command fails on line 2")]
fn fails_on_line_two(#[from(world)] world: &ConverseWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::ParseWebhookRequest { line, .. }) => assert_eq!(*line, 2),
        other => panic!("expected ParseWebhookRequest, found {other:?}"),
    }
    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    assert_eq!(stdout.lines().count(), 1);
}

macro_rules! register_converse_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/converse_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ConverseWorld) {
            let _ = world;
        }
    };
}

register_converse_scenario!(converse_full_conversation, "a full conversation");
register_converse_scenario!(
    converse_missing_settings,
    "asking before the settings are known"
);
register_converse_scenario!(converse_zero_distance, "a zero distance is rejected");
register_converse_scenario!(converse_paging_past_end, "paging past the last recommendation");
register_converse_scenario!(converse_unknown_intent, "an unknown intent");
register_converse_scenario!(converse_malformed_line, "a malformed request line");
