//! Behavioural tests for [`HttpRouteMatrixClient`].
//!
//! These tests point the client at a loopback server that returns canned
//! bodies, so no routing service or API key is needed.

mod support;

use std::cell::RefCell;
use std::time::Duration;

use holiday_core::{BatchError, BatchResponse, RouteMatrixClient};
use holiday_data::routing::{FIELD_MASK, HttpRouteMatrixClient, HttpRouteMatrixConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::{CannedServer, CapturedRequest, refused_endpoint};

const API_KEY: &str = "test-key";

const TWO_ROUTES: &str = r#"[
    {"originIndex": 0, "destinationIndex": 1, "status": {}, "distanceMeters": 3219,
     "duration": "300s", "condition": "ROUTE_EXISTS"},
    {"destinationIndex": 0, "status": {}, "distanceMeters": 16093,
     "duration": "1200s", "condition": "ROUTE_EXISTS"}
]"#;

/// State shared by the steps of one scenario.
#[derive(Debug, Default)]
pub struct Scenario {
    server: Option<CannedServer>,
    endpoint: String,
    result: Option<Result<BatchResponse, BatchError>>,
    captured: Option<CapturedRequest>,
}

impl Scenario {
    fn serve(&mut self, status: u16, body: &str) {
        let server = CannedServer::start(status, body);
        self.endpoint.clone_from(&server.endpoint);
        self.server = Some(server);
    }

    fn result(&self) -> &Result<BatchResponse, BatchError> {
        self.result.as_ref().expect("a request was made")
    }
}

/// Fresh scenario state.
#[fixture]
pub fn scenario_state() -> RefCell<Scenario> {
    RefCell::new(Scenario::default())
}

#[given("a routing service returning two routes")]
fn two_routes(#[from(scenario_state)] state: &RefCell<Scenario>) {
    state.borrow_mut().serve(200, TWO_ROUTES);
}

#[given("a routing service returning one malformed element")]
fn malformed_element(#[from(scenario_state)] state: &RefCell<Scenario>) {
    state.borrow_mut().serve(
        200,
        r#"[{"destinationIndex": 0, "condition": "ROUTE_EXISTS"}, {"distanceMeters": -5}]"#,
    );
}

#[given("a routing service rejecting the API key")]
fn rejecting_key(#[from(scenario_state)] state: &RefCell<Scenario>) {
    state
        .borrow_mut()
        .serve(403, r#"{"error": {"code": 403, "status": "PERMISSION_DENIED"}}"#);
}

#[given("a routing service returning an error object")]
fn error_object(#[from(scenario_state)] state: &RefCell<Scenario>) {
    state
        .borrow_mut()
        .serve(200, r#"{"error": {"code": 400, "status": "INVALID_ARGUMENT"}}"#);
}

#[given("no routing service is listening")]
fn nothing_listening(#[from(scenario_state)] state: &RefCell<Scenario>) {
    state.borrow_mut().endpoint = refused_endpoint();
}

#[when("routes to two destinations are requested")]
fn request_two(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let mut state = state.borrow_mut();
    let config = HttpRouteMatrixConfig::new(API_KEY)
        .with_endpoint(state.endpoint.clone())
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(1);
    let client = HttpRouteMatrixClient::with_config(config).expect("client should build");
    let destinations = vec!["Yosemite".to_owned(), "Santa Cruz".to_owned()];
    state.result = Some(client.compute_route_matrix("San Jose", &destinations));
    if let Some(server) = state.server.take() {
        state.captured = Some(server.captured());
    }
}

#[then("two route entries are returned")]
fn two_entries(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    let response = state.result().as_ref().expect("request succeeds");
    assert_eq!(response.entries.len(), 2);
    assert_eq!(response.malformed_entries, 0);
    assert!(response.entries.iter().all(|entry| entry.route_exists()));
    assert_eq!(response.entries[1].distance_meters, Some(16_093));
}

#[then("the request carries the API key and field mask")]
fn headers_sent(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    let captured = state.captured.as_ref().expect("server saw a request");
    assert!(captured.request_line.starts_with("POST /distanceMatrix/v2:computeRouteMatrix"));
    assert_eq!(captured.header("X-Goog-Api-Key"), Some(API_KEY));
    assert_eq!(captured.header("X-Goog-FieldMask"), Some(FIELD_MASK));
}

#[then("the request names the origin and both destinations")]
fn body_sent(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    let captured = state.captured.as_ref().expect("server saw a request");
    let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(body["origins"][0]["waypoint"]["address"], "San Jose");
    assert_eq!(body["destinations"][0]["waypoint"]["address"], "Yosemite");
    assert_eq!(body["destinations"][1]["waypoint"]["address"], "Santa Cruz");
    assert_eq!(body["travelMode"], "DRIVE");
}

#[then("one route entry is returned and one is counted as malformed")]
fn one_malformed(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    let response = state.result().as_ref().expect("request succeeds");
    assert_eq!(response.entries.len(), 1);
    assert_eq!(response.malformed_entries, 1);
}

#[then("an HTTP error with status 403 is returned")]
fn http_error(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    assert!(
        matches!(state.result(), Err(BatchError::Http { status: 403, .. })),
        "expected HTTP 403, got {:?}",
        state.result()
    );
}

#[then("a decode error is returned")]
fn decode_error(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    assert!(
        matches!(state.result(), Err(BatchError::Decode { .. })),
        "expected decode error, got {:?}",
        state.result()
    );
}

#[then("a network error is returned")]
fn network_error(#[from(scenario_state)] state: &RefCell<Scenario>) {
    let state = state.borrow();
    assert!(
        matches!(state.result(), Err(BatchError::Network { .. })),
        "expected network error, got {:?}",
        state.result()
    );
}

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/http_route_matrix.feature", name = $title)]
        fn $fn_name(scenario_state: RefCell<Scenario>) {
            let _ = scenario_state;
        }
    };
}

register_scenario!(decoding_successful_matrix, "decoding a successful matrix");
register_scenario!(counting_undecodable_elements, "counting undecodable elements");
register_scenario!(handling_http_error, "handling an HTTP error status");
register_scenario!(handling_non_array_body, "handling a body that is not an array");
register_scenario!(handling_unreachable_service, "handling an unreachable service");
