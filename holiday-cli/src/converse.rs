//! `converse` command: answer webhook requests read one per line.
//!
//! Each input line is a Dialogflow-style request,
//! `{"queryResult": {"intent": {"displayName": …}, "parameters": {…}}}`.
//! Each answer is written as `{"fulfillmentText": …}` on its own line. All
//! lines share one session, so origin, threshold, and paging carry over.

use std::io::{BufRead, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use holiday_core::{Intent, OriginParts, SessionId, SortKey, respond};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sources::{
    DefaultEngineBuilder, EngineBuilder, EngineSources, load_engine_config,
};
use crate::{
    ARG_API_KEY, ARG_BROWSING_HISTORY, ARG_ENGINE_CONFIG, ARG_LOCATION_HISTORY,
    ARG_ROUTES_ENDPOINT, ARG_SIGHTINGS_DB, CliError, DEFAULT_SIGHTINGS_DB, ENV_CONVERSE_API_KEY,
};

/// CLI arguments for the `converse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "converse",
    long_about = "Read conversational webhook requests from stdin, one JSON \
                 object per line, and print one fulfillment response per \
                 line. Supported intents are set-origin, set-distance, \
                 get-recommendations, next-recommendations and reset-session.",
    about = "Answer conversational webhook requests read from stdin"
)]
#[ortho_config(prefix = "HOLIDAY")]
pub(crate) struct ConverseArgs {
    /// SQLite database holding sightings (default `sightings.db`).
    #[arg(long = ARG_SIGHTINGS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) sightings_db: Option<Utf8PathBuf>,
    /// JSON file overriding engine settings.
    #[arg(long = ARG_ENGINE_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) engine_config: Option<Utf8PathBuf>,
    /// Browser-history export used to reinforce affinity.
    #[arg(long = ARG_BROWSING_HISTORY, value_name = "path")]
    #[serde(default)]
    pub(crate) browsing_history: Option<Utf8PathBuf>,
    /// Location-history export listing places already visited.
    #[arg(long = ARG_LOCATION_HISTORY, value_name = "path")]
    #[serde(default)]
    pub(crate) location_history: Option<Utf8PathBuf>,
    /// Routes API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override for the `computeRouteMatrix` endpoint.
    #[arg(long = ARG_ROUTES_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) routes_endpoint: Option<String>,
}

impl ConverseArgs {
    fn into_sources(self) -> Result<EngineSources, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        let api_key = merged.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_CONVERSE_API_KEY,
        })?;
        Ok(EngineSources {
            sightings_db: merged
                .sightings_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SIGHTINGS_DB)),
            engine_config: merged.engine_config,
            browsing_history: merged.browsing_history,
            location_history: merged.location_history,
            api_key,
            routes_endpoint: merged.routes_endpoint,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest {
    query_result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    intent: IntentName,
    #[serde(default)]
    parameters: Parameters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentName {
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Parameters {
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    county: Option<County>,
    #[serde(default)]
    distance: Option<Value>,
    #[serde(default, rename = "sort-by")]
    sort_by: Option<String>,
}

/// A `county` parameter is either a structured address or a bare name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum County {
    Address(CountyAddress),
    Name(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CountyAddress {
    #[serde(default)]
    street_address: String,
    #[serde(default)]
    subadmin_area: String,
    #[serde(default)]
    admin_area: String,
    #[serde(default)]
    city: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookResponse {
    fulfillment_text: String,
}

impl Parameters {
    fn origin_parts(self) -> OriginParts {
        match self.county {
            Some(County::Name(name)) => OriginParts {
                city: if name.trim().is_empty() { self.city } else { name },
                state: self.state,
                ..OriginParts::default()
            },
            Some(County::Address(address)) => OriginParts {
                street_address: address.street_address,
                subadmin_area: address.subadmin_area,
                admin_area: address.admin_area,
                county_city: address.city,
                city: self.city,
                state: self.state,
            },
            None => OriginParts {
                city: self.city,
                state: self.state,
                ..OriginParts::default()
            },
        }
    }

    /// Distance in miles, from a number, numeric string, or `{"amount": …}`
    /// object. Zero and negative values count as absent.
    fn distance_miles(&self) -> Option<f64> {
        let miles = match self.distance.as_ref()? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            Value::Object(object) => object.get("amount").and_then(Value::as_f64),
            _ => None,
        }?;
        (miles > 0.0).then_some(miles)
    }

    fn sort_key(&self) -> SortKey {
        self.sort_by
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl WebhookRequest {
    fn into_intent(self) -> Intent {
        let QueryResult { intent, parameters } = self.query_result;
        match intent.display_name.as_str() {
            "set-origin" => Intent::SetOrigin(parameters.origin_parts()),
            "set-distance" => Intent::SetDistance(parameters.distance_miles()),
            "get-recommendations" => Intent::GetRecommendations(parameters.sort_key()),
            "next-recommendations" => Intent::NextRecommendations(parameters.sort_key()),
            "reset-session" => Intent::ResetSession,
            _ => Intent::Unknown(intent.display_name),
        }
    }
}

/// Decode one webhook request line into an [`Intent`].
pub(crate) fn parse_intent(line: &str) -> Result<Intent, serde_json::Error> {
    serde_json::from_str::<WebhookRequest>(line).map(WebhookRequest::into_intent)
}

pub(crate) fn run_converse(args: ConverseArgs) -> Result<(), CliError> {
    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    run_converse_with(args, &DefaultEngineBuilder, stdin, &mut stdout)
}

pub(crate) fn run_converse_with(
    args: ConverseArgs,
    builder: &dyn EngineBuilder,
    input: impl BufRead,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let sources = args.into_sources()?;
    sources.validate_sources()?;
    let engine_config = load_engine_config(sources.engine_config.as_deref())?;
    let engine = builder.build(&sources, engine_config)?;
    let session = SessionId::new("converse");

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(CliError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let intent = parse_intent(&line).map_err(|source| CliError::ParseWebhookRequest {
            line: index + 1,
            source,
        })?;
        debug!("line {}: {intent:?}", index + 1);
        let reply = respond(&engine, &session, intent)?;
        let response = WebhookResponse {
            fulfillment_text: reply.text,
        };
        serde_json::to_writer(&mut *writer, &response).map_err(CliError::SerializeOutput)?;
        writer.write_all(b"\n").map_err(CliError::Io)?;
    }
    Ok(())
}
