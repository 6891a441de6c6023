//! `recommend` command: one page of ranked destinations as JSON.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use holiday_core::{RecommendationPage, SessionId, SortKey};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::sources::{
    DefaultEngineBuilder, EngineBuilder, EngineSources, load_engine_config, write_json,
};
use crate::{
    ARG_API_KEY, ARG_BROWSING_HISTORY, ARG_DISTANCE, ARG_ENGINE_CONFIG, ARG_LOCATION_HISTORY,
    ARG_ORIGIN, ARG_PAGE, ARG_ROUTES_ENDPOINT, ARG_SIGHTINGS_DB, ARG_SORT_BY, CliError,
    DEFAULT_SIGHTINGS_DB, ENV_RECOMMEND_API_KEY,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recommend",
    long_about = "Rank places seen in the sightings database by decayed \
                 affinity, reinforced by browsing history, keeping those \
                 within driving distance of the origin. Unset values fall \
                 back to San Jose, 500 miles, score order, and page 1.",
    about = "Rank destinations reachable from an origin"
)]
#[ortho_config(prefix = "HOLIDAY")]
pub(crate) struct RecommendArgs {
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
    /// Origin address distances are measured from.
    #[arg(long = ARG_ORIGIN, value_name = "address")]
    #[serde(default)]
    pub(crate) origin: Option<String>,
    /// Maximum driving distance in miles.
    #[arg(long = ARG_DISTANCE, value_name = "miles")]
    #[serde(default)]
    pub(crate) distance: Option<f64>,
    /// Ordering: `score`, `distance` or `time`.
    #[arg(long = ARG_SORT_BY, value_name = "order")]
    #[serde(default)]
    pub(crate) sort_by: Option<String>,
    /// One-based page number.
    #[arg(long = ARG_PAGE, value_name = "n")]
    #[serde(default)]
    pub(crate) page: Option<usize>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    pub(crate) sources: EngineSources,
    pub(crate) origin: Option<String>,
    pub(crate) distance: Option<f64>,
    pub(crate) sort_by: SortKey,
    pub(crate) page: usize,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_RECOMMEND_API_KEY,
        })?;
        let sort_by = match args.sort_by {
            Some(value) => value
                .parse()
                .map_err(|_| CliError::InvalidSortKey { value })?,
            None => SortKey::default(),
        };
        Ok(Self {
            sources: EngineSources {
                sightings_db: args
                    .sightings_db
                    .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SIGHTINGS_DB)),
                engine_config: args.engine_config,
                browsing_history: args.browsing_history,
                location_history: args.location_history,
                api_key,
                routes_endpoint: args.routes_endpoint,
            },
            origin: args.origin,
            distance: args.distance,
            sort_by,
            page: args.page.unwrap_or(1),
        })
    }
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recommend_with(args, &DefaultEngineBuilder, &mut stdout)
}

pub(crate) fn run_recommend_with(
    args: RecommendArgs,
    builder: &dyn EngineBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let page = execute_recommend(args, builder)?;
    write_json(writer, &page)
}

fn execute_recommend(
    args: RecommendArgs,
    builder: &dyn EngineBuilder,
) -> Result<RecommendationPage, CliError> {
    let config = args.into_config()?;
    config.sources.validate_sources()?;
    let engine_config = load_engine_config(config.sources.engine_config.as_deref())?;
    let engine = builder.build(&config.sources, engine_config)?;

    let session = SessionId::new("cli");
    if let Some(origin) = &config.origin {
        engine.set_origin(&session, origin)?;
    }
    if let Some(miles) = config.distance {
        engine.set_distance_threshold(&session, miles)?;
    }
    Ok(engine.top_recommendations(&session, config.sort_by, config.page)?)
}
