//! `places` and `scores` commands: read-only views of the sightings store.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use holiday_core::{DecayScorer, known_places, place_scores};
use holiday_data::SqliteSightingStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::sources::{load_engine_config, require_existing, write_json};
use crate::{ARG_ENGINE_CONFIG, ARG_SIGHTINGS_DB, CliError, DEFAULT_SIGHTINGS_DB};

/// CLI arguments for the `places` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "places", about = "List every place seen at least once")]
#[ortho_config(prefix = "HOLIDAY")]
pub(crate) struct PlacesArgs {
    /// SQLite database holding sightings (default `sightings.db`).
    #[arg(long = ARG_SIGHTINGS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) sightings_db: Option<Utf8PathBuf>,
}

/// CLI arguments for the `scores` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "scores",
    about = "Show decayed affinity scores before reinforcement"
)]
#[ortho_config(prefix = "HOLIDAY")]
pub(crate) struct ScoresArgs {
    /// SQLite database holding sightings (default `sightings.db`).
    #[arg(long = ARG_SIGHTINGS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) sightings_db: Option<Utf8PathBuf>,
    /// JSON file overriding engine settings such as the decay constant.
    #[arg(long = ARG_ENGINE_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) engine_config: Option<Utf8PathBuf>,
}

fn open_store(path: Option<Utf8PathBuf>) -> Result<SqliteSightingStore, CliError> {
    let path = path.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SIGHTINGS_DB));
    require_existing(&path, ARG_SIGHTINGS_DB)?;
    Ok(SqliteSightingStore::open(&path)?)
}

pub(crate) fn run_places(args: PlacesArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_places_with(args, &mut stdout)
}

pub(crate) fn run_places_with(args: PlacesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(merged.sightings_db)?;
    write_json(writer, &known_places(&store)?)
}

pub(crate) fn run_scores(args: ScoresArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_scores_with(args, &mut stdout)
}

pub(crate) fn run_scores_with(args: ScoresArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    if let Some(path) = &merged.engine_config {
        require_existing(path, ARG_ENGINE_CONFIG)?;
    }
    let config = load_engine_config(merged.engine_config.as_deref())?;
    let store = open_store(merged.sightings_db)?;
    let scorer = DecayScorer::new(config.decay_lambda);
    write_json(writer, &place_scores(&store, &scorer, Utc::now())?)
}
