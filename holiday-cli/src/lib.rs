//! Command-line interface for the holiday recommendation engine.
//!
//! Subcommands read sightings from a SQLite database and print JSON:
//! `places` lists known places, `scores` their decayed affinity, and
//! `recommend` one page of ranked destinations. `converse` reads one
//! webhook request per line from stdin and answers each on stdout.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod catalogue;
mod converse;
mod error;
mod recommend;
mod sources;

pub use error::CliError;

use catalogue::{PlacesArgs, ScoresArgs, run_places, run_scores};
use converse::{ConverseArgs, run_converse};
use recommend::{RecommendArgs, run_recommend};

const ARG_SIGHTINGS_DB: &str = "sightings-db";
const ARG_ENGINE_CONFIG: &str = "engine-config";
const ARG_BROWSING_HISTORY: &str = "browsing-history";
const ARG_LOCATION_HISTORY: &str = "location-history";
const ARG_API_KEY: &str = "api-key";
const ARG_ROUTES_ENDPOINT: &str = "routes-endpoint";
const ARG_ORIGIN: &str = "origin";
const ARG_DISTANCE: &str = "distance";
const ARG_SORT_BY: &str = "sort-by";
const ARG_PAGE: &str = "page";
const ENV_RECOMMEND_API_KEY: &str = "HOLIDAY_CMDS_RECOMMEND_API_KEY";
const ENV_CONVERSE_API_KEY: &str = "HOLIDAY_CMDS_CONVERSE_API_KEY";

/// Default sightings database, relative to the working directory.
const DEFAULT_SIGHTINGS_DB: &str = "sightings.db";

/// Run the holiday CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Places(args) => run_places(args),
        Command::Scores(args) => run_scores(args),
        Command::Recommend(args) => run_recommend(args),
        Command::Converse(args) => run_converse(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "holiday",
    about = "Recommend holiday destinations from place sightings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every place seen at least once.
    Places(PlacesArgs),
    /// Show decayed affinity scores before reinforcement.
    Scores(ScoresArgs),
    /// Rank destinations reachable from an origin.
    Recommend(RecommendArgs),
    /// Answer conversational webhook requests read from stdin.
    Converse(ConverseArgs),
}

#[cfg(test)]
mod tests;
