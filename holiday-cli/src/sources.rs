//! Engine assembly shared by the `recommend` and `converse` commands.

use std::io::{ErrorKind, Write};

use camino::{Utf8Path, Utf8PathBuf};
use holiday_core::{
    ChunkedDistanceResolver, DistanceResolver, EngineConfig, MemorySessionStore,
    RecommendationEngine, SightingRepository,
};
use holiday_data::routing::{HttpRouteMatrixClient, HttpRouteMatrixConfig};
use holiday_data::{SqliteSightingStore, load_browsing_history, load_visited_places};
use log::info;
use serde::Serialize;

use crate::{
    ARG_BROWSING_HISTORY, ARG_ENGINE_CONFIG, ARG_LOCATION_HISTORY, ARG_SIGHTINGS_DB, CliError,
};

/// Engine type assembled by the CLI.
pub(crate) type CliEngine =
    RecommendationEngine<Box<dyn SightingRepository>, Box<dyn DistanceResolver>>;

/// Inputs needed to assemble a [`CliEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EngineSources {
    /// SQLite database holding sightings.
    pub(crate) sightings_db: Utf8PathBuf,
    /// Optional JSON file overriding [`EngineConfig`] fields.
    pub(crate) engine_config: Option<Utf8PathBuf>,
    /// Optional browser-history export.
    pub(crate) browsing_history: Option<Utf8PathBuf>,
    /// Optional location-history export.
    pub(crate) location_history: Option<Utf8PathBuf>,
    /// Routes API key.
    pub(crate) api_key: String,
    /// Override for the `computeRouteMatrix` endpoint.
    pub(crate) routes_endpoint: Option<String>,
}

impl EngineSources {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.sightings_db, ARG_SIGHTINGS_DB)?;
        for (path, field) in [
            (&self.engine_config, ARG_ENGINE_CONFIG),
            (&self.browsing_history, ARG_BROWSING_HISTORY),
            (&self.location_history, ARG_LOCATION_HISTORY),
        ] {
            if let Some(path) = path {
                require_existing(path, field)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    let missing = || CliError::MissingSourceFile {
        field,
        path: path.to_path_buf(),
    };
    match holiday_data::fs::is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(missing()),
        Err(source) if source.kind() == ErrorKind::NotFound => Err(missing()),
        Err(source) => Err(CliError::Io(source)),
    }
}

/// Load engine settings from `path`, or the defaults when absent.
pub(crate) fn load_engine_config(path: Option<&Utf8Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json =
        holiday_data::fs::read_to_string(path).map_err(|source| CliError::ReadEngineConfig {
            path: path.to_path_buf(),
            source,
        })?;
    let config: EngineConfig =
        serde_json::from_str(&json).map_err(|source| CliError::ParseEngineConfig {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(config.validate()?)
}

/// Builds an engine for the current invocation.
pub(crate) trait EngineBuilder {
    fn build(&self, sources: &EngineSources, config: EngineConfig) -> Result<CliEngine, CliError>;
}

/// Builds engines backed by SQLite and the Routes API.
pub(crate) struct DefaultEngineBuilder;

impl EngineBuilder for DefaultEngineBuilder {
    fn build(&self, sources: &EngineSources, config: EngineConfig) -> Result<CliEngine, CliError> {
        let repository: Box<dyn SightingRepository> =
            Box::new(SqliteSightingStore::open(&sources.sightings_db)?);
        let mut client_config = HttpRouteMatrixConfig::new(sources.api_key.clone());
        if let Some(endpoint) = &sources.routes_endpoint {
            client_config = client_config.with_endpoint(endpoint.clone());
        }
        let client = HttpRouteMatrixClient::with_config(client_config)?;
        let resolver: Box<dyn DistanceResolver> = Box::new(ChunkedDistanceResolver::new(client));

        let mut engine =
            RecommendationEngine::new(repository, resolver, MemorySessionStore::new(), config)?;
        if let Some(path) = &sources.browsing_history {
            engine = engine.with_browsing_history(load_browsing_history(path)?);
        }
        if let Some(path) = &sources.location_history {
            engine = engine.with_visited_places(load_visited_places(path)?);
        }
        info!("engine ready with sightings from {}", sources.sightings_db);
        Ok(engine)
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer.write_all(payload.as_bytes()).map_err(CliError::Io)?;
    writer.write_all(b"\n").map_err(CliError::Io)?;
    Ok(())
}
