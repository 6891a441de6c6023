//! Error types emitted by the holiday CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use holiday_core::{ConfigError, EngineError};
use holiday_data::{ProviderBuildError, SignalLoadError, SqliteSightingStoreError};
use thiserror::Error;

/// Errors emitted by the holiday CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// The `--sort-by` value is not a known ordering.
    #[error("unknown sort order {value:?} (expected score, distance or time)")]
    InvalidSortKey {
        /// Value as given.
        value: String,
    },
    /// The engine configuration file could not be read.
    #[error("failed to read engine configuration {path:?}: {source}")]
    ReadEngineConfig {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The engine configuration file is not valid JSON.
    #[error("failed to parse engine configuration {path:?}: {source}")]
    ParseEngineConfig {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The engine configuration failed validation.
    #[error(transparent)]
    InvalidEngineConfig(#[from] ConfigError),
    /// Opening the sightings database failed.
    #[error(transparent)]
    OpenSightings(#[from] SqliteSightingStoreError),
    /// Loading a browsing or location history export failed.
    #[error(transparent)]
    LoadSignals(#[from] SignalLoadError),
    /// Constructing the route-matrix client failed.
    #[error("failed to build route matrix client: {0}")]
    BuildRouteClient(#[from] ProviderBuildError),
    /// The engine rejected the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A conversation line is not a valid webhook request.
    #[error("line {line}: invalid webhook request: {source}")]
    ParseWebhookRequest {
        /// One-based input line number.
        line: usize,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Reading input or writing output failed.
    #[error("failed to read input or write output: {0}")]
    Io(#[source] std::io::Error),
}
