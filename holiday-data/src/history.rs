//! Loaders for exported browsing and location history.
//!
//! Both formats are the JSON produced by Google Takeout. Entries missing the
//! field of interest are ignored rather than rejected.

use camino::{Utf8Path, Utf8PathBuf};
use holiday_core::{BrowsingHistory, VisitedPlaces};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::fs::read_to_string;

/// Errors raised while loading a signal export.
#[derive(Debug, Error)]
pub enum SignalLoadError {
    /// The export could not be read.
    #[error("failed to read {path:?}")]
    Read {
        /// Export path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The export is not in the expected JSON shape.
    #[error("failed to parse {path:?}")]
    Parse {
        /// Export path.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct BrowserHistoryExport {
    #[serde(rename = "Browser History", default)]
    entries: Vec<BrowserHistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct BrowserHistoryEntry {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationHistoryExport {
    #[serde(default)]
    timeline_objects: Vec<TimelineObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineObject {
    #[serde(default)]
    place_visit: Option<PlaceVisit>,
}

#[derive(Debug, Deserialize)]
struct PlaceVisit {
    #[serde(default)]
    location: Option<VisitLocation>,
}

#[derive(Debug, Deserialize)]
struct VisitLocation {
    #[serde(default)]
    address: Option<String>,
}

/// Parse a browser-history export: `{"Browser History": [{"title": …}]}`.
///
/// # Errors
/// Returns the JSON error when `json` does not have that shape.
///
/// # Examples
/// ```
/// use holiday_data::parse_browsing_history;
///
/// let history = parse_browsing_history(
///     r#"{"Browser History": [{"title": "Yosemite hikes"}, {"url": "x"}]}"#,
/// )?;
/// assert_eq!(history.titles(), ["Yosemite hikes".to_owned()]);
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn parse_browsing_history(json: &str) -> Result<BrowsingHistory, serde_json::Error> {
    let export: BrowserHistoryExport = serde_json::from_str(json)?;
    Ok(BrowsingHistory::new(
        export.entries.into_iter().filter_map(|entry| entry.title),
    ))
}

/// Parse a location-history export, keeping the address of each place visit.
///
/// # Errors
/// Returns the JSON error when `json` does not have the expected shape.
pub fn parse_visited_places(json: &str) -> Result<VisitedPlaces, serde_json::Error> {
    let export: LocationHistoryExport = serde_json::from_str(json)?;
    Ok(VisitedPlaces::new(
        export
            .timeline_objects
            .into_iter()
            .filter_map(|object| object.place_visit?.location?.address),
    ))
}

fn load<T>(
    path: &Utf8Path,
    parse: impl FnOnce(&str) -> Result<T, serde_json::Error>,
) -> Result<T, SignalLoadError> {
    let json = read_to_string(path).map_err(|source| SignalLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&json).map_err(|source| SignalLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load browsing history from a browser-history export file.
///
/// # Errors
/// Returns [`SignalLoadError`] when the file cannot be read or parsed.
pub fn load_browsing_history(path: &Utf8Path) -> Result<BrowsingHistory, SignalLoadError> {
    let history = load(path, parse_browsing_history)?;
    debug!("loaded {} browsing titles from {path}", history.titles().len());
    Ok(history)
}

/// Load visited places from a location-history export file.
///
/// # Errors
/// Returns [`SignalLoadError`] when the file cannot be read or parsed.
pub fn load_visited_places(path: &Utf8Path) -> Result<VisitedPlaces, SignalLoadError> {
    let visited = load(path, parse_visited_places)?;
    debug!("loaded {} visited places from {path}", visited.places().len());
    Ok(visited)
}
