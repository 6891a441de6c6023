//! SQLite persistence for place sightings.

use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, SecondsFormat, Utc};
use holiday_core::{PlaceSighting, RepositoryError, SightingRepository, SourceId};
use log::debug;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row, params};
use thiserror::Error;

use crate::fs::ensure_parent_dir;

const CREATE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sightings (
    place_name TEXT NOT NULL,
    source_id TEXT NOT NULL,
    observed_at TEXT NOT NULL,
    PRIMARY KEY (place_name, source_id)
)";

const SELECT_ALL: &str =
    "SELECT place_name, source_id, observed_at FROM sightings ORDER BY observed_at, place_name";

const SELECT_ONE: &str = "SELECT place_name, source_id, observed_at FROM sightings \
     WHERE place_name = ?1 AND source_id = ?2";

const SELECT_NAMES: &str = "SELECT DISTINCT place_name FROM sightings ORDER BY place_name";

const INSERT: &str =
    "INSERT OR IGNORE INTO sightings (place_name, source_id, observed_at) VALUES (?1, ?2, ?3)";

/// Errors raised by [`SqliteSightingStore`].
#[derive(Debug, Error)]
pub enum SqliteSightingStoreError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `sightings` table failed.
    #[error("failed to create sightings table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A query or statement failed.
    #[error("sightings query failed")]
    Query {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A stored timestamp is not valid RFC 3339.
    #[error("sighting of {place_name:?} has invalid timestamp {value:?}")]
    Timestamp {
        /// Place whose row is corrupt.
        place_name: String,
        /// Stored text.
        value: String,
        /// Parser error.
        #[source]
        source: chrono::ParseError,
    },
}

impl From<SqliteSightingStoreError> for RepositoryError {
    fn from(err: SqliteSightingStoreError) -> Self {
        Self::with_source("SQLite sighting store", err)
    }
}

/// [`SightingRepository`] stored in a SQLite database.
///
/// Sightings are keyed by place name and source; inserting a duplicate pair
/// leaves the stored row untouched.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use holiday_core::{PlaceSighting, SightingRepository, SourceId};
/// use holiday_data::SqliteSightingStore;
///
/// let store = SqliteSightingStore::open_in_memory()?;
/// let sighting = PlaceSighting::new("Yosemite", Utc::now(), SourceId::new("post-7"));
/// assert!(store.insert(&sighting)?);
/// assert!(!store.insert(&sighting)?);
/// assert_eq!(store.find_all()?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteSightingStore {
    connection: Mutex<Connection>,
}

impl SqliteSightingStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error when the parent directory, the database, or the
    /// schema cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteSightingStoreError> {
        ensure_parent_dir(path).map_err(|source| SqliteSightingStoreError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteSightingStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!("opened sightings database at {path}");
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteSightingStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteSightingStoreError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteSightingStoreError> {
        connection
            .execute(CREATE_SCHEMA, [])
            .map_err(|source| SqliteSightingStoreError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn into_sighting(
        (place_name, source_id, observed_at): (String, String, String),
    ) -> Result<PlaceSighting, SqliteSightingStoreError> {
        let timestamp = DateTime::parse_from_rfc3339(&observed_at)
            .map_err(|source| SqliteSightingStoreError::Timestamp {
                place_name: place_name.clone(),
                value: observed_at.clone(),
                source,
            })?
            .with_timezone(&Utc);
        Ok(PlaceSighting::new(
            place_name,
            timestamp,
            SourceId::new(source_id),
        ))
    }

    fn query_all(&self) -> Result<Vec<PlaceSighting>, SqliteSightingStoreError> {
        let connection = self.lock();
        let mut statement = connection
            .prepare(SELECT_ALL)
            .map_err(|source| SqliteSightingStoreError::Query { source })?;
        let rows = statement
            .query_map([], Self::read_row)
            .map_err(|source| SqliteSightingStoreError::Query { source })?;
        rows.map(|row| {
            row.map_err(|source| SqliteSightingStoreError::Query { source })
                .and_then(Self::into_sighting)
        })
        .collect()
    }

    fn query_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, SqliteSightingStoreError> {
        self.lock()
            .query_row(
                SELECT_ONE,
                params![place_name, source_id.as_str()],
                Self::read_row,
            )
            .optional()
            .map_err(|source| SqliteSightingStoreError::Query { source })?
            .map(Self::into_sighting)
            .transpose()
    }

    fn insert_row(&self, sighting: &PlaceSighting) -> Result<bool, SqliteSightingStoreError> {
        let observed_at = sighting
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let changed = self
            .lock()
            .execute(
                INSERT,
                params![
                    sighting.place_name,
                    sighting.source_id.as_str(),
                    observed_at
                ],
            )
            .map_err(|source| SqliteSightingStoreError::Query { source })?;
        Ok(changed > 0)
    }

    fn query_names(&self) -> Result<Vec<String>, SqliteSightingStoreError> {
        let connection = self.lock();
        let mut statement = connection
            .prepare(SELECT_NAMES)
            .map_err(|source| SqliteSightingStoreError::Query { source })?;
        let names = statement
            .query_map([], |row| row.get(0))
            .map_err(|source| SqliteSightingStoreError::Query { source })?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|source| SqliteSightingStoreError::Query { source })?;
        Ok(names)
    }
}

impl SightingRepository for SqliteSightingStore {
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError> {
        Ok(self.query_all()?)
    }

    fn find_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, RepositoryError> {
        Ok(self.query_one(place_name, source_id)?)
    }

    fn insert(&self, sighting: &PlaceSighting) -> Result<bool, RepositoryError> {
        Ok(self.insert_row(sighting)?)
    }

    fn distinct_place_names(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.query_names()?)
    }
}
