//! Access to persisted place sightings.
//!
//! The `SightingRepository` trait is the seam between the engine and
//! whatever stores sightings. The engine only reads; `insert` exists for the
//! ingestion side, which records each place it extracts from a source.

use std::collections::BTreeSet;
use std::error::Error as StdError;

use thiserror::Error;

use crate::place::{PlaceSighting, SourceId};

/// Failure reported by a [`SightingRepository`] backend.
#[derive(Debug, Error)]
#[error("sighting repository failed: {message}")]
pub struct RepositoryError {
    /// Human-readable description of the failed operation.
    pub message: String,
    /// Underlying backend error, if any.
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl RepositoryError {
    /// Describe a failure without an underlying cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Describe a failure caused by `source`.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Queryable store of [`PlaceSighting`] records.
///
/// A sighting is identified by its place name and source; inserting the same
/// pair twice keeps the first record.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use holiday_core::{PlaceSighting, SightingRepository, SourceId};
/// use holiday_core::test_support::MemorySightingRepository;
///
/// let repository = MemorySightingRepository::default();
/// let sighting = PlaceSighting::new("Paris", Utc::now(), SourceId::new("post-1"));
/// assert!(repository.insert(&sighting)?);
/// assert!(!repository.insert(&sighting)?);
/// assert_eq!(repository.distinct_place_names()?, vec!["Paris".to_owned()]);
/// # Ok::<(), holiday_core::RepositoryError>(())
/// ```
pub trait SightingRepository {
    /// Return every stored sighting.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backend cannot be read.
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError>;

    /// Return the sighting of `place_name` taken from `source_id`, if stored.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backend cannot be read.
    fn find_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, RepositoryError>;

    /// Store `sighting` unless one with the same place and source exists.
    ///
    /// Returns `true` when a new record was written.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backend cannot be written.
    fn insert(&self, sighting: &PlaceSighting) -> Result<bool, RepositoryError>;

    /// Distinct place names in lexical order.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backend cannot be read.
    fn distinct_place_names(&self) -> Result<Vec<String>, RepositoryError> {
        let names: BTreeSet<String> = self
            .find_all()?
            .into_iter()
            .map(|sighting| sighting.place_name)
            .collect();
        Ok(names.into_iter().collect())
    }
}

impl<T: SightingRepository + ?Sized> SightingRepository for Box<T> {
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError> {
        (**self).find_all()
    }

    fn find_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, RepositoryError> {
        (**self).find_one(place_name, source_id)
    }

    fn insert(&self, sighting: &PlaceSighting) -> Result<bool, RepositoryError> {
        (**self).insert(sighting)
    }

    fn distinct_place_names(&self) -> Result<Vec<String>, RepositoryError> {
        (**self).distinct_place_names()
    }
}

impl<T: SightingRepository + ?Sized> SightingRepository for &T {
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError> {
        (**self).find_all()
    }

    fn find_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, RepositoryError> {
        (**self).find_one(place_name, source_id)
    }

    fn insert(&self, sighting: &PlaceSighting) -> Result<bool, RepositoryError> {
        (**self).insert(sighting)
    }

    fn distinct_place_names(&self) -> Result<Vec<String>, RepositoryError> {
        (**self).distinct_place_names()
    }
}
