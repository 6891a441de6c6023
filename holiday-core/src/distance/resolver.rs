//! Chunked distance resolution with per-batch and per-entry fault isolation.

use std::collections::BTreeMap;

use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::duration::{ParseDurationError, TravelDuration, parse_wire_seconds};
use super::matrix::{DistanceInfo, RouteMatrixClient, RouteMatrixEntry, meters_to_miles};

/// Largest number of destinations sent in one routing request.
pub const DEFAULT_CHUNK_SIZE: usize = 49;

/// Counters describing how a resolution went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolutionDiagnostics {
    /// Requests issued.
    pub batches: usize,
    /// Requests whose response was discarded entirely.
    pub skipped_batches: usize,
    /// Individual entries discarded from otherwise usable responses.
    pub skipped_entries: usize,
}

/// Outcome of resolving distances for a set of candidates.
///
/// Candidates that could not be resolved are simply absent from
/// [`DistanceResolution::distances`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistanceResolution {
    /// Resolved destinations keyed by place name.
    pub distances: BTreeMap<String, DistanceInfo>,
    /// Batch and entry counters.
    pub diagnostics: ResolutionDiagnostics,
}

impl DistanceResolution {
    /// Travel data for `place_name`, if it was resolved.
    #[must_use]
    pub fn get(&self, place_name: &str) -> Option<&DistanceInfo> {
        self.distances.get(place_name)
    }
}

/// Resolve driving distances from an origin to candidate places.
///
/// Resolution never fails as a whole: unresolvable candidates are omitted
/// and accounted for in the diagnostics.
pub trait DistanceResolver {
    /// Resolve every candidate reachable from `origin`, requesting at most
    /// `chunk_size` destinations at a time. Zero is treated as one.
    fn resolve(
        &self,
        origin: &str,
        candidates: &[String],
        chunk_size: usize,
    ) -> DistanceResolution;
}

impl<T: DistanceResolver + ?Sized> DistanceResolver for Box<T> {
    fn resolve(
        &self,
        origin: &str,
        candidates: &[String],
        chunk_size: usize,
    ) -> DistanceResolution {
        (**self).resolve(origin, candidates, chunk_size)
    }
}

#[derive(Debug, Error)]
enum EntryRejection {
    #[error("no route exists (condition {0:?})")]
    NoRoute(Option<String>),
    #[error("destination index {index} outside batch of {len}")]
    OutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Duration(#[from] ParseDurationError),
}

/// [`DistanceResolver`] that splits candidates into fixed-size batches.
///
/// Batches are requested sequentially in candidate order. A batch whose
/// request fails is skipped without affecting the others.
///
/// # Examples
/// ```
/// use holiday_core::{ChunkedDistanceResolver, DEFAULT_CHUNK_SIZE, DistanceResolver};
/// use holiday_core::test_support::StubRouteMatrixClient;
///
/// let client = StubRouteMatrixClient::uniform(1_609, 600);
/// let resolver = ChunkedDistanceResolver::new(&client);
/// let candidates: Vec<String> = (0..120).map(|i| format!("Place {i}")).collect();
///
/// let resolution = resolver.resolve("San Jose", &candidates, DEFAULT_CHUNK_SIZE);
/// assert_eq!(client.batch_sizes(), vec![49, 49, 22]);
/// assert_eq!(resolution.distances.len(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedDistanceResolver<C> {
    client: C,
}

impl<C: RouteMatrixClient> ChunkedDistanceResolver<C> {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Borrow the underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn resolve_entry(
        entry: &RouteMatrixEntry,
        batch: &[String],
    ) -> Result<DistanceInfo, EntryRejection> {
        if !entry.route_exists() {
            return Err(EntryRejection::NoRoute(entry.condition.clone()));
        }
        // An omitted index is the zero default, like distance and duration.
        let index = entry.destination_index.unwrap_or(0);
        let place_name = batch.get(index).ok_or(EntryRejection::OutOfRange {
            index,
            len: batch.len(),
        })?;
        let seconds = entry
            .duration
            .as_deref()
            .map(parse_wire_seconds)
            .transpose()?
            .unwrap_or(0);
        Ok(DistanceInfo {
            place_name: place_name.clone(),
            distance_miles: meters_to_miles(f64::from(entry.distance_meters.unwrap_or(0))),
            duration: TravelDuration::from_seconds(seconds),
        })
    }
}

impl<C: RouteMatrixClient> DistanceResolver for ChunkedDistanceResolver<C> {
    fn resolve(
        &self,
        origin: &str,
        candidates: &[String],
        chunk_size: usize,
    ) -> DistanceResolution {
        let mut resolution = DistanceResolution::default();
        for (batch_number, batch) in candidates.chunks(chunk_size.max(1)).enumerate() {
            let diagnostics = &mut resolution.diagnostics;
            diagnostics.batches += 1;
            debug!(
                "requesting batch {batch_number} of {} destinations from {origin}",
                batch.len()
            );
            let response = match self.client.compute_route_matrix(origin, batch) {
                Ok(response) => response,
                Err(err) => {
                    warn!("skipping batch {batch_number} from {origin}: {err}");
                    diagnostics.skipped_batches += 1;
                    continue;
                }
            };
            if response.malformed_entries > 0 {
                warn!(
                    "batch {batch_number} contained {} undecodable entries",
                    response.malformed_entries
                );
                diagnostics.skipped_entries += response.malformed_entries;
            }
            for entry in &response.entries {
                match Self::resolve_entry(entry, batch) {
                    Ok(info) => {
                        resolution.distances.insert(info.place_name.clone(), info);
                    }
                    Err(reason) => {
                        debug!("skipping entry in batch {batch_number}: {reason}");
                        diagnostics.skipped_entries += 1;
                    }
                }
            }
        }
        let diagnostics = resolution.diagnostics;
        if diagnostics.skipped_batches > 0 || diagnostics.skipped_entries > 0 {
            warn!(
                "resolved {} of {} candidates from {origin}; skipped {} batches and {} entries",
                resolution.distances.len(),
                candidates.len(),
                diagnostics.skipped_batches,
                diagnostics.skipped_entries
            );
        }
        resolution
    }
}
