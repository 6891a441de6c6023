//! In-memory collaborators used by unit, doc, and behaviour tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::distance::{BatchError, BatchResponse, RouteMatrixClient, RouteMatrixEntry};
use crate::engine::Clock;
use crate::place::{PlaceSighting, SourceId};
use crate::repository::{RepositoryError, SightingRepository};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`SightingRepository`] backed by a vector.
#[derive(Debug, Default)]
pub struct MemorySightingRepository {
    sightings: Mutex<Vec<PlaceSighting>>,
}

impl MemorySightingRepository {
    /// Create a repository holding `sightings`.
    pub fn with_sightings<I>(sightings: I) -> Self
    where
        I: IntoIterator<Item = PlaceSighting>,
    {
        Self {
            sightings: Mutex::new(sightings.into_iter().collect()),
        }
    }
}

impl SightingRepository for MemorySightingRepository {
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError> {
        Ok(lock(&self.sightings).clone())
    }

    fn find_one(
        &self,
        place_name: &str,
        source_id: &SourceId,
    ) -> Result<Option<PlaceSighting>, RepositoryError> {
        Ok(lock(&self.sightings)
            .iter()
            .find(|s| s.place_name == place_name && &s.source_id == source_id)
            .cloned())
    }

    fn insert(&self, sighting: &PlaceSighting) -> Result<bool, RepositoryError> {
        let mut sightings = lock(&self.sightings);
        let exists = sightings
            .iter()
            .any(|s| s.place_name == sighting.place_name && s.source_id == sighting.source_id);
        if !exists {
            sightings.push(sighting.clone());
        }
        Ok(!exists)
    }
}

/// [`SightingRepository`] whose every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSightingRepository;

impl SightingRepository for FailingSightingRepository {
    fn find_all(&self) -> Result<Vec<PlaceSighting>, RepositoryError> {
        Err(RepositoryError::new("repository offline"))
    }

    fn find_one(&self, _: &str, _: &SourceId) -> Result<Option<PlaceSighting>, RepositoryError> {
        Err(RepositoryError::new("repository offline"))
    }

    fn insert(&self, _: &PlaceSighting) -> Result<bool, RepositoryError> {
        Err(RepositoryError::new("repository offline"))
    }
}

/// [`Clock`] frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug)]
enum Routes {
    Uniform { meters: u32, seconds: u64 },
    PerPlace(BTreeMap<String, (u32, u64)>),
    Scripted(Mutex<VecDeque<Result<BatchResponse, BatchError>>>),
}

/// [`RouteMatrixClient`] that answers from canned data and records requests.
#[derive(Debug)]
pub struct StubRouteMatrixClient {
    routes: Routes,
    requests: Mutex<Vec<Vec<String>>>,
}

impl StubRouteMatrixClient {
    fn with_routes(routes: Routes) -> Self {
        Self {
            routes,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every destination is reachable at the same distance and time.
    #[must_use]
    pub fn uniform(meters: u32, seconds: u64) -> Self {
        Self::with_routes(Routes::Uniform { meters, seconds })
    }

    /// Only the listed places are reachable; others report no route.
    pub fn per_place<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, u32, u64)>,
        S: Into<String>,
    {
        Self::with_routes(Routes::PerPlace(
            routes
                .into_iter()
                .map(|(name, meters, seconds)| (name.into(), (meters, seconds)))
                .collect(),
        ))
    }

    /// Answer successive requests with `responses`, then with empty bodies.
    #[must_use]
    pub fn scripted(responses: Vec<Result<BatchResponse, BatchError>>) -> Self {
        Self::with_routes(Routes::Scripted(Mutex::new(responses.into())))
    }

    /// Destinations of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<String>> {
        lock(&self.requests).clone()
    }

    /// Size of every request received, in order.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        lock(&self.requests).iter().map(Vec::len).collect()
    }
}

fn route(index: usize, meters: u32, seconds: u64) -> RouteMatrixEntry {
    RouteMatrixEntry {
        origin_index: Some(0),
        destination_index: Some(index),
        distance_meters: Some(meters),
        duration: Some(format!("{seconds}s")),
        condition: Some(crate::distance::ROUTE_EXISTS.to_owned()),
    }
}

impl RouteMatrixClient for StubRouteMatrixClient {
    fn compute_route_matrix(
        &self,
        _origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError> {
        lock(&self.requests).push(destinations.to_vec());
        match &self.routes {
            Routes::Uniform { meters, seconds } => Ok(BatchResponse::new(
                (0..destinations.len())
                    .map(|index| route(index, *meters, *seconds))
                    .collect(),
            )),
            Routes::PerPlace(routes) => Ok(BatchResponse::new(
                destinations
                    .iter()
                    .enumerate()
                    .map(|(index, name)| match routes.get(name) {
                        Some(&(meters, seconds)) => route(index, meters, seconds),
                        None => RouteMatrixEntry {
                            origin_index: Some(0),
                            destination_index: Some(index),
                            condition: Some("ROUTE_NOT_FOUND".to_owned()),
                            ..RouteMatrixEntry::default()
                        },
                    })
                    .collect(),
            )),
            Routes::Scripted(script) => lock(script)
                .pop_front()
                .unwrap_or_else(|| Ok(BatchResponse::default())),
        }
    }
}
