//! Session-scoped recommendation pipeline.
//!
//! [`RecommendationEngine`] ties the pieces together. On the first request
//! of a session it loads every sighting, applies decay, and reinforces the
//! result with browsing history; that map is cached in the session and
//! reused by later pages and re-sorts. Each request then resolves distances
//! from the session origin, ranks, and slices out the requested page.

use chrono::{DateTime, Utc};
use log::{debug, info};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::decay::DecayScorer;
use crate::distance::{DistanceResolver, ResolutionDiagnostics};
use crate::pagination::{Page, paginate};
use crate::place::{AffinityMap, AffinityScore};
use crate::ranking::{RankingPolicy, Recommendation, SortKey};
use crate::reinforce::reinforce;
use crate::repository::{RepositoryError, SightingRepository};
use crate::session::{MemorySessionStore, SessionId, SessionState, SessionStore, lock_session};
use crate::signals::{BrowsingHistory, VisitedPlaces};

/// Errors returned by [`RecommendationEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The repository holds nothing to report.
    #[error("no {what} found")]
    NotFound {
        /// What was looked for.
        what: &'static str,
    },
    /// A caller-supplied value could not be used.
    #[error("invalid {field}: {reason}")]
    MalformedInput {
        /// Name of the offending input.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The sighting repository failed.
    #[error("failed to read sightings")]
    Repository {
        /// Backend failure.
        #[from]
        source: RepositoryError,
    },
}

/// Source of the current instant.
pub trait Clock {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settings currently stored in a session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSettings {
    /// Origin set by the caller, if any.
    pub origin: Option<String>,
    /// Threshold set by the caller, if any.
    pub distance_threshold: Option<f64>,
    /// Page the cursor points at.
    pub page: usize,
}

/// One page of recommendations plus the context it was computed in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecommendationPage {
    /// Origin distances were measured from.
    pub origin: String,
    /// Threshold applied, in miles.
    pub distance_threshold: f64,
    /// Ordering applied.
    pub sort_by: SortKey,
    /// The requested page.
    pub page: Page<Recommendation>,
    /// How distance resolution went.
    pub diagnostics: ResolutionDiagnostics,
}

/// Distinct place names in `repository`.
///
/// # Errors
/// Returns [`EngineError::NotFound`] when the repository is empty and
/// [`EngineError::Repository`] when it cannot be read.
pub fn known_places<R: SightingRepository + ?Sized>(
    repository: &R,
) -> Result<Vec<String>, EngineError> {
    let names = repository.distinct_place_names()?;
    if names.is_empty() {
        return Err(EngineError::NotFound { what: "places" });
    }
    Ok(names)
}

/// Decayed, unreinforced scores for every place in `repository`.
///
/// Scores are ordered by descending score, ties by name.
///
/// # Errors
/// Returns [`EngineError::NotFound`] when the repository is empty and
/// [`EngineError::Repository`] when it cannot be read.
pub fn place_scores<R: SightingRepository + ?Sized>(
    repository: &R,
    scorer: &DecayScorer,
    now: DateTime<Utc>,
) -> Result<Vec<AffinityScore>, EngineError> {
    let sightings = repository.find_all()?;
    let scores = scorer.score(&sightings, now).ranked();
    if scores.is_empty() {
        return Err(EngineError::NotFound {
            what: "place scores",
        });
    }
    Ok(scores)
}

/// Recommends places to sessions.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use holiday_core::{
///     ChunkedDistanceResolver, EngineConfig, MemorySessionStore, PlaceSighting,
///     RecommendationEngine, SessionId, SortKey, SourceId,
/// };
/// use holiday_core::test_support::{FixedClock, MemorySightingRepository, StubRouteMatrixClient};
///
/// let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
/// let repository = MemorySightingRepository::with_sightings([
///     PlaceSighting::new("Paris", now - Duration::days(5), SourceId::new("a")),
///     PlaceSighting::new("Paris", now - Duration::days(5), SourceId::new("b")),
/// ]);
/// let resolver = ChunkedDistanceResolver::new(StubRouteMatrixClient::uniform(16_093, 1_800));
/// let engine = RecommendationEngine::new(
///     repository,
///     resolver,
///     MemorySessionStore::new(),
///     EngineConfig::default(),
/// )
/// .expect("valid configuration")
/// .with_clock(FixedClock(now));
///
/// let session = SessionId::new("demo");
/// engine.set_origin(&session, "Lyon")?;
/// let page = engine.top_recommendations(&session, SortKey::Score, 1)?;
/// assert_eq!(page.page.items.len(), 1);
/// assert!((page.page.items[0].score - 2.121).abs() < 1e-3);
/// # Ok::<(), holiday_core::EngineError>(())
/// ```
pub struct RecommendationEngine<R, D, S = MemorySessionStore> {
    repository: R,
    resolver: D,
    sessions: S,
    config: EngineConfig,
    browsing_history: BrowsingHistory,
    visited_places: VisitedPlaces,
    clock: Box<dyn Clock + Send + Sync>,
}

impl<R, D, S> std::fmt::Debug for RecommendationEngine<R, D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("config", &self.config)
            .field("browsing_history", &self.browsing_history.titles().len())
            .field("visited_places", &self.visited_places.places().len())
            .finish_non_exhaustive()
    }
}

impl<R, D, S> RecommendationEngine<R, D, S>
where
    R: SightingRepository,
    D: DistanceResolver,
    S: SessionStore,
{
    /// Assemble an engine with no browsing history or visited places.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails
    /// [`EngineConfig::validate`].
    pub fn new(
        repository: R,
        resolver: D,
        sessions: S,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            repository,
            resolver,
            sessions,
            config: config.validate()?,
            browsing_history: BrowsingHistory::default(),
            visited_places: VisitedPlaces::default(),
            clock: Box::new(SystemClock),
        })
    }

    /// Use `history` for reinforcement.
    #[must_use]
    pub fn with_browsing_history(mut self, history: BrowsingHistory) -> Self {
        self.browsing_history = history;
        self
    }

    /// Penalise places found in `visited`.
    #[must_use]
    pub fn with_visited_places(mut self, visited: VisitedPlaces) -> Self {
        self.visited_places = visited;
        self
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sighting repository in use.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Store `origin` for the session and rewind its cursor.
    ///
    /// # Errors
    /// Returns [`EngineError::MalformedInput`] when `origin` is blank.
    pub fn set_origin(&self, session: &SessionId, origin: &str) -> Result<(), EngineError> {
        let origin = origin.trim();
        if origin.is_empty() {
            return Err(EngineError::MalformedInput {
                field: "origin",
                reason: "origin must not be blank".to_owned(),
            });
        }
        lock_session(&self.sessions.open(session)).set_origin(origin);
        debug!("session {session} origin set to {origin}");
        Ok(())
    }

    /// Store the distance threshold for the session and rewind its cursor.
    ///
    /// # Errors
    /// Returns [`EngineError::MalformedInput`] when `miles` is negative or
    /// not finite.
    pub fn set_distance_threshold(&self, session: &SessionId, miles: f64) -> Result<(), EngineError> {
        if !miles.is_finite() || miles < 0.0 {
            return Err(EngineError::MalformedInput {
                field: "distance threshold",
                reason: format!("{miles} is not a non-negative number of miles"),
            });
        }
        lock_session(&self.sessions.open(session)).set_distance_threshold(miles);
        debug!("session {session} threshold set to {miles} miles");
        Ok(())
    }

    /// Settings currently stored for the session.
    #[must_use]
    pub fn session_settings(&self, session: &SessionId) -> SessionSettings {
        self.sessions.lookup(session).map_or_else(
            || SessionSettings {
                origin: None,
                distance_threshold: None,
                page: 1,
            },
            |handle| {
                let state = lock_session(&handle);
                SessionSettings {
                    origin: state.origin().map(str::to_owned),
                    distance_threshold: state.distance_threshold(),
                    page: state.cursor().page(),
                }
            },
        )
    }

    /// Return page `page` (one-indexed) of recommendations ordered by `sort_by`.
    ///
    /// The session origin and threshold are used when set, otherwise the
    /// configured defaults. The session cursor is not moved.
    ///
    /// # Errors
    /// Returns [`EngineError::Repository`] when sightings cannot be loaded
    /// for a session whose affinity is not yet cached.
    pub fn top_recommendations(
        &self,
        session: &SessionId,
        sort_by: SortKey,
        page: usize,
    ) -> Result<RecommendationPage, EngineError> {
        let handle = self.sessions.open(session);
        let mut state = lock_session(&handle);
        self.recommend(&mut state, sort_by, page)
    }

    /// Rewind the session cursor and return the first page.
    ///
    /// # Errors
    /// See [`RecommendationEngine::top_recommendations`].
    pub fn first_page(
        &self,
        session: &SessionId,
        sort_by: SortKey,
    ) -> Result<RecommendationPage, EngineError> {
        let handle = self.sessions.open(session);
        let mut state = lock_session(&handle);
        state.cursor_mut().reset();
        self.recommend(&mut state, sort_by, 1)
    }

    /// Advance the session cursor and return the page it now points at.
    ///
    /// # Errors
    /// See [`RecommendationEngine::top_recommendations`].
    pub fn next_page(
        &self,
        session: &SessionId,
        sort_by: SortKey,
    ) -> Result<RecommendationPage, EngineError> {
        let handle = self.sessions.open(session);
        let mut state = lock_session(&handle);
        let page = state.cursor_mut().advance();
        self.recommend(&mut state, sort_by, page)
    }

    /// Forget the session entirely, reporting whether it existed.
    pub fn reset_session(&self, session: &SessionId) -> bool {
        if let Some(handle) = self.sessions.lookup(session) {
            lock_session(&handle).clear();
        }
        self.sessions.clear(session)
    }

    /// Distinct place names in the repository.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] when the repository is empty.
    pub fn list_known_places(&self) -> Result<Vec<String>, EngineError> {
        known_places(&self.repository)
    }

    /// Decayed scores before reinforcement, highest first.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] when the repository is empty.
    pub fn list_place_scores(&self) -> Result<Vec<AffinityScore>, EngineError> {
        place_scores(&self.repository, &self.scorer(), self.clock.now())
    }

    const fn scorer(&self) -> DecayScorer {
        DecayScorer::new(self.config.decay_lambda)
    }

    fn reinforced_affinity(&self) -> Result<AffinityMap, EngineError> {
        let sightings = self.repository.find_all()?;
        let mut affinity = self.scorer().score(&sightings, self.clock.now());
        reinforce(&mut affinity, &self.browsing_history, &self.config);
        info!(
            "cached affinity for {} places from {} sightings",
            affinity.len(),
            sightings.len()
        );
        Ok(affinity)
    }

    fn recommend(
        &self,
        state: &mut SessionState,
        sort_by: SortKey,
        page: usize,
    ) -> Result<RecommendationPage, EngineError> {
        let origin = state
            .origin()
            .unwrap_or(&self.config.default_origin)
            .to_owned();
        let distance_threshold = state
            .distance_threshold()
            .unwrap_or(self.config.default_distance_threshold);
        let affinity = state.affinity_or_insert_with(|| self.reinforced_affinity())?;

        let candidates = affinity.ranked_names();
        let resolution = self
            .resolver
            .resolve(&origin, &candidates, self.config.chunk_size);
        let ranked = RankingPolicy::from_config(&self.config, distance_threshold).rank(
            affinity,
            &resolution.distances,
            &self.visited_places,
            sort_by,
        );
        debug!(
            "{} of {} candidates within {distance_threshold} miles of {origin}",
            ranked.len(),
            candidates.len()
        );
        Ok(RecommendationPage {
            origin,
            distance_threshold,
            sort_by,
            page: paginate(ranked, page, self.config.page_size),
            diagnostics: resolution.diagnostics,
        })
    }
}
