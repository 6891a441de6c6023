//! Core domain logic for the holiday recommendation engine.
//!
//! Responsibilities:
//! - Turn timestamped place sightings into decayed affinity scores.
//! - Reinforce affinity with browsing history and penalise visited places.
//! - Resolve driving distances in fixed-size batches, tolerating failures.
//! - Rank, filter, and paginate recommendations per caller session.
//!
//! Boundaries:
//! - No network or database access; collaborators sit behind
//!   [`SightingRepository`] and [`RouteMatrixClient`].
//! - Adapters for concrete services live in `holiday-data`.
//!
//! Invariants:
//! - Place names are the join key between scores and distances.
//! - Ranking never mutates cached session affinity.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod conversation;
pub mod decay;
pub mod distance;
pub mod engine;
pub mod pagination;
pub mod place;
pub mod ranking;
pub mod reinforce;
pub mod repository;
pub mod session;
pub mod signals;

#[doc(hidden)]
pub mod test_support;

pub use config::{
    ConfigError, DEFAULT_ALLOW_LIST, DEFAULT_ALLOW_LIST_BOOST, DEFAULT_DISTANCE_THRESHOLD_MILES,
    DEFAULT_ORIGIN, EngineConfig,
};
pub use conversation::{Intent, OriginParts, Reply, respond};
pub use decay::{DEFAULT_DECAY_LAMBDA, DecayScorer, days_elapsed, decay_score};
pub use distance::{
    BatchError, BatchResponse, ChunkedDistanceResolver, DEFAULT_CHUNK_SIZE, DistanceInfo,
    DistanceResolution, DistanceResolver, METERS_PER_MILE, ParseDurationError, ROUTE_EXISTS,
    ResolutionDiagnostics, RouteMatrixClient, RouteMatrixEntry, TravelDuration, meters_to_miles,
    parse_wire_seconds,
};
pub use engine::{
    Clock, EngineError, RecommendationEngine, RecommendationPage, SessionSettings, SystemClock,
    known_places, place_scores,
};
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageCursor, paginate};
pub use place::{AffinityMap, AffinityScore, PlaceSighting, SourceId};
pub use ranking::{ParseSortKeyError, RankingPolicy, Recommendation, SortKey, sort_recommendations};
pub use reinforce::{effective_mentions, reinforce, reinforcement_factor};
pub use repository::{RepositoryError, SightingRepository};
pub use session::{
    MemorySessionStore, SessionHandle, SessionId, SessionState, SessionStore, lock_session,
};
pub use signals::{BrowsingHistory, VisitedPlaces};
