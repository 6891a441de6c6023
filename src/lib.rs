//! Facade crate for the holiday recommendation engine.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the SQLite sighting store, history loaders, and Routes API
//! client.

#![forbid(unsafe_code)]

pub use holiday_core::{
    AffinityMap, AffinityScore, BrowsingHistory, ChunkedDistanceResolver, DecayScorer,
    DistanceInfo, DistanceResolver, EngineConfig, EngineError, Intent, MemorySessionStore,
    OriginParts, PlaceSighting, Recommendation, RecommendationEngine, RecommendationPage, Reply,
    RouteMatrixClient, SessionId, SightingRepository, SortKey, SourceId, VisitedPlaces, respond,
};

#[cfg(feature = "data")]
pub use holiday_data::{
    HttpRouteMatrixClient, HttpRouteMatrixConfig, SqliteSightingStore, load_browsing_history,
    load_visited_places,
};
