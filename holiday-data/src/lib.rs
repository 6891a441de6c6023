//! Data access adapters for the holiday recommendation engine.
//!
//! Responsibilities:
//! - Persist and query place sightings in SQLite.
//! - Resolve driving routes through the Routes API over HTTPS.
//! - Load browsing and location history exports.
//!
//! Boundaries:
//! - Do not encode ranking or scoring rules (live in `holiday-core`).
//! - Keep blocking I/O off async executors; the HTTP client bridges to
//!   the synchronous core traits itself.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod fs;
pub mod history;
pub mod routing;
pub mod sightings;

pub use history::{
    SignalLoadError, load_browsing_history, load_visited_places, parse_browsing_history,
    parse_visited_places,
};
pub use routing::{HttpRouteMatrixClient, HttpRouteMatrixConfig, ProviderBuildError};
pub use sightings::{SqliteSightingStore, SqliteSightingStoreError};
