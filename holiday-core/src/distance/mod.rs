//! Resolve driving distance and time from an origin to candidate places.
//!
//! The [`RouteMatrixClient`] trait abstracts a routing service that answers
//! one origin against a batch of destinations. [`ChunkedDistanceResolver`]
//! splits arbitrarily many candidates into batches, issues them in order, and
//! keeps whatever resolves: a failed batch or a malformed entry costs only
//! the destinations it covers. [`ResolutionDiagnostics`] reports the losses.

mod duration;
mod error;
mod matrix;
mod resolver;

pub use duration::{ParseDurationError, TravelDuration, parse_wire_seconds};
pub use error::BatchError;
pub use matrix::{
    BatchResponse, DistanceInfo, METERS_PER_MILE, ROUTE_EXISTS, RouteMatrixClient,
    RouteMatrixEntry, meters_to_miles,
};
pub use resolver::{
    ChunkedDistanceResolver, DEFAULT_CHUNK_SIZE, DistanceResolution, DistanceResolver,
    ResolutionDiagnostics,
};
