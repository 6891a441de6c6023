//! Route-matrix client seam and the per-destination records it yields.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::duration::TravelDuration;
use super::error::BatchError;

/// Condition reported for destinations that can be reached by road.
pub const ROUTE_EXISTS: &str = "ROUTE_EXISTS";

/// Meters in a statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Convert meters to miles.
///
/// # Examples
/// ```
/// use holiday_core::meters_to_miles;
///
/// assert!((meters_to_miles(1609.34) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "unit conversion")]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Resolved travel data for one destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceInfo {
    /// Destination place name.
    pub place_name: String,
    /// Driving distance in miles.
    pub distance_miles: f64,
    /// Driving time.
    pub duration: TravelDuration,
}

impl DistanceInfo {
    /// Driving time in whole minutes.
    #[must_use]
    pub const fn duration_minutes(&self) -> u64 {
        self.duration.total_minutes()
    }

    /// Display label for the driving time, such as `"1h 4m"`.
    #[must_use]
    pub fn duration_label(&self) -> String {
        self.duration.to_string()
    }
}

/// One element of a route-matrix response, as decoded from the wire.
///
/// Fields the service omitted are `None`. Zero-valued indices, distances,
/// and durations are routinely omitted, so their absence means zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteMatrixEntry {
    /// Index of the origin in the request.
    pub origin_index: Option<usize>,
    /// Index of the destination within the request's batch.
    pub destination_index: Option<usize>,
    /// Driving distance in meters.
    pub distance_meters: Option<u32>,
    /// Driving time in the service's `"<seconds>s"` notation.
    pub duration: Option<String>,
    /// Route condition, [`ROUTE_EXISTS`] for reachable destinations.
    pub condition: Option<String>,
}

impl RouteMatrixEntry {
    /// Report whether the service found a route.
    #[must_use]
    pub fn route_exists(&self) -> bool {
        self.condition.as_deref() == Some(ROUTE_EXISTS)
    }
}

/// Decoded response for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResponse {
    /// Elements that decoded successfully.
    pub entries: Vec<RouteMatrixEntry>,
    /// Elements present in the body that could not be decoded.
    pub malformed_entries: usize,
}

impl BatchResponse {
    /// Wrap fully decoded entries.
    #[must_use]
    pub const fn new(entries: Vec<RouteMatrixEntry>) -> Self {
        Self {
            entries,
            malformed_entries: 0,
        }
    }
}

/// Issue route-matrix requests for a single origin.
///
/// Implementations send one request per call, covering every destination in
/// `destinations`, and report `destination_index` relative to that slice.
/// Transport-level retries belong here; callers never retry.
///
/// # Examples
/// ```
/// use holiday_core::{BatchError, BatchResponse, RouteMatrixClient, RouteMatrixEntry};
///
/// struct Everywhere;
///
/// impl RouteMatrixClient for Everywhere {
///     fn compute_route_matrix(
///         &self,
///         _origin: &str,
///         destinations: &[String],
///     ) -> Result<BatchResponse, BatchError> {
///         Ok(BatchResponse::new(
///             (0..destinations.len())
///                 .map(|index| RouteMatrixEntry {
///                     origin_index: Some(0),
///                     destination_index: Some(index),
///                     distance_meters: Some(1_000),
///                     duration: Some("60s".to_owned()),
///                     condition: Some("ROUTE_EXISTS".to_owned()),
///                 })
///                 .collect(),
///         ))
///     }
/// }
///
/// let response = Everywhere.compute_route_matrix("Paris", &["Lyon".to_owned()])?;
/// assert!(response.entries[0].route_exists());
/// # Ok::<(), BatchError>(())
/// ```
pub trait RouteMatrixClient {
    /// Request driving routes from `origin` to each of `destinations`.
    ///
    /// # Errors
    /// Returns [`BatchError`] when the request cannot be completed or its
    /// body cannot be decoded.
    fn compute_route_matrix(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError>;
}

impl<T: RouteMatrixClient + ?Sized> RouteMatrixClient for &T {
    fn compute_route_matrix(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError> {
        (**self).compute_route_matrix(origin, destinations)
    }
}

impl<T: RouteMatrixClient + ?Sized> RouteMatrixClient for Box<T> {
    fn compute_route_matrix(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError> {
        (**self).compute_route_matrix(origin, destinations)
    }
}
