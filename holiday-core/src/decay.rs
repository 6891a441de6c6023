//! Exponential time decay of place sightings.
//!
//! Each sighting contributes `2^(-λ · days)` to its place, where `days` is
//! the number of whole days elapsed since the sighting. Contributions for the
//! same place are summed, so a place seen often and recently outranks one
//! seen once long ago.

use chrono::{DateTime, Utc};
use log::debug;

use crate::place::{AffinityMap, PlaceSighting};

/// Default decay constant λ.
pub const DEFAULT_DECAY_LAMBDA: f64 = 0.1;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days elapsed from `then` to `now`, rounded towards negative infinity.
///
/// Sightings in the future yield negative values.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use holiday_core::days_elapsed;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
/// assert_eq!(days_elapsed(now, now - Duration::hours(47)), 1);
/// assert_eq!(days_elapsed(now, now + Duration::hours(1)), -1);
/// ```
#[must_use]
pub fn days_elapsed(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (now - then).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Contribution of a single sighting observed `days` ago.
///
/// # Examples
/// ```
/// use holiday_core::decay_score;
///
/// assert_eq!(decay_score(0, 0.1), 1.0);
/// assert!((decay_score(10, 0.1) - 0.5).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decay is defined over real-valued exponents"
)]
#[expect(
    clippy::cast_precision_loss,
    reason = "day counts are far below 2^52"
)]
pub fn decay_score(days: i64, lambda: f64) -> f64 {
    (-lambda * days as f64).exp2()
}

/// Folds sightings into decayed affinity scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayScorer {
    lambda: f64,
}

impl Default for DecayScorer {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_LAMBDA)
    }
}

impl DecayScorer {
    /// Construct a scorer with decay constant `lambda`.
    #[must_use]
    pub const fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    /// Decay constant in use.
    #[must_use]
    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Score `sightings` relative to `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use holiday_core::{DecayScorer, PlaceSighting, SourceId};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    /// let sightings = [
    ///     PlaceSighting::new("Paris", now - Duration::days(5), SourceId::new("a")),
    ///     PlaceSighting::new("Paris", now - Duration::days(5), SourceId::new("b")),
    /// ];
    /// let scores = DecayScorer::default().score(&sightings, now);
    /// let paris = scores.get("Paris").unwrap();
    /// assert!((paris - 2.0 * 2f64.powf(-0.5)).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn score<'a, I>(&self, sightings: I, now: DateTime<Utc>) -> AffinityMap
    where
        I: IntoIterator<Item = &'a PlaceSighting>,
    {
        let mut scores = AffinityMap::new();
        for sighting in sightings {
            let days = days_elapsed(now, sighting.timestamp);
            scores.accumulate(&sighting.place_name, decay_score(days, self.lambda));
        }
        debug!("decayed sightings into {} place scores", scores.len());
        scores
    }
}
