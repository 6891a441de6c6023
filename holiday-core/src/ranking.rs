//! Merge affinity with travel data and order the result.
//!
//! Ranking keeps only places that have both a score and a resolved distance
//! within the threshold. Surviving scores are adjusted (visited penalty, then
//! flat boost) on a copy, so the caller's affinity map is never modified.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::distance::DistanceInfo;
use crate::place::AffinityMap;
use crate::signals::VisitedPlaces;

/// Ordering requested for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SortKey {
    /// Highest score first, then nearest.
    #[default]
    Score,
    /// Nearest first, then highest score.
    Distance,
    /// Shortest drive first, then highest score.
    Time,
}

impl SortKey {
    /// Name used in requests and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Distance => "distance",
            Self::Time => "time",
        }
    }

    /// Compare two recommendations under this key.
    ///
    /// The order is total: exhausted keys fall back to the place name.
    #[must_use]
    pub fn compare(self, a: &Recommendation, b: &Recommendation) -> Ordering {
        let by_score = || b.score.total_cmp(&a.score);
        let primary = match self {
            Self::Score => by_score().then_with(|| a.distance_miles.total_cmp(&b.distance_miles)),
            Self::Distance => a.distance_miles.total_cmp(&b.distance_miles).then_with(by_score),
            Self::Time => a.duration_minutes.cmp(&b.duration_minutes).then_with(by_score),
        };
        primary.then_with(|| a.place_name.cmp(&b.place_name))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key {0:?}; expected score, distance, or time")]
pub struct ParseSortKeyError(pub String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(Self::Score),
            "distance" => Ok(Self::Distance),
            "time" => Ok(Self::Time),
            _ => Err(ParseSortKeyError(s.to_owned())),
        }
    }
}

/// A place offered to the user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recommendation {
    /// Place name.
    pub place_name: String,
    /// Adjusted affinity score.
    pub score: f64,
    /// Driving distance from the origin in miles.
    pub distance_miles: f64,
    /// Driving time in whole minutes.
    pub duration_minutes: u64,
    /// Driving time label, such as `"1h 4m"`.
    pub duration_label: String,
}

/// Threshold and score adjustments applied while ranking.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use holiday_core::{
///     AffinityMap, DistanceInfo, EngineConfig, RankingPolicy, SortKey, TravelDuration,
///     VisitedPlaces,
/// };
///
/// let affinity: AffinityMap = [("Paris", 1.0), ("Nice", 3.0)].into_iter().collect();
/// let distances = BTreeMap::from([
///     ("Paris".to_owned(), DistanceInfo {
///         place_name: "Paris".to_owned(),
///         distance_miles: 10.0,
///         duration: TravelDuration::from_seconds(900),
///     }),
///     ("Nice".to_owned(), DistanceInfo {
///         place_name: "Nice".to_owned(),
///         distance_miles: 600.0,
///         duration: TravelDuration::from_seconds(30_000),
///     }),
/// ]);
///
/// let policy = RankingPolicy::from_config(&EngineConfig::default(), 500.0);
/// let ranked = policy.rank(&affinity, &distances, &VisitedPlaces::default(), SortKey::Score);
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].place_name, "Paris");
/// assert_eq!(ranked[0].score, 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    /// Largest admissible distance in miles.
    pub threshold_miles: f64,
    /// Multiplier for visited places.
    pub visited_penalty: f64,
    /// Multiplier for every surviving place.
    pub flat_boost: f64,
}

impl RankingPolicy {
    /// Take the multipliers from `config` and use `threshold_miles`.
    #[must_use]
    pub const fn from_config(config: &EngineConfig, threshold_miles: f64) -> Self {
        Self {
            threshold_miles,
            visited_penalty: config.visited_penalty,
            flat_boost: config.flat_boost,
        }
    }

    /// Adjusted score for a place within the threshold.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "score adjustments are multiplicative"
    )]
    pub fn adjust(&self, score: f64, visited: bool) -> f64 {
        let penalised = if visited {
            score * self.visited_penalty
        } else {
            score
        };
        penalised * self.flat_boost
    }

    /// Produce recommendations ordered by `sort_by`.
    #[must_use]
    pub fn rank(
        &self,
        affinity: &AffinityMap,
        distances: &BTreeMap<String, DistanceInfo>,
        visited: &VisitedPlaces,
        sort_by: SortKey,
    ) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = affinity
            .iter()
            .filter_map(|(place_name, score)| {
                let info = distances.get(place_name)?;
                (info.distance_miles <= self.threshold_miles).then(|| Recommendation {
                    place_name: place_name.to_owned(),
                    score: self.adjust(score, visited.matches(place_name)),
                    distance_miles: info.distance_miles,
                    duration_minutes: info.duration_minutes(),
                    duration_label: info.duration_label(),
                })
            })
            .collect();
        sort_recommendations(&mut recommendations, sort_by);
        recommendations
    }
}

/// Sort `recommendations` in place under `sort_by`.
pub fn sort_recommendations(recommendations: &mut [Recommendation], sort_by: SortKey) {
    recommendations.sort_by(|a, b| sort_by.compare(a, b));
}
