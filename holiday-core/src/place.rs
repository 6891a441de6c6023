//! Place sightings and the affinity scores aggregated from them.
//!
//! A [`PlaceSighting`] is one timestamped observation of a place name taken
//! from an upstream source such as a saved social-media post. Sightings are
//! immutable; scoring folds them into an [`AffinityMap`] keyed by place name.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of the upstream record a sighting was extracted from.
///
/// # Examples
/// ```
/// use holiday_core::SourceId;
///
/// let id = SourceId::new("post-42");
/// assert_eq!(id.as_str(), "post-42");
/// assert_eq!(id.to_string(), "post-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SourceId(String);

impl SourceId {
    /// Wrap an upstream identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timestamped observation of a place name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaceSighting {
    /// Name of the place as extracted upstream.
    pub place_name: String,
    /// Instant at which the user interacted with the source.
    pub timestamp: DateTime<Utc>,
    /// Upstream record the place was found in.
    pub source_id: SourceId,
}

impl PlaceSighting {
    /// Construct a sighting.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use holiday_core::{PlaceSighting, SourceId};
    ///
    /// let at = Utc.with_ymd_and_hms(2023, 8, 10, 12, 0, 0).unwrap();
    /// let sighting = PlaceSighting::new("Paris", at, SourceId::new("p1"));
    /// assert_eq!(sighting.place_name, "Paris");
    /// ```
    #[must_use]
    pub fn new(place_name: impl Into<String>, timestamp: DateTime<Utc>, source_id: SourceId) -> Self {
        Self {
            place_name: place_name.into(),
            timestamp,
            source_id,
        }
    }
}

/// Affinity of the user for a single place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffinityScore {
    /// Place the score belongs to.
    pub place_name: String,
    /// Accumulated interest; larger is stronger.
    pub score: f64,
}

/// Affinity scores keyed by place name.
///
/// Place names are unique keys. Iteration follows lexical name order; use
/// [`AffinityMap::ranked`] for the canonical descending-score order.
///
/// # Examples
/// ```
/// use holiday_core::AffinityMap;
///
/// let mut map = AffinityMap::new();
/// map.accumulate("Paris", 0.5);
/// map.accumulate("Paris", 0.25);
/// map.accumulate("Lyon", 1.0);
///
/// let ranked = map.ranked();
/// assert_eq!(ranked[0].place_name, "Lyon");
/// assert_eq!(map.get("Paris"), Some(0.75));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AffinityMap {
    scores: BTreeMap<String, f64>,
}

impl AffinityMap {
    /// Construct an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the score for `place_name`, inserting it when absent.
    #[expect(
        clippy::float_arithmetic,
        reason = "sightings compound additively"
    )]
    pub fn accumulate(&mut self, place_name: &str, delta: f64) {
        if let Some(score) = self.scores.get_mut(place_name) {
            *score += delta;
        } else {
            self.scores.insert(place_name.to_owned(), delta);
        }
    }

    /// Overwrite the score for `place_name`.
    pub fn insert(&mut self, place_name: impl Into<String>, score: f64) {
        self.scores.insert(place_name.into(), score);
    }

    /// Return the score for `place_name`, if present.
    #[must_use]
    pub fn get(&self, place_name: &str) -> Option<f64> {
        self.scores.get(place_name).copied()
    }

    /// Report whether `place_name` has a score.
    #[must_use]
    pub fn contains(&self, place_name: &str) -> bool {
        self.scores.contains_key(place_name)
    }

    /// Number of distinct places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Report whether the map holds no places.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate over `(place_name, score)` pairs in lexical name order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Mutably iterate over scores in lexical name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut f64)> {
        self.scores
            .iter_mut()
            .map(|(name, score)| (name.as_str(), score))
    }

    /// Return the scores sorted by descending score, ties broken by name.
    #[must_use]
    pub fn ranked(&self) -> Vec<AffinityScore> {
        let mut ranked: Vec<AffinityScore> = self
            .scores
            .iter()
            .map(|(name, score)| AffinityScore {
                place_name: name.clone(),
                score: *score,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.place_name.cmp(&b.place_name))
        });
        ranked
    }

    /// Place names in canonical ranked order.
    #[must_use]
    pub fn ranked_names(&self) -> Vec<String> {
        self.ranked()
            .into_iter()
            .map(|entry| entry.place_name)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for AffinityMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            scores: iter
                .into_iter()
                .map(|(name, score)| (name.into(), score))
                .collect(),
        }
    }
}
