//! Tunable constants for scoring, ranking, and pagination.
//!
//! [`EngineConfig::default`] carries the documented constants;
//! deployments override individual fields (for example the allow-list) via
//! configuration files.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decay::DEFAULT_DECAY_LAMBDA;
use crate::distance::DEFAULT_CHUNK_SIZE;
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Destinations that receive the allow-list mention boost by default.
pub const DEFAULT_ALLOW_LIST: [&str; 5] = ["San Diego", "Los Angeles", "Irvine", "Hawaii", "newyork"];

/// Mentions added to allow-listed destinations before reinforcement.
pub const DEFAULT_ALLOW_LIST_BOOST: u32 = 14_500;

/// Origin used when a session has not set one.
pub const DEFAULT_ORIGIN: &str = "San Jose";

/// Distance threshold in miles used when a session has not set one.
pub const DEFAULT_DISTANCE_THRESHOLD_MILES: f64 = 500.0;

/// Configuration for a [`RecommendationEngine`](crate::RecommendationEngine).
///
/// # Examples
/// ```
/// use holiday_core::EngineConfig;
///
/// let config = EngineConfig {
///     allow_list: vec!["Kyoto".to_owned()],
///     ..EngineConfig::default()
/// }
/// .validate()
/// .expect("valid configuration");
/// assert_eq!(config.page_size, 5);
/// assert_eq!(config.chunk_size, 49);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    /// Decay constant λ in `2^(-λ · days)`.
    pub decay_lambda: f64,
    /// Score growth per browsing-history mention.
    pub mention_weight: f64,
    /// Destinations that receive [`EngineConfig::allow_list_boost`] extra mentions.
    pub allow_list: Vec<String>,
    /// Mentions added to allow-listed destinations.
    pub allow_list_boost: u32,
    /// Multiplier applied to places the user has already visited.
    pub visited_penalty: f64,
    /// Multiplier applied to every place that survives distance filtering.
    pub flat_boost: f64,
    /// Maximum destinations per routing request.
    pub chunk_size: usize,
    /// Recommendations per page.
    pub page_size: usize,
    /// Origin used when the session has none.
    pub default_origin: String,
    /// Threshold used when the session has none.
    pub default_distance_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_lambda: DEFAULT_DECAY_LAMBDA,
            mention_weight: 0.1,
            allow_list: DEFAULT_ALLOW_LIST.iter().map(|&name| name.to_owned()).collect(),
            allow_list_boost: DEFAULT_ALLOW_LIST_BOOST,
            visited_penalty: 0.8,
            flat_boost: 1.5,
            chunk_size: DEFAULT_CHUNK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            default_origin: DEFAULT_ORIGIN.to_owned(),
            default_distance_threshold: DEFAULT_DISTANCE_THRESHOLD_MILES,
        }
    }
}

/// Errors returned by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A multiplier or rate was NaN, infinite, or negative.
    #[error("{field} must be finite and non-negative")]
    InvalidFactor {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A batch or page size was zero.
    #[error("{field} must be greater than zero")]
    ZeroSize {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The default origin was blank.
    #[error("default origin must not be blank")]
    BlankOrigin,
}

impl EngineConfig {
    /// Validate the configuration and return it.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a factor is not finite or negative, a
    /// size is zero, or the default origin is blank.
    pub fn validate(self) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("decay_lambda", self.decay_lambda),
            ("mention_weight", self.mention_weight),
            ("visited_penalty", self.visited_penalty),
            ("flat_boost", self.flat_boost),
            ("default_distance_threshold", self.default_distance_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFactor { field });
            }
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroSize { field: "chunk_size" });
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroSize { field: "page_size" });
        }
        if self.default_origin.trim().is_empty() {
            return Err(ConfigError::BlankOrigin);
        }
        Ok(self)
    }

    /// Report whether `place_name` is on the allow-list.
    ///
    /// Matching is exact and case-sensitive.
    #[must_use]
    pub fn is_allow_listed(&self, place_name: &str) -> bool {
        self.allow_list.iter().any(|entry| entry == place_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case::nan_lambda(EngineConfig { decay_lambda: f64::NAN, ..EngineConfig::default() }, "decay_lambda")]
    #[case::negative_penalty(EngineConfig { visited_penalty: -0.1, ..EngineConfig::default() }, "visited_penalty")]
    #[case::infinite_boost(EngineConfig { flat_boost: f64::INFINITY, ..EngineConfig::default() }, "flat_boost")]
    fn rejects_invalid_factors(#[case] config: EngineConfig, #[case] expected: &'static str) {
        let err = config.validate().expect_err("invalid factor");
        assert_eq!(err, ConfigError::InvalidFactor { field: expected });
    }

    #[rstest]
    fn rejects_zero_chunk_size() {
        let config = EngineConfig {
            chunk_size: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate().expect_err("zero chunk"),
            ConfigError::ZeroSize { field: "chunk_size" }
        );
    }

    #[rstest]
    fn allow_list_matches_exactly() {
        let config = EngineConfig::default();
        assert!(config.is_allow_listed("Irvine"));
        assert!(!config.is_allow_listed("irvine"));
        assert!(!config.is_allow_listed("Irvine Spectrum"));
    }
}
