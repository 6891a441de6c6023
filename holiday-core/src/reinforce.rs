//! Browsing-history reinforcement of decayed affinity.
//!
//! Every scored place is multiplied by `1 + weight · mentions`, where
//! `mentions` counts browsing-history titles naming the place. Allow-listed
//! destinations receive a fixed number of extra mentions so they dominate
//! the ranking even without organic browsing evidence.

use log::debug;

use crate::config::EngineConfig;
use crate::place::AffinityMap;
use crate::signals::BrowsingHistory;

/// Multiplier applied to a place with `mentions` effective mentions.
///
/// # Examples
/// ```
/// use holiday_core::reinforcement_factor;
///
/// assert_eq!(reinforcement_factor(0, 0.1), 1.0);
/// assert!((reinforcement_factor(3, 0.1) - 1.3).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "reinforcement is a linear growth factor"
)]
#[expect(
    clippy::cast_precision_loss,
    reason = "mention counts are far below 2^52"
)]
pub fn reinforcement_factor(mentions: u64, weight: f64) -> f64 {
    1.0 + weight * mentions as f64
}

/// Effective mention count for `place_name`, including any allow-list boost.
#[must_use]
pub fn effective_mentions(place_name: &str, history: &BrowsingHistory, config: &EngineConfig) -> u64 {
    let organic = u64::try_from(history.mention_count(place_name)).unwrap_or(u64::MAX);
    if config.is_allow_listed(place_name) {
        organic.saturating_add(u64::from(config.allow_list_boost))
    } else {
        organic
    }
}

/// Reinforce every score in `affinity` using `history`.
///
/// # Examples
/// ```
/// use holiday_core::{reinforce, AffinityMap, BrowsingHistory, EngineConfig};
///
/// let mut affinity: AffinityMap = [("Irvine", 1.0), ("Tulsa", 1.0)].into_iter().collect();
/// reinforce(&mut affinity, &BrowsingHistory::default(), &EngineConfig::default());
/// assert!((affinity.get("Irvine").unwrap() - 1451.0).abs() < 1e-9);
/// assert_eq!(affinity.get("Tulsa"), Some(1.0));
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "scores are scaled multiplicatively"
)]
pub fn reinforce(affinity: &mut AffinityMap, history: &BrowsingHistory, config: &EngineConfig) {
    for (place_name, score) in affinity.iter_mut() {
        let mentions = effective_mentions(place_name, history, config);
        if mentions > 0 {
            debug!("reinforcing {place_name} with {mentions} mentions");
        }
        *score *= reinforcement_factor(mentions, config.mention_weight);
    }
}
