//! Secondary signals that adjust affinity after decay scoring.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Free-text titles from the user's browsing history.
///
/// # Examples
/// ```
/// use holiday_core::BrowsingHistory;
///
/// let history = BrowsingHistory::new(["Cheap flights to PARIS", "paris metro map", "Lyon"]);
/// assert_eq!(history.mention_count("Paris"), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct BrowsingHistory {
    titles: Vec<String>,
}

impl BrowsingHistory {
    /// Build a history from page titles.
    #[must_use]
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// Titles in their original order.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Report whether there are no titles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Number of titles containing `place_name`, ignoring case.
    ///
    /// A title mentioning the place twice counts once.
    #[must_use]
    pub fn mention_count(&self, place_name: &str) -> usize {
        let needle = place_name.to_lowercase();
        self.titles
            .iter()
            .filter(|title| title.to_lowercase().contains(&needle))
            .count()
    }
}

/// Places the user is known to have visited.
///
/// Entries are typically street addresses; a place counts as visited when
/// any entry occurs verbatim inside its name.
///
/// # Examples
/// ```
/// use holiday_core::VisitedPlaces;
///
/// let visited = VisitedPlaces::new(["Paris"]);
/// assert!(visited.matches("Paris, France"));
/// assert!(!visited.matches("paris"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct VisitedPlaces {
    places: Vec<String>,
}

impl VisitedPlaces {
    /// Build the visited set, dropping blank entries.
    #[must_use]
    pub fn new<I, S>(places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            places: places
                .into_iter()
                .map(Into::into)
                .filter(|place: &String| !place.trim().is_empty())
                .collect(),
        }
    }

    /// Visited entries.
    #[must_use]
    pub fn places(&self) -> &[String] {
        &self.places
    }

    /// Report whether `place_name` contains any visited entry.
    #[must_use]
    pub fn matches(&self, place_name: &str) -> bool {
        self.places
            .iter()
            .any(|visited| place_name.contains(visited.as_str()))
    }
}
