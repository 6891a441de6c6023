//! Travel durations and their display labels.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SECONDS_PER_MINUTE: u64 = 60;
const MINUTES_PER_HOUR: u64 = 60;

/// Driving time split into whole hours and minutes.
///
/// Seconds beyond the last whole minute are discarded. The display form is
/// the label shown to users, for example `"2h 5m"`.
///
/// # Examples
/// ```
/// use holiday_core::TravelDuration;
///
/// let duration = TravelDuration::from_seconds(7_530);
/// assert_eq!(duration.to_string(), "2h 5m");
/// assert_eq!(duration.total_minutes(), 125);
/// assert_eq!("2h 5m".parse::<TravelDuration>(), Ok(duration));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TravelDuration {
    /// Whole hours.
    pub hours: u64,
    /// Minutes past the hour, always below 60.
    pub minutes: u64,
}

impl TravelDuration {
    /// Split `seconds` into hours and minutes.
    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        let total_minutes = seconds.div_euclid(SECONDS_PER_MINUTE);
        Self {
            hours: total_minutes.div_euclid(MINUTES_PER_HOUR),
            minutes: total_minutes.rem_euclid(MINUTES_PER_HOUR),
        }
    }

    /// Duration expressed in whole minutes.
    #[must_use]
    pub const fn total_minutes(&self) -> u64 {
        self.hours
            .saturating_mul(MINUTES_PER_HOUR)
            .saturating_add(self.minutes)
    }
}

impl fmt::Display for TravelDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Error returned when a duration label or wire value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration: {input:?}")]
pub struct ParseDurationError {
    /// Text that failed to parse.
    pub input: String,
}

impl ParseDurationError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }
}

impl FromStr for TravelDuration {
    type Err = ParseDurationError;

    /// Parse a label of the form `"{hours}h {minutes}m"`.
    ///
    /// Whitespace around either component is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, rest) = s
            .trim()
            .split_once('h')
            .ok_or_else(|| ParseDurationError::new(s))?;
        let minutes = rest
            .trim()
            .strip_suffix('m')
            .ok_or_else(|| ParseDurationError::new(s))?;
        let hours = hours
            .trim()
            .parse()
            .map_err(|_| ParseDurationError::new(s))?;
        let minutes: u64 = minutes
            .trim()
            .parse()
            .map_err(|_| ParseDurationError::new(s))?;
        if minutes >= MINUTES_PER_HOUR {
            return Err(ParseDurationError::new(s));
        }
        Ok(Self { hours, minutes })
    }
}

/// Parse a routing-service duration such as `"754s"` into whole seconds.
///
/// A fractional part is accepted and truncated.
///
/// # Errors
/// Returns [`ParseDurationError`] when the value lacks the `s` suffix or the
/// seconds are not a non-negative decimal number.
///
/// # Examples
/// ```
/// use holiday_core::parse_wire_seconds;
///
/// assert_eq!(parse_wire_seconds("754s"), Ok(754));
/// assert_eq!(parse_wire_seconds("3.5s"), Ok(3));
/// assert!(parse_wire_seconds("soon").is_err());
/// ```
pub fn parse_wire_seconds(value: &str) -> Result<u64, ParseDurationError> {
    let digits = value
        .trim()
        .strip_suffix('s')
        .ok_or_else(|| ParseDurationError::new(value))?;
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseDurationError::new(value));
    }
    whole
        .parse()
        .map_err(|_| ParseDurationError::new(value))
}
