//! Score value object (unit interval).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A composite answer score in [0.0, 1.0].
///
/// Scores are ephemeral per-turn values; the session keeps a history of
/// them for analytics but they are never authoritative state on their own.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// The zero score.
    pub const ZERO: Self = Self(0.0);

    /// The maximum score.
    pub const MAX: Self = Self(1.0);

    /// Creates a new Score, clamping to the unit interval.
    ///
    /// Non-finite input clamps to zero.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Creates a Score, returning an error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::out_of_range("score", 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if this score meets the given threshold.
    pub fn meets(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_unit_interval() {
        assert_eq!(Score::new(0.0).value(), 0.0);
        assert_eq!(Score::new(0.5).value(), 0.5);
        assert_eq!(Score::new(1.0).value(), 1.0);
    }

    #[test]
    fn new_clamps_out_of_range() {
        assert_eq!(Score::new(-0.5).value(), 0.0);
        assert_eq!(Score::new(1.5).value(), 1.0);
    }

    #[test]
    fn new_treats_nan_as_zero() {
        assert_eq!(Score::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(Score::try_new(1.01).is_err());
        assert!(Score::try_new(-0.01).is_err());
        assert!(Score::try_new(0.75).is_ok());
    }

    #[test]
    fn meets_compares_against_threshold() {
        assert!(Score::new(0.6).meets(0.5));
        assert!(Score::new(0.5).meets(0.5));
        assert!(!Score::new(0.4).meets(0.5));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(format!("{}", Score::new(0.456)), "0.46");
    }
}
