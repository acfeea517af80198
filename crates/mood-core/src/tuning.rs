use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::constants::{FRAME_SKIP, HISTORY_LENGTH, NUDGE_PROBABILITY, POPUP_COOLDOWN};
use crate::stabilizer::TieBreak;

/// The handful of constants that shape smoothing and reaction timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    pub history_length: usize,
    pub frame_skip: u64,
    /// Seconds between popups.
    pub popup_cooldown_secs: f64,
    pub nudge_probability: f64,
    pub tie_break: TieBreak,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            history_length: HISTORY_LENGTH,
            frame_skip: FRAME_SKIP,
            popup_cooldown_secs: POPUP_COOLDOWN.as_secs_f64(),
            nudge_probability: NUDGE_PROBABILITY,
            tie_break: TieBreak::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    ZeroHistory,
    ZeroFrameSkip,
    InvalidCooldown(f64),
    InvalidProbability(f64),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::ZeroHistory => write!(f, "history_length must be at least 1"),
            TuningError::ZeroFrameSkip => write!(f, "frame_skip must be at least 1"),
            TuningError::InvalidCooldown(v) => {
                write!(f, "popup_cooldown_secs must be a finite, non-negative number (got {v})")
            }
            TuningError::InvalidProbability(p) => {
                write!(f, "nudge_probability must be within [0, 1] (got {p})")
            }
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.history_length == 0 {
            return Err(TuningError::ZeroHistory);
        }
        if self.frame_skip == 0 {
            return Err(TuningError::ZeroFrameSkip);
        }
        if !self.popup_cooldown_secs.is_finite() || self.popup_cooldown_secs < 0.0 {
            return Err(TuningError::InvalidCooldown(self.popup_cooldown_secs));
        }
        if !(0.0..=1.0).contains(&self.nudge_probability) {
            return Err(TuningError::InvalidProbability(self.nudge_probability));
        }
        Ok(())
    }

    /// Cooldown as a `Duration`. Call after `validate`.
    pub fn popup_cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.popup_cooldown_secs).unwrap_or(POPUP_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let t = Tuning::default();
        assert_eq!(t.validate(), Ok(()));
        assert_eq!(t.history_length, 5);
        assert_eq!(t.frame_skip, 10);
        assert_eq!(t.popup_cooldown(), Duration::from_secs(10));
        assert_eq!(t.tie_break, TieBreak::MostRecent);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = |f: fn(&mut Tuning)| {
            let mut t = Tuning::default();
            f(&mut t);
            t.validate().unwrap_err()
        };
        assert_eq!(bad(|t| t.history_length = 0), TuningError::ZeroHistory);
        assert_eq!(bad(|t| t.frame_skip = 0), TuningError::ZeroFrameSkip);
        assert_eq!(bad(|t| t.popup_cooldown_secs = -1.0), TuningError::InvalidCooldown(-1.0));
        assert_eq!(bad(|t| t.nudge_probability = 1.5), TuningError::InvalidProbability(1.5));
        assert!(matches!(
            bad(|t| t.nudge_probability = f64::NAN),
            TuningError::InvalidProbability(_)
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t: Tuning =
            serde_json::from_str(r#"{"frame_skip": 3, "tie_break": "first-seen"}"#).unwrap();
        assert_eq!(t.frame_skip, 3);
        assert_eq!(t.history_length, HISTORY_LENGTH);
        assert_eq!(t.tie_break, TieBreak::FirstSeen);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<Tuning>(r#"{"frameskip": 3}"#).is_err());
    }
}
