//! Reaction policy: when to show a supportive popup, and what it says.
//!
//! Two gates guard every evaluation. The cooldown comes first, so no
//! randomness is consumed while it is active. Negative emotions then always
//! trigger; anything else triggers with a small check-in probability.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::catalog;
use crate::constants::{NUDGE_PROBABILITY, POPUP_COOLDOWN, POPUP_TITLE};
use crate::emotion::Emotion;

/// Receives popups. Implementations must return promptly and handle their
/// own failures; the policy never learns whether a popup was shown.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message)
    }
}

/// Why an evaluation did or did not produce a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Inside the cooldown window.
    Cooling,
    /// Not negative and the check-in roll failed.
    Skipped,
    /// Popup dispatched with this catalog message.
    Triggered(&'static str),
}

impl Verdict {
    pub fn triggered(self) -> bool {
        matches!(self, Verdict::Triggered(_))
    }
}

#[derive(Debug, Clone)]
pub struct ReactionPolicy {
    cooldown: Duration,
    nudge_probability: f64,
    last_popup: Option<Instant>,
}

impl ReactionPolicy {
    /// `nudge_probability` is clamped to [0, 1].
    pub fn new(cooldown: Duration, nudge_probability: f64) -> Self {
        Self {
            cooldown,
            nudge_probability: nudge_probability.clamp(0.0, 1.0),
            last_popup: None,
        }
    }

    /// Evaluate the gates for `stable` at `now`, dispatching a popup to
    /// `notifier` if both pass. Returns whether a popup was dispatched.
    pub fn maybe_react<R, N>(
        &mut self,
        stable: Emotion,
        now: Instant,
        rng: &mut R,
        notifier: &N,
    ) -> bool
    where
        R: Rng + ?Sized,
        N: Notifier + ?Sized,
    {
        self.evaluate(stable, now, rng, notifier).triggered()
    }

    /// Same as `maybe_react`, but reports which gate decided.
    pub fn evaluate<R, N>(
        &mut self,
        stable: Emotion,
        now: Instant,
        rng: &mut R,
        notifier: &N,
    ) -> Verdict
    where
        R: Rng + ?Sized,
        N: Notifier + ?Sized,
    {
        if self.cooling_down(now) {
            return Verdict::Cooling;
        }

        if !stable.is_negative() && !rng.random_bool(self.nudge_probability) {
            return Verdict::Skipped;
        }

        self.last_popup = Some(now);
        let message = catalog::choose(stable, rng);
        notifier.notify(POPUP_TITLE, message);
        Verdict::Triggered(message)
    }

    /// True while `now` is within the cooldown of the last popup.
    pub fn cooling_down(&self, now: Instant) -> bool {
        self.last_popup
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    pub fn last_popup(&self) -> Option<Instant> {
        self.last_popup
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for ReactionPolicy {
    fn default() -> Self {
        Self::new(POPUP_COOLDOWN, NUDGE_PROBABILITY)
    }
}
