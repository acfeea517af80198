//! Rolling majority-vote filter over raw classifier labels.
//!
//! Per-frame classifiers flicker. Keeping the last few samples and reporting
//! their mode suppresses single-sample misclassifications; with a window of 5
//! at a 10-frame sampling stride the stable label follows a real change
//! within roughly two seconds of webcam time.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::constants::HISTORY_LENGTH;
use crate::emotion::{Emotion, EmotionCounts};

/// How to choose between labels that share the highest count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The tied label observed most recently wins.
    #[default]
    MostRecent,
    /// The tied label whose first occurrence in the window is oldest wins.
    FirstSeen,
}

/// Bounded FIFO of recent samples plus the last computed majority.
#[derive(Clone, Debug)]
pub struct Stabilizer {
    history: VecDeque<Emotion>,
    capacity: usize,
    tie_break: TieBreak,
    current: Option<Emotion>,
}

impl Stabilizer {
    /// A zero capacity is treated as 1.
    pub fn new(capacity: usize, tie_break: TieBreak) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
            tie_break,
            current: None,
        }
    }

    /// Record a raw label and return the majority over the window.
    pub fn observe(&mut self, label: Emotion) -> Emotion {
        self.history.push_back(label);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let stable = majority(&self.history, self.tie_break).unwrap_or(label);
        self.current = Some(stable);
        stable
    }

    /// Last value returned by `observe`, if any sample has arrived.
    pub fn current(&self) -> Option<Emotion> {
        self.current
    }

    /// Samples currently in the window, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = Emotion> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(HISTORY_LENGTH, TieBreak::default())
    }
}

/// Mode of `window`. `None` only for an empty window.
pub fn majority(window: &VecDeque<Emotion>, tie_break: TieBreak) -> Option<Emotion> {
    let mut counts = EmotionCounts::default();
    for &e in window {
        counts.bump(e);
    }

    // Walking in tie-break order, a later label only wins with a strictly
    // higher count.
    let pick = |best: Option<Emotion>, e: Emotion| match best {
        Some(b) if counts.get(b) >= counts.get(e) => Some(b),
        _ => Some(e),
    };

    match tie_break {
        TieBreak::FirstSeen => window.iter().copied().fold(None, pick),
        TieBreak::MostRecent => window.iter().rev().copied().fold(None, pick),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Emotion::*;

    fn feed(stabilizer: &mut Stabilizer, labels: &[Emotion]) -> Vec<Emotion> {
        labels.iter().map(|&l| stabilizer.observe(l)).collect()
    }

    #[test]
    fn test_first_sample_is_stable_immediately() {
        let mut s = Stabilizer::default();
        assert_eq!(s.current(), None);
        assert_eq!(s.observe(Surprise), Surprise);
        assert_eq!(s.current(), Some(Surprise));
    }

    #[test]
    fn test_majority_flip_sequence() {
        let mut s = Stabilizer::default();
        let out = feed(&mut s, &[Happy, Happy, Sad, Sad, Sad]);
        assert_eq!(out, vec![Happy, Happy, Happy, Sad, Sad]);
    }

    #[test]
    fn test_first_seen_holds_on_ties() {
        let mut s = Stabilizer::new(5, TieBreak::FirstSeen);
        let out = feed(&mut s, &[Happy, Happy, Sad, Sad, Sad]);
        assert_eq!(out, vec![Happy, Happy, Happy, Happy, Sad]);
    }

    #[test]
    fn test_all_distinct_tie_breaks() {
        let labels = [Angry, Fear, Happy, Sad, Neutral];

        let mut recent = Stabilizer::new(5, TieBreak::MostRecent);
        assert_eq!(*feed(&mut recent, &labels).last().unwrap(), Neutral);

        let mut first = Stabilizer::new(5, TieBreak::FirstSeen);
        assert_eq!(*feed(&mut first, &labels).last().unwrap(), Angry);
    }

    #[test]
    fn test_strict_winner_ignores_tie_break() {
        for tb in [TieBreak::MostRecent, TieBreak::FirstSeen] {
            let mut s = Stabilizer::new(5, tb);
            let out = feed(&mut s, &[Fear, Sad, Fear, Happy]);
            assert_eq!(out[3], Fear, "{tb:?}");
        }
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut s = Stabilizer::default();
        feed(&mut s, &[Angry, Angry, Angry, Happy, Happy, Happy, Sad]);
        assert_eq!(s.len(), 5);
        let window: Vec<Emotion> = s.history().collect();
        assert_eq!(window, vec![Angry, Happy, Happy, Happy, Sad]);
    }

    #[test]
    fn test_evicted_samples_do_not_vote() {
        let mut s = Stabilizer::default();
        // Five angry, then four happy: one angry remains in the window.
        feed(&mut s, &[Angry; 5]);
        let out = feed(&mut s, &[Happy; 4]);
        assert_eq!(out, vec![Angry, Angry, Happy, Happy]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut s = Stabilizer::new(0, TieBreak::default());
        assert_eq!(s.capacity(), 1);
        assert_eq!(s.observe(Sad), Sad);
        assert_eq!(s.observe(Happy), Happy);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_majority_of_empty_window() {
        assert_eq!(majority(&VecDeque::new(), TieBreak::MostRecent), None);
    }
}
