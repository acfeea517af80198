//! Fixed compliment catalog and the per-emotion slices drawn from it.
//!
//! The negative-emotion slices overlap (index 6 belongs to all three). The
//! overlap is kept as shipped. The last message shipped with a trailing
//! space; it is stored trimmed.

use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::emotion::Emotion;

pub const COMPLIMENTS: [&str; 10] = [
    "You're amazing!",
    "You are stronger than you think!",
    "You're doing great! Keep going!",
    "You are loved and appreciated!",
    "You're a wonderful person!",
    "This feeling will pass. Be gentle with yourself.",
    "Take a deep breath. You've got this!",
    "Your resilience is inspiring!",
    "Remember your strength in past challenges.",
    "Small steps forward are still progress!",
];

/// Catalog indices eligible for `emotion`.
pub fn slice_for(emotion: Emotion) -> RangeInclusive<usize> {
    match emotion {
        Emotion::Sad => 5..=7,
        Emotion::Angry => 4..=6,
        Emotion::Fear => 6..=9,
        _ => 0..=4,
    }
}

/// Messages eligible for `emotion`, in catalog order.
pub fn messages_for(emotion: Emotion) -> &'static [&'static str] {
    &COMPLIMENTS[slice_for(emotion)]
}

/// Pick one message for `emotion` uniformly at random.
pub fn choose<R: Rng + ?Sized>(emotion: Emotion, rng: &mut R) -> &'static str {
    // Every slice is non-empty, so the fallback is never taken.
    messages_for(emotion)
        .choose(rng)
        .copied()
        .unwrap_or(COMPLIMENTS[0])
}

/// Catalog index of `message`, if it is one of ours.
pub fn index_of(message: &str) -> Option<usize> {
    COMPLIMENTS.iter().position(|m| *m == message)
}
