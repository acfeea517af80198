//! Emotion stabilization and reaction gating.
//!
//! Sits between a noisy per-frame facial-emotion classifier and the user:
//! samples every Nth frame, smooths raw labels with a rolling majority vote,
//! keeps the last known face box, and decides when a supportive popup is due.
//!
//! Zero I/O. Capture, classification, rendering and popups are supplied by
//! the caller.

pub mod analysis;
pub mod catalog;
pub mod constants;
pub mod emotion;
pub mod monitor;
pub mod overlay;
pub mod reaction;
pub mod sampling;
pub mod stabilizer;
pub mod tuning;

pub use analysis::{AnalysisError, from_value, parse_analysis};
pub use catalog::COMPLIMENTS;
pub use constants::{
    FRAME_HEIGHT, FRAME_SKIP, FRAME_WIDTH, HISTORY_LENGTH, NUDGE_PROBABILITY, POPUP_COOLDOWN,
    POPUP_TITLE,
};
pub use emotion::{Classification, Color, Emotion, FaceRegion, ParseEmotionError};
pub use monitor::{Monitor, Observation};
pub use overlay::{DrawCommand, FrameSize, Point, Stroke, annotate};
pub use reaction::{Notifier, ReactionPolicy, Verdict};
pub use sampling::FrameGate;
pub use stabilizer::{Stabilizer, TieBreak};
pub use tuning::{Tuning, TuningError};
