use std::time::Duration;

/// Rolling window size for majority-vote smoothing
pub const HISTORY_LENGTH: usize = 5;

/// Classifier runs once every this many frames
pub const FRAME_SKIP: u64 = 10;

/// Minimum time between two popups
pub const POPUP_COOLDOWN: Duration = Duration::from_secs(10);

/// Chance of a check-in popup when the stable emotion is not negative
pub const NUDGE_PROBABILITY: f64 = 0.05;

/// Popup window title
pub const POPUP_TITLE: &str = "💖 A Reminder for You!";

/// Capture resolution the overlay geometry is laid out for
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;
