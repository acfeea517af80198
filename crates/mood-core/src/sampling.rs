use crate::constants::FRAME_SKIP;

/// Decides which frames are worth sending to the classifier.
///
/// The counter is 1-based: with a stride of 10 the classifier runs on frames
/// 10, 20, 30, and so on.
#[derive(Clone, Debug)]
pub struct FrameGate {
    frame_skip: u64,
    counter: u64,
}

impl FrameGate {
    /// A zero stride is treated as 1 (classify every frame).
    pub fn new(frame_skip: u64) -> Self {
        Self {
            frame_skip: frame_skip.max(1),
            counter: 0,
        }
    }

    /// Advance to the next frame. Returns true when it should be classified.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        self.counter % self.frame_skip == 0
    }

    /// Frames seen so far.
    pub fn frames(&self) -> u64 {
        self.counter
    }

    pub fn frame_skip(&self) -> u64 {
        self.frame_skip
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(FRAME_SKIP)
    }
}
