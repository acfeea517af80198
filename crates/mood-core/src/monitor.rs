use std::time::Instant;

use rand::Rng;

use crate::emotion::{Classification, Emotion, FaceRegion};
use crate::overlay::{DrawCommand, FrameSize, annotate};
use crate::reaction::{Notifier, ReactionPolicy, Verdict};
use crate::sampling::FrameGate;
use crate::stabilizer::Stabilizer;
use crate::tuning::Tuning;

/// Outcome of feeding one classification into the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub raw: Emotion,
    pub stable: Emotion,
    pub verdict: Verdict,
}

impl Observation {
    pub fn reacted(&self) -> bool {
        self.verdict.triggered()
    }
}

/// All per-session state between the classifier and the user.
///
/// The loop calls `tick` once per captured frame; when it returns true the
/// loop classifies that frame and hands a successful result to `apply`.
/// Failed classifications are simply not applied, which leaves the stable
/// emotion and face region untouched.
#[derive(Debug, Clone)]
pub struct Monitor {
    gate: FrameGate,
    stabilizer: Stabilizer,
    policy: ReactionPolicy,
    face: Option<FaceRegion>,
    current: Emotion,
}

impl Monitor {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            gate: FrameGate::new(tuning.frame_skip),
            stabilizer: Stabilizer::new(tuning.history_length, tuning.tie_break),
            policy: ReactionPolicy::new(tuning.popup_cooldown(), tuning.nudge_probability),
            face: None,
            current: Emotion::Neutral,
        }
    }

    /// Advance the frame counter; true if this frame should be classified.
    pub fn tick(&mut self) -> bool {
        self.gate.tick()
    }

    pub fn apply<R, N>(
        &mut self,
        classification: Classification,
        now: Instant,
        rng: &mut R,
        notifier: &N,
    ) -> Observation
    where
        R: Rng + ?Sized,
        N: Notifier + ?Sized,
    {
        if let Some(region) = classification.region {
            self.face = Some(region);
        }
        self.current = self.stabilizer.observe(classification.dominant);
        let verdict = self.policy.evaluate(self.current, now, rng, notifier);

        Observation {
            raw: classification.dominant,
            stable: self.current,
            verdict,
        }
    }

    /// Stable emotion; `neutral` until the first sample.
    pub fn current(&self) -> Emotion {
        self.current
    }

    /// Most recent face region any classification reported.
    pub fn face(&self) -> Option<FaceRegion> {
        self.face
    }

    pub fn frames_seen(&self) -> u64 {
        self.gate.frames()
    }

    pub fn stabilizer(&self) -> &Stabilizer {
        &self.stabilizer
    }

    pub fn policy(&self) -> &ReactionPolicy {
        &self.policy
    }

    pub fn overlay(&self, size: FrameSize) -> Vec<DrawCommand> {
        annotate(self.current, self.face, size)
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::reaction::tests::Recorder;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn quiet() -> Tuning {
        Tuning {
            nudge_probability: 0.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_starts_neutral_without_face() {
        let m = Monitor::default();
        assert_eq!(m.current(), Emotion::Neutral);
        assert_eq!(m.face(), None);
        assert_eq!(m.frames_seen(), 0);
    }

    #[test]
    fn test_region_persists_when_omitted() {
        let mut m = Monitor::new(&quiet());
        let mut rng = SmallRng::seed_from_u64(1);
        let rec = Recorder::default();
        let now = Instant::now();
        let region = FaceRegion::new(1, 2, 3, 4);

        m.apply(Classification::new(Emotion::Happy).with_region(region), now, &mut rng, &rec);
        m.apply(Classification::new(Emotion::Happy), now, &mut rng, &rec);
        assert_eq!(m.face(), Some(region));

        let moved = FaceRegion::new(9, 9, 3, 4);
        m.apply(Classification::new(Emotion::Happy).with_region(moved), now, &mut rng, &rec);
        assert_eq!(m.face(), Some(moved));
    }

    #[test]
    fn test_out_of_range_region_keeps_last_good_box() {
        let mut m = Monitor::new(&quiet());
        let mut rng = SmallRng::seed_from_u64(1);
        let rec = Recorder::default();
        let now = Instant::now();
        let good = FaceRegion::new(10, 10, 40, 40);
        m.apply(Classification::new(Emotion::Happy).with_region(good), now, &mut rng, &rec);

        let body = r#"{
            "dominant_emotion": "happy",
            "region": {"x": 2147483647, "y": 10, "w": 10, "h": 10}
        }"#;
        let wild = crate::analysis::parse_analysis(body).unwrap();
        m.apply(wild, now, &mut rng, &rec);

        assert_eq!(m.face(), Some(good));
        assert_eq!(m.overlay(FrameSize::new(640, 480)).len(), 22);
    }

    #[test]
    fn test_intermediate_frames_leave_state_alone() {
        let mut m = Monitor::new(&quiet());
        let mut rng = SmallRng::seed_from_u64(1);
        let rec = Recorder::default();
        let t0 = Instant::now();
        let mut stable_per_frame = Vec::new();

        for frame in 1..=30u64 {
            if m.tick() {
                assert_eq!(frame % 10, 0);
                m.apply(Classification::new(Emotion::Surprise), t0, &mut rng, &rec);
            }
            stable_per_frame.push(m.current());
        }
        assert!(stable_per_frame[..9].iter().all(|&e| e == Emotion::Neutral));
        assert!(stable_per_frame[9..].iter().all(|&e| e == Emotion::Surprise));
        assert_eq!(m.stabilizer().len(), 3);
    }

    #[test]
    fn test_negative_stable_emotion_triggers_once_per_cooldown() {
        let mut m = Monitor::new(&quiet());
        let mut rng = SmallRng::seed_from_u64(3);
        let rec = Recorder::default();
        let t0 = Instant::now();

        let obs: Vec<Observation> = (0..4u64)
            .map(|i| {
                let now = t0 + Duration::from_secs(4 * i);
                m.apply(Classification::new(Emotion::Angry), now, &mut rng, &rec)
            })
            .collect();

        // 0s fires, 4s and 8s cool down, 12s fires again.
        let fired: Vec<bool> = obs.iter().map(Observation::reacted).collect();
        assert_eq!(fired, vec![true, false, false, true]);
        assert_eq!(rec.shown.borrow().len(), 2);
        assert!(matches!(obs[1].verdict, Verdict::Cooling));
    }

    #[test]
    fn test_overlay_reflects_state() {
        let mut m = Monitor::new(&quiet());
        let mut rng = SmallRng::seed_from_u64(1);
        let rec = Recorder::default();
        let region = FaceRegion::new(50, 60, 70, 80);
        let sample = Classification::new(Emotion::Happy).with_region(region);
        m.apply(sample, Instant::now(), &mut rng, &rec);

        let cmds = m.overlay(FrameSize::new(640, 480));
        let texts: Vec<&str> = cmds.iter().filter_map(DrawCommand::as_text).collect();
        assert_eq!(texts[0], "Happy");
        assert_eq!(*texts.last().unwrap(), "Current: Happy");
    }
}
