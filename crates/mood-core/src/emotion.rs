use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of labels the classifier may report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    #[default]
    Neutral,
}

impl Emotion {
    /// Every label, in classifier order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Lowercase wire name, as the classifier spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// Capitalized display name used on the overlay.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Emotions that always warrant a popup once the cooldown has expired.
    pub fn is_negative(self) -> bool {
        matches!(self, Emotion::Sad | Emotion::Angry | Emotion::Fear)
    }

    /// Overlay color for this emotion.
    pub fn color(self) -> Color {
        match self {
            Emotion::Angry => Color::rgb(255, 0, 0),
            Emotion::Disgust => Color::rgb(255, 140, 0),
            Emotion::Fear => Color::rgb(255, 69, 0),
            Emotion::Happy => Color::rgb(0, 255, 0),
            Emotion::Sad => Color::rgb(0, 0, 255),
            Emotion::Surprise => Color::rgb(255, 255, 0),
            Emotion::Neutral => Color::rgb(0, 255, 255),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A label outside the closed emotion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEmotionError(pub String);

impl fmt::Display for ParseEmotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown emotion label: '{}'", self.0)
    }
}

impl std::error::Error for ParseEmotionError {}

impl FromStr for Emotion {
    type Err = ParseEmotionError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == lowered)
            .ok_or_else(|| ParseEmotionError(s.to_string()))
    }
}

/// Per-label counters indexed by `Emotion`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EmotionCounts([usize; 7]);

impl EmotionCounts {
    pub(crate) fn bump(&mut self, emotion: Emotion) {
        self.0[emotion.index()] += 1;
    }

    pub(crate) fn get(&self, emotion: Emotion) -> usize {
        self.0[emotion.index()]
    }
}

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const PANEL: Color = Color::rgb(50, 50, 50);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Face bounding box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl FaceRegion {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// One usable classifier verdict for a sampled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub dominant: Emotion,
    pub region: Option<FaceRegion>,
}

impl Classification {
    pub fn new(dominant: Emotion) -> Self {
        Self {
            dominant,
            region: None,
        }
    }

    pub fn with_region(mut self, region: FaceRegion) -> Self {
        self.region = Some(region);
        self
    }
}
