//! Parsing of facial-analysis responses into a `Classification`.
//!
//! Analysis services answer in one of three shapes: a single face record,
//! a list of face records, or an object wrapping that list under `results`.
//! Only the first face is used. Extra fields (per-emotion scores, ages,
//! eye positions) are ignored.

use std::fmt;

use serde::Deserialize;

use crate::emotion::{Classification, Emotion, FaceRegion};

#[derive(Debug)]
pub enum AnalysisError {
    /// The response listed no faces.
    Empty,
    /// `dominant_emotion` is outside the closed set.
    UnknownEmotion(String),
    Json(serde_json::Error),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Empty => write!(f, "analysis returned no faces"),
            AnalysisError::UnknownEmotion(label) => {
                write!(f, "unknown dominant emotion: '{label}'")
            }
            AnalysisError::Json(e) => write!(f, "malformed analysis: {e}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Json(e)
    }
}

#[derive(Debug, Deserialize)]
struct FaceRecord {
    dominant_emotion: String,
    #[serde(default)]
    region: Option<RawRegion>,
}

#[derive(Debug, Deserialize)]
struct RawRegion {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response {
    Wrapped { results: Vec<FaceRecord> },
    Many(Vec<FaceRecord>),
    One(FaceRecord),
}

/// Parse a raw JSON response body.
pub fn parse_analysis(body: &str) -> Result<Classification, AnalysisError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    from_value(value)
}

/// Convert an already-decoded JSON response.
pub fn from_value(value: serde_json::Value) -> Result<Classification, AnalysisError> {
    let first = match serde_json::from_value::<Response>(value)? {
        Response::One(record) => record,
        Response::Many(records) | Response::Wrapped { results: records } => {
            records.into_iter().next().ok_or(AnalysisError::Empty)?
        }
    };

    let dominant: Emotion = first
        .dominant_emotion
        .parse()
        .map_err(|_| AnalysisError::UnknownEmotion(first.dominant_emotion.clone()))?;

    Ok(Classification {
        dominant,
        region: first.region.and_then(to_region),
    })
}

/// Largest coordinate or extent accepted from a response, in pixels.
const MAX_COORDINATE: f64 = 1e6;

/// Degenerate or out-of-range boxes count as "no region".
fn to_region(raw: RawRegion) -> Option<FaceRegion> {
    let in_range = |v: f64| v.is_finite() && v.abs() <= MAX_COORDINATE;
    if ![raw.x, raw.y, raw.w, raw.h].into_iter().all(in_range) {
        return None;
    }
    let region = FaceRegion {
        x: raw.x.round() as i32,
        y: raw.y.round() as i32,
        w: raw.w.round() as i32,
        h: raw.h.round() as i32,
    };
    (region.w > 0 && region.h > 0).then_some(region)
}
