//! Per-frame emotion classifiers.
//!
//! `HttpClassifier` talks to a DeepFace-style analysis service: the frame is
//! posted as a base64 data URI to `<url>/analyze` with face detection not
//! enforced, so a frame without a face still yields a best-effort label.
//! `ScriptedClassifier` replays canned responses for offline runs.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use mood_core::{AnalysisError, Classification, parse_analysis};

use crate::capture::Frame;

#[derive(Debug)]
pub enum ClassifyError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Analysis(AnalysisError),
    /// The backend reported no usable face for this frame.
    NoFace,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Http(e) => write!(f, "analysis request failed: {e}"),
            ClassifyError::Status { status, body } => {
                write!(f, "analysis service returned {status}: {body}")
            }
            ClassifyError::Analysis(e) => write!(f, "{e}"),
            ClassifyError::NoFace => write!(f, "no face detected"),
        }
    }
}

impl std::error::Error for ClassifyError {}

impl From<reqwest::Error> for ClassifyError {
    fn from(e: reqwest::Error) -> Self {
        ClassifyError::Http(e)
    }
}

impl From<AnalysisError> for ClassifyError {
    fn from(e: AnalysisError) -> Self {
        ClassifyError::Analysis(e)
    }
}

pub trait Classifier {
    async fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError>;
}

pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    detector_backend: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str, detector_backend: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = format!("{}/analyze", base_url.trim_end_matches('/'));
        tracing::info!("classifying frames via {endpoint}");
        Ok(Self {
            client,
            endpoint,
            detector_backend: detector_backend.to_string(),
        })
    }

    fn request_body(&self, frame: &Frame) -> serde_json::Value {
        let encoded = BASE64_STANDARD.encode(&frame.bytes);
        serde_json::json!({
            "img": format!("data:{};base64,{encoded}", frame.mime),
            "actions": ["emotion"],
            "detector_backend": self.detector_backend,
            "enforce_detection": false,
        })
    }
}

impl Classifier for HttpClassifier {
    async fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(frame))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }
        Ok(parse_analysis(&body)?)
    }
}

/// Replays a JSON-lines file, one line per sampled frame, cycling at the
/// end. A `null` line stands for a frame the backend could not analyse.
pub struct ScriptedClassifier {
    lines: Vec<String>,
    next: usize,
}

impl ScriptedClassifier {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let script = Self::from_lines(&text);
        anyhow::ensure!(
            !script.lines.is_empty(),
            "script {} has no responses",
            path.display()
        );
        tracing::info!(
            "replaying {} scripted responses from {}",
            script.lines.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn from_lines(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { lines, next: 0 }
    }
}

impl Classifier for ScriptedClassifier {
    async fn classify(&mut self, _frame: &Frame) -> Result<Classification, ClassifyError> {
        if self.lines.is_empty() {
            return Err(ClassifyError::NoFace);
        }
        let line = &self.lines[self.next % self.lines.len()];
        self.next += 1;
        if line == "null" {
            return Err(ClassifyError::NoFace);
        }
        Ok(parse_analysis(line)?)
    }
}

/// The classifier picked at startup.
pub enum AnyClassifier {
    Http(HttpClassifier),
    Scripted(ScriptedClassifier),
}

impl Classifier for AnyClassifier {
    async fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError> {
        match self {
            AnyClassifier::Http(c) => c.classify(frame).await,
            AnyClassifier::Scripted(c) => c.classify(frame).await,
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_core::{Emotion, FaceRegion, FrameSize};

    fn frame() -> Frame {
        Frame {
            index: 10,
            bytes: b"\xff\xd8jpeg".to_vec(),
            mime: "image/jpeg",
            size: FrameSize::new(640, 480),
        }
    }

    #[tokio::test]
    async fn test_script_cycles_and_maps_null_to_no_face() {
        let mut c = ScriptedClassifier::from_lines(concat!(
            "# warmup\n",
            r#"{"dominant_emotion": "sad", "region": {"x": 1, "y": 2, "w": 3, "h": 4}}"#,
            "\n\nnull\n",
        ));
        let first = c.classify(&frame()).await.unwrap();
        assert_eq!(first.dominant, Emotion::Sad);
        assert_eq!(first.region, Some(FaceRegion::new(1, 2, 3, 4)));
        assert!(matches!(c.classify(&frame()).await, Err(ClassifyError::NoFace)));
        assert_eq!(c.classify(&frame()).await.unwrap().dominant, Emotion::Sad);
    }

    #[tokio::test]
    async fn test_script_malformed_line_is_analysis_error() {
        let mut c = ScriptedClassifier::from_lines("[]\n{\"dominant_emotion\": \"calm\"}\n");
        assert!(matches!(
            c.classify(&frame()).await,
            Err(ClassifyError::Analysis(AnalysisError::Empty))
        ));
        assert!(matches!(
            c.classify(&frame()).await,
            Err(ClassifyError::Analysis(AnalysisError::UnknownEmotion(_)))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let c = HttpClassifier::new("http://localhost:5005/", "opencv", Duration::from_secs(1))
            .unwrap();
        assert_eq!(c.endpoint, "http://localhost:5005/analyze");
        let body = c.request_body(&frame());
        assert_eq!(body["actions"], serde_json::json!(["emotion"]));
        assert_eq!(body["enforce_detection"], false);
        assert_eq!(body["detector_backend"], "opencv");
        let img = body["img"].as_str().unwrap();
        assert!(img.starts_with("data:image/jpeg;base64,"), "{img}");
        assert_eq!(&img[23..], BASE64_STANDARD.encode(b"\xff\xd8jpeg"));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("ééé", 2), "éé…");
    }
}
