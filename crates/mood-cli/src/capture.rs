//! Frame sources.
//!
//! A source yields `Ok(Some(frame))` per frame, `Ok(None)` once the stream
//! has ended, and `Err` when the device itself fails. The loop treats the
//! last case as fatal.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mood_core::FrameSize;
use tokio::time::{Interval, MissedTickBehavior};

const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// One captured image, still encoded.
#[derive(Debug, Clone)]
pub struct Frame {
    /// 1-based position in the stream.
    pub index: u64,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub size: FrameSize,
}

#[derive(Debug)]
pub enum CaptureError {
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    NoFrames(PathBuf),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Open { path, source } => {
                write!(f, "could not open frame source {}: {source}", path.display())
            }
            CaptureError::NoFrames(path) => {
                write!(f, "no image frames found in {}", path.display())
            }
            CaptureError::Read { path, source } => {
                write!(f, "failed to grab frame {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Open { source, .. } | CaptureError::Read { source, .. } => Some(source),
            CaptureError::NoFrames(_) => None,
        }
    }
}

pub trait FrameSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the device. Called exactly once, on every exit path.
    fn release(&mut self);
}

/// Replays image files from a directory in file-name order.
pub struct DirectorySource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    position: usize,
    produced: u64,
    looping: bool,
    size: FrameSize,
    pacing: Option<Interval>,
}

impl DirectorySource {
    /// Must be called inside a tokio runtime when `fps > 0`.
    pub fn open(
        dir: &Path,
        fps: f64,
        looping: bool,
        size: FrameSize,
    ) -> Result<Self, CaptureError> {
        let entries = std::fs::read_dir(dir).map_err(|source| CaptureError::Open {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && mime_for(p).is_some())
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CaptureError::NoFrames(dir.to_path_buf()));
        }

        let pacing = frame_period(fps).map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        tracing::info!(
            "opened {} ({} frames, {fps} fps{})",
            dir.display(),
            paths.len(),
            if looping { ", looping" } else { "" }
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            paths,
            position: 0,
            produced: 0,
            looping,
            size,
            pacing,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for DirectorySource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.position >= self.paths.len() {
            if !self.looping || self.paths.is_empty() {
                return Ok(None);
            }
            self.position = 0;
        }

        if let Some(interval) = self.pacing.as_mut() {
            interval.tick().await;
        }

        let path = &self.paths[self.position];
        let bytes = std::fs::read(path).map_err(|source| CaptureError::Read {
            path: path.clone(),
            source,
        })?;
        let mime = mime_for(path).unwrap_or("application/octet-stream");

        self.position += 1;
        self.produced += 1;
        tracing::trace!("frame {} from {}", self.produced, path.display());

        Ok(Some(Frame {
            index: self.produced,
            bytes,
            mime,
            size: self.size,
        }))
    }

    fn release(&mut self) {
        self.paths.clear();
        self.pacing = None;
        tracing::info!("released frame source {}", self.dir.display());
    }
}

/// Time between frames at `fps`. `None` (no pacing) for zero, negative or
/// non-finite rates, and for rates too high to give a non-zero period.
fn frame_period(fps: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(fps.recip())
        .ok()
        .filter(|period| !period.is_zero())
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !FRAME_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(match ext.as_str() {
        "png" => "image/png",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VGA: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    fn frames_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_replays_in_name_order_then_ends() {
        let dir = frames_dir(&["b.jpg", "a.png", "notes.txt", "c.JPEG"]);
        let mut src = DirectorySource::open(dir.path(), 0.0, false, VGA).unwrap();
        assert_eq!(src.frame_count(), 3);

        let mut seen = Vec::new();
        while let Some(frame) = src.next_frame().await.unwrap() {
            seen.push((frame.index, String::from_utf8(frame.bytes).unwrap(), frame.mime));
        }
        assert_eq!(
            seen,
            vec![
                (1, "a.png".to_string(), "image/png"),
                (2, "b.jpg".to_string(), "image/jpeg"),
                (3, "c.JPEG".to_string(), "image/jpeg"),
            ]
        );
        assert!(src.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_looping_restarts_and_keeps_counting() {
        let dir = frames_dir(&["1.jpg", "2.jpg"]);
        let mut src = DirectorySource::open(dir.path(), 0.0, true, VGA).unwrap();
        let mut indices = Vec::new();
        for _ in 0..5 {
            indices.push(src.next_frame().await.unwrap().unwrap().index);
        }
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_missing_frame_is_device_error() {
        let dir = frames_dir(&["1.jpg", "2.jpg"]);
        let mut src = DirectorySource::open(dir.path(), 0.0, false, VGA).unwrap();
        std::fs::remove_file(dir.path().join("1.jpg")).unwrap();
        assert!(matches!(src.next_frame().await, Err(CaptureError::Read { .. })));
    }

    #[test]
    fn test_frame_period() {
        assert_eq!(frame_period(4.0), Some(Duration::from_millis(250)));
        assert_eq!(frame_period(0.0), None);
        assert_eq!(frame_period(-30.0), None);
        assert_eq!(frame_period(f64::NAN), None);
        assert_eq!(frame_period(f64::INFINITY), None);
        assert_eq!(frame_period(1e12), None);
    }

    #[tokio::test]
    async fn test_huge_fps_replays_unpaced() {
        let dir = frames_dir(&["1.jpg", "2.jpg"]);
        let mut src = DirectorySource::open(dir.path(), 1e12, false, VGA).unwrap();
        assert_eq!(src.next_frame().await.unwrap().unwrap().index, 1);
        assert_eq!(src.next_frame().await.unwrap().unwrap().index, 2);
        assert!(src.next_frame().await.unwrap().is_none());
    }

    #[test]
    fn test_open_errors() {
        let dir = frames_dir(&["readme.md"]);
        assert!(matches!(
            DirectorySource::open(dir.path(), 0.0, false, VGA),
            Err(CaptureError::NoFrames(_))
        ));
        assert!(matches!(
            DirectorySource::open(&dir.path().join("missing"), 0.0, false, VGA),
            Err(CaptureError::Open { .. })
        ));
    }
}
