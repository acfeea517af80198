//! Render surfaces and quit signalling.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use mood_core::{DrawCommand, Stroke};
use tokio::sync::watch;

use crate::capture::Frame;

pub trait RenderSurface {
    fn render(&mut self, frame: &Frame, overlay: &[DrawCommand]) -> Result<()>;

    /// Polled once per loop iteration.
    fn poll_quit(&mut self) -> bool;

    /// Tear the surface down. Called exactly once, on every exit path.
    fn release(&mut self);
}

/// Set once the user asks to stop, from stdin or Ctrl-C.
#[derive(Clone)]
pub struct QuitSignal {
    rx: watch::Receiver<bool>,
}

impl QuitSignal {
    /// Listen for a `q` or ESC line on stdin and for Ctrl-C.
    ///
    /// End of stdin does not count as a quit request, so the monitor keeps
    /// running with stdin closed or redirected. The stdin reader is a plain
    /// detached thread: a blocking read cannot be cancelled, and it must not
    /// hold up runtime shutdown.
    pub fn listen() -> Self {
        let (tx, rx) = watch::channel(false);

        let keys = tx.clone();
        let spawned = std::thread::Builder::new()
            .name("quit-keys".into())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) if is_quit_key(&line) => {
                            let _ = keys.send(true);
                            break;
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::warn!("quit key listener unavailable: {e}");
        }

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted by user");
                let _ = tx.send(true);
            }
        });

        Self { rx }
    }

    #[cfg(test)]
    pub fn manual() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    pub fn requested(&self) -> bool {
        *self.rx.borrow()
    }
}

fn is_quit_key(line: &str) -> bool {
    matches!(line.trim(), "q" | "Q" | "\u{1b}")
}

/// Prints the annotation state to a writer whenever it changes.
///
/// Only the status line and face box are shown; the legend is static and
/// printed once.
pub struct TerminalSurface<W: Write> {
    out: W,
    quit: QuitSignal,
    last: Option<String>,
    legend_shown: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, quit: QuitSignal) -> Self {
        Self {
            out,
            quit,
            last: None,
            legend_shown: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn render(&mut self, frame: &Frame, overlay: &[DrawCommand]) -> Result<()> {
        if !self.legend_shown {
            let legend = legend_line(overlay);
            if !legend.is_empty() {
                writeln!(self.out, "{legend}").context("failed to write to terminal")?;
            }
            self.legend_shown = true;
        }

        let line = summarize(overlay);
        if self.last.as_deref() != Some(line.as_str()) {
            writeln!(self.out, "frame {}: {line}", frame.index)
                .context("failed to write to terminal")?;
            self.out.flush().context("failed to write to terminal")?;
            self.last = Some(line);
        } else {
            tracing::trace!("frame {}: unchanged", frame.index);
        }
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.quit.requested()
    }

    fn release(&mut self) {
        let _ = self.out.flush();
        tracing::info!("render surface closed");
    }
}

/// "Current: Sad | face 10,20 30x40" from an overlay.
fn summarize(overlay: &[DrawCommand]) -> String {
    let status = overlay
        .iter()
        .filter_map(DrawCommand::as_text)
        .find(|t| t.starts_with("Current: "))
        .unwrap_or("Current: ?");

    let face = overlay.iter().find_map(|cmd| match cmd {
        DrawCommand::Rect {
            top_left,
            bottom_right,
            stroke: Stroke::Outline(2),
            ..
        } => Some(format!(
            "{},{} {}x{}",
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y
        )),
        _ => None,
    });

    match face {
        Some(face) => format!("{status} | face {face}"),
        None => format!("{status} | no face"),
    }
}

fn legend_line(overlay: &[DrawCommand]) -> String {
    let mut texts = overlay.iter().filter_map(DrawCommand::as_text);
    if texts.by_ref().find(|t| *t == mood_core::overlay::LEGEND_HEADING).is_none() {
        return String::new();
    }
    let names: Vec<&str> = texts.take(mood_core::overlay::LEGEND_ORDER.len()).collect();
    format!("{} {}", mood_core::overlay::LEGEND_HEADING, names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_core::{Emotion, FaceRegion, FrameSize, annotate};

    fn frame(index: u64) -> Frame {
        Frame {
            index,
            bytes: Vec::new(),
            mime: "image/jpeg",
            size: FrameSize::new(640, 480),
        }
    }

    #[test]
    fn test_prints_only_on_change() {
        let (_tx, quit) = QuitSignal::manual();
        let mut surface = TerminalSurface::new(Vec::new(), quit);
        let size = FrameSize::new(640, 480);
        let region = FaceRegion::new(10, 20, 30, 40);

        surface.render(&frame(1), &annotate(Emotion::Neutral, None, size)).unwrap();
        surface.render(&frame(2), &annotate(Emotion::Neutral, None, size)).unwrap();
        surface.render(&frame(3), &annotate(Emotion::Sad, Some(region), size)).unwrap();

        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(
            out,
            "Emotion Colors: Happy, Sad, Angry, Fear, Surprise, Disgust, Neutral\n\
             frame 1: Current: Neutral | no face\n\
             frame 3: Current: Sad | face 10,20 30x40\n"
        );
    }

    #[test]
    fn test_manual_quit_signal() {
        let (tx, quit) = QuitSignal::manual();
        let mut surface = TerminalSurface::new(Vec::new(), quit);
        assert!(!surface.poll_quit());
        tx.send(true).unwrap();
        assert!(surface.poll_quit());
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key("q"));
        assert!(is_quit_key(" Q \n"));
        assert!(is_quit_key("\u{1b}"));
        assert!(!is_quit_key("quit"));
        assert!(!is_quit_key(""));
    }
}
