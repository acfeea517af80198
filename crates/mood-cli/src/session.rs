//! The capture → classify → render loop.
//!
//! Everything runs on one task. Classification happens in-loop, so the
//! reaction state is only ever touched here; popups leave through the
//! notifier and are not waited on.

use std::time::Instant;

use anyhow::{Context, Result};
use mood_core::{Monitor, Notifier, Verdict};
use rand::Rng;

use crate::capture::FrameSource;
use crate::classifier::Classifier;
use crate::render::RenderSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Quit key or Ctrl-C.
    Quit,
    /// The frame source ran out.
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub exit: Exit,
    pub frames: u64,
    pub samples: u64,
    pub failures: u64,
    pub popups: u64,
}

pub struct Session<'a, S, C, R, G, N: ?Sized> {
    pub source: S,
    pub classifier: C,
    pub surface: R,
    pub monitor: Monitor,
    pub rng: G,
    pub notifier: &'a N,
}

impl<S, C, R, G, N> Session<'_, S, C, R, G, N>
where
    S: FrameSource,
    C: Classifier,
    R: RenderSurface,
    G: Rng,
    N: Notifier + ?Sized,
{
    /// Run until quit, end of stream, or a device failure. The source and
    /// surface are released on every one of those paths.
    pub async fn run(mut self) -> Result<Summary> {
        let mut counts = Counts::default();
        let outcome = self.drive(&mut counts).await;

        self.surface.release();
        self.source.release();
        tracing::info!("emotion monitor stopped");

        let exit = outcome?;
        Ok(Summary {
            exit,
            frames: self.monitor.frames_seen(),
            samples: counts.samples,
            failures: counts.failures,
            popups: counts.popups,
        })
    }

    async fn drive(&mut self, counts: &mut Counts) -> Result<Exit> {
        loop {
            if self.surface.poll_quit() {
                return Ok(Exit::Quit);
            }

            let frame = match self.source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("frame source ended");
                    return Ok(Exit::EndOfStream);
                }
                Err(e) => {
                    tracing::error!("{e}");
                    return Err(e).context("capture device failed");
                }
            };

            if self.monitor.tick() {
                counts.samples += 1;
                match self.classifier.classify(&frame).await {
                    Ok(classification) => {
                        let obs = self.monitor.apply(
                            classification,
                            Instant::now(),
                            &mut self.rng,
                            self.notifier,
                        );
                        tracing::debug!(
                            "frame {}: raw={} stable={} verdict={:?}",
                            frame.index,
                            obs.raw,
                            obs.stable,
                            obs.verdict
                        );
                        if let Verdict::Triggered(message) = obs.verdict {
                            counts.popups += 1;
                            tracing::info!("popup for {}: {message}", obs.stable);
                        }
                    }
                    Err(e) => {
                        counts.failures += 1;
                        tracing::warn!("error in emotion detection on frame {}: {e}", frame.index);
                    }
                }
            }

            let overlay = self.monitor.overlay(frame.size);
            self.surface
                .render(&frame, &overlay)
                .context("render surface failed")?;
        }
    }
}

#[derive(Default)]
struct Counts {
    samples: u64,
    failures: u64,
    popups: u64,
}
