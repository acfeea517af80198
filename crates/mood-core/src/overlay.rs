//! Overlay annotation as plain draw commands.
//!
//! Geometry is laid out for a 640x480 capture but follows whatever frame
//! size it is given. Text sizes use a fixed-advance estimate of a simplex
//! stroke font (about 20px per glyph at scale 1.0), which is close enough to
//! size the label tab behind the emotion name.

use crate::emotion::{Color, Emotion, FaceRegion};

/// Legend order on screen.
pub const LEGEND_ORDER: [Emotion; 7] = [
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Angry,
    Emotion::Fear,
    Emotion::Surprise,
    Emotion::Disgust,
    Emotion::Neutral,
];

pub const QUIT_HINT: &str = "Press 'q' to quit";
pub const LEGEND_HEADING: &str = "Emotion Colors:";

const GLYPH_ADVANCE: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

const fn pt(x: i32, y: i32) -> Point {
    Point { x, y }
}

/// Stroke of a rectangle: filled or outlined with a pixel thickness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    Filled,
    Outline(u8),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        top_left: Point,
        bottom_right: Point,
        color: Color,
        stroke: Stroke,
    },
    Text {
        text: String,
        origin: Point,
        scale: f32,
        color: Color,
        thickness: u8,
    },
}

impl DrawCommand {
    fn rect(top_left: Point, bottom_right: Point, color: Color, stroke: Stroke) -> Self {
        DrawCommand::Rect {
            top_left,
            bottom_right,
            color,
            stroke,
        }
    }

    fn text(
        text: impl Into<String>,
        origin: Point,
        scale: f32,
        color: Color,
        thickness: u8,
    ) -> Self {
        DrawCommand::Text {
            text: text.into(),
            origin,
            scale,
            color,
            thickness,
        }
    }

    /// Text payload, if this is a text command.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { text, .. } => Some(text),
            DrawCommand::Rect { .. } => None,
        }
    }
}

/// Estimated pixel width of `text` at `scale`.
pub fn text_width(text: &str, scale: f32) -> i32 {
    (text.chars().count() as f32 * GLYPH_ADVANCE * scale).round() as i32
}

/// Everything drawn over one frame, in paint order.
pub fn annotate(stable: Emotion, face: Option<FaceRegion>, size: FrameSize) -> Vec<DrawCommand> {
    let mut cmds = Vec::with_capacity(24);
    if let Some(region) = face {
        face_box(&mut cmds, stable, region);
    }
    legend(&mut cmds, size);
    cmds.push(DrawCommand::text(QUIT_HINT, pt(20, 30), 0.6, Color::WHITE, 1));
    cmds.push(status_line(stable, size));
    cmds
}

/// "Current: <Label>" in the top-right corner.
pub fn status_line(stable: Emotion, size: FrameSize) -> DrawCommand {
    DrawCommand::text(
        format!("Current: {}", stable.label()),
        pt(size.width as i32 - 200, 30),
        0.6,
        stable.color(),
        2,
    )
}

fn face_box(cmds: &mut Vec<DrawCommand>, stable: Emotion, r: FaceRegion) {
    let color = stable.color();
    let label = stable.label();
    // Regions come from the classifier; saturate rather than overflow.
    cmds.push(DrawCommand::rect(
        pt(r.x, r.y),
        pt(r.x.saturating_add(r.w), r.y.saturating_add(r.h)),
        color,
        Stroke::Outline(2),
    ));
    cmds.push(DrawCommand::rect(
        pt(r.x, r.y.saturating_sub(30)),
        pt(r.x.saturating_add(text_width(label, 0.7) + 10), r.y),
        color,
        Stroke::Filled,
    ));
    cmds.push(DrawCommand::text(
        label,
        pt(r.x.saturating_add(5), r.y.saturating_sub(10)),
        0.7,
        Color::BLACK,
        2,
    ));
}

fn legend(cmds: &mut Vec<DrawCommand>, size: FrameSize) {
    let x = 20;
    let y = size.height as i32 - 180;
    let (tl, br) = (pt(x - 10, y - 10), pt(x + 150, y + 160));

    cmds.push(DrawCommand::rect(tl, br, Color::PANEL, Stroke::Filled));
    cmds.push(DrawCommand::rect(tl, br, Color::WHITE, Stroke::Outline(1)));
    cmds.push(DrawCommand::text(LEGEND_HEADING, pt(x, y + 15), 0.5, Color::WHITE, 1));

    for (i, emotion) in LEGEND_ORDER.into_iter().enumerate() {
        let row = y + 35 + i as i32 * 20;
        cmds.push(DrawCommand::rect(
            pt(x, row - 10),
            pt(x + 15, row + 5),
            emotion.color(),
            Stroke::Filled,
        ));
        cmds.push(DrawCommand::text(emotion.label(), pt(x + 25, row), 0.4, Color::WHITE, 1));
    }
}
