//! # Command Tree
//!
//! The intermediate representation between planning and emission. Planning
//! produces it without any font access; the interpreter consumes it once, in
//! document order, against a live surface.

use super::coord::Coordinate;
use super::style::TextStyle;

/// A run of text at a possibly-deferred position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: Coordinate,
    pub y: Coordinate,
    pub style: TextStyle,
}

/// A rectangle in frame coordinates: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Marks the start of one `<text>` element. Never reaches the surface.
    TextBlock,
    /// Text at its natural width.
    FlowText(TextRun),
    /// Text scaled to fill exactly `width`.
    BoxedText { run: TextRun, width: f64 },
    /// Affine matrix `[a, b, c, d, e, f]` relative to the frame origin.
    Transform([f64; 6]),
    /// Intersect the clip with the current path.
    Clip,
    SaveState,
    RestoreState,
    /// A nested frame. Children run inside it.
    BoundingBox(Region),
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
    Fill,
    Stroke,
    FillAndStroke,
    SetFillColor(Rgb),
    SetStrokeColor(Rgb),
    SetLineWidth(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub op: Operation,
    pub children: Vec<DrawCommand>,
}

impl DrawCommand {
    pub fn leaf(op: Operation) -> Self {
        Self {
            op,
            children: Vec::new(),
        }
    }

    pub fn with_children(op: Operation, children: Vec<DrawCommand>) -> Self {
        Self { op, children }
    }
}

impl From<Operation> for DrawCommand {
    fn from(op: Operation) -> Self {
        DrawCommand::leaf(op)
    }
}
