//! The page-drawing surface the interpreter emits into.
//!
//! Coordinates are relative to the current frame's top-left corner with the
//! y axis pointing up, so positions inside the frame have negative y.

use super::command::{Region, Rgb};
use super::style::FontSubStyle;
use crate::error::RenderError;

/// A resolved font request: everything needed to measure or draw a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: Option<String>,
    pub sub_style: FontSubStyle,
    pub size: f64,
}

/// What a text box does with text wider than the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Reduce the font size until the text fits.
    ShrinkToFit,
    /// Draw at the requested size regardless.
    Overflow,
}

/// Font-metric measurement, injected separately so it can be stubbed.
pub trait TextMeasure {
    /// Rendered width of `text` in points, kerning applied where the font has it.
    fn width_of(&self, text: &str, font: &FontSpec) -> f64;
}

/// Continuation passed to scoped surface calls.
pub type Body<'a> = &'a mut dyn FnMut(&mut dyn Surface) -> Result<(), RenderError>;

pub trait Surface: TextMeasure {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), RenderError>;
    fn line_to(&mut self, x: f64, y: f64) -> Result<(), RenderError>;
    fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    ) -> Result<(), RenderError>;
    fn close_path(&mut self) -> Result<(), RenderError>;

    fn fill(&mut self) -> Result<(), RenderError>;
    fn stroke(&mut self) -> Result<(), RenderError>;
    fn fill_and_stroke(&mut self) -> Result<(), RenderError>;
    fn set_fill_color(&mut self, color: Rgb) -> Result<(), RenderError>;
    fn set_stroke_color(&mut self, color: Rgb) -> Result<(), RenderError>;
    fn set_line_width(&mut self, width: f64) -> Result<(), RenderError>;

    /// Write raw content operators, bypassing any bookkeeping.
    fn add_content(&mut self, operators: &str) -> Result<(), RenderError>;

    fn save_graphics_state(&mut self) -> Result<(), RenderError>;
    fn restore_graphics_state(&mut self) -> Result<(), RenderError>;

    /// Concatenate `[a, b, c, d, e, f]` onto the current matrix. The matrix
    /// is applied in absolute page space.
    fn transformation_matrix(&mut self, matrix: [f64; 6]) -> Result<(), RenderError>;

    /// Absolute page position of the current frame's top-left corner.
    fn frame_origin(&self) -> (f64, f64);

    /// Width and height of the current frame.
    fn frame_size(&self) -> (f64, f64);

    /// Font size used when a run doesn't specify one.
    fn default_font_size(&self) -> f64;

    /// Draw `text` with its baseline starting at `at`.
    fn draw_text(&mut self, text: &str, at: (f64, f64), font: &FontSpec) -> Result<(), RenderError>;

    /// Draw `text` inside a box whose top-left corner is `at`.
    fn text_box(
        &mut self,
        text: &str,
        at: (f64, f64),
        width: f64,
        height: f64,
        font: &FontSpec,
        overflow: Overflow,
    ) -> Result<(), RenderError>;

    /// Run `body` inside a nested frame occupying `region`.
    fn bounding_box(&mut self, region: Region, body: Body<'_>) -> Result<(), RenderError>;
}
