//! # Command Interpreter
//!
//! Walks a command tree and issues surface calls. Most operations go
//! straight through; a few are rewritten first:
//!
//! - text runs get their deferred x resolved against the end of the
//!   previous run, are measured, scaled to their box if they have one, and
//!   shifted for their anchor;
//! - matrices are re-centred on the current frame origin, because the
//!   surface applies them in absolute page space;
//! - clip, save and restore are performed directly on the surface rather
//!   than forwarded as drawing calls;
//! - text block markers reset the cursor and vanish.
//!
//! The resolution cursor lives on the stack of a single [`Interpreter::run`]
//! call and is reset at every text block, so nothing carries over between
//! blocks or between runs.

use super::command::{DrawCommand, Operation, TextRun};
use super::style::TextAnchor;
use super::surface::{Body, FontSpec, Overflow, Surface};
use crate::error::RenderError;

/// The raw operator pair that makes the current path the clip path without
/// painting it.
pub const CLIP_OPERATORS: &str = "W n";

pub struct Interpreter;

impl Interpreter {
    /// Emit `commands` onto `surface` in document order.
    pub fn run(commands: &[DrawCommand], surface: &mut dyn Surface) -> Result<(), RenderError> {
        let mut cursor = ResolutionCursor::default();
        walk(commands, surface, &mut cursor)
    }
}

/// End x of the most recently emitted run in the current text block.
#[derive(Debug, Default, Clone, Copy)]
struct ResolutionCursor {
    end_x: Option<f64>,
}

impl ResolutionCursor {
    fn reset(&mut self) {
        self.end_x = None;
    }

    // An undefined cursor anchors at the frame's left edge.
    fn anchor(&self) -> f64 {
        self.end_x.unwrap_or(0.0)
    }
}

/// A surface call after rewriting.
enum Call<'a> {
    DrawText {
        text: &'a str,
        at: (f64, f64),
        font: FontSpec,
    },
    TextBox {
        text: &'a str,
        at: (f64, f64),
        width: f64,
        height: f64,
        font: FontSpec,
    },
    Transform([f64; 6]),
    Forward(&'a Operation),
}

fn walk(
    commands: &[DrawCommand],
    surface: &mut dyn Surface,
    cursor: &mut ResolutionCursor,
) -> Result<(), RenderError> {
    for command in commands {
        log::trace!("interpret {:?}", command.op);

        match rewrite(&command.op, surface, cursor)? {
            None => walk(&command.children, surface, cursor)?,
            Some(call) if command.children.is_empty() => issue(call, surface)?,
            Some(call) => {
                let children = &command.children;
                issue_scoped(call, surface, &mut |s: &mut dyn Surface| walk(children, s, cursor))?;
            }
        }
    }
    Ok(())
}

/// Rewrite an operation for the current frame and cursor. `None` means the
/// operation has been fully handled here and must not be forwarded.
fn rewrite<'a>(
    op: &'a Operation,
    surface: &mut dyn Surface,
    cursor: &mut ResolutionCursor,
) -> Result<Option<Call<'a>>, RenderError> {
    let call = match op {
        Operation::TextBlock => {
            cursor.reset();
            return Ok(None);
        }
        Operation::FlowText(run) => resolve_run(run, None, surface, cursor),
        Operation::BoxedText { run, width } => resolve_run(run, Some(*width), surface, cursor),
        Operation::Transform(matrix) => {
            Call::Transform(compensate_matrix(*matrix, surface.frame_origin()))
        }
        Operation::Clip => {
            surface.add_content(CLIP_OPERATORS)?;
            return Ok(None);
        }
        Operation::SaveState => {
            surface.save_graphics_state()?;
            return Ok(None);
        }
        Operation::RestoreState => {
            surface.restore_graphics_state()?;
            return Ok(None);
        }
        other => Call::Forward(other),
    };
    Ok(Some(call))
}

fn resolve_run<'a>(
    run: &'a TextRun,
    box_width: Option<f64>,
    surface: &dyn Surface,
    cursor: &mut ResolutionCursor,
) -> Call<'a> {
    let mut x = run.x.resolve(cursor.anchor());
    let mut y = run.y.resolve(0.0);
    let mut font = FontSpec {
        family: run.style.family.clone(),
        sub_style: run.style.sub_style,
        size: run.style.size.unwrap_or_else(|| surface.default_font_size()),
    };
    let natural = surface.width_of(&run.text, &font);

    let width = match box_width {
        Some(width) => {
            if natural > 0.0 {
                font.size = font.size * width / natural;
            }
            // The box is positioned by its top edge, one line above the baseline.
            y += font.size;
            width
        }
        None => natural,
    };

    let shift = run.style.anchor.map(|a| a.shift(width)).unwrap_or(0.0);
    let advance = match run.style.anchor {
        Some(TextAnchor::Middle) => width / 2.0,
        _ => width,
    };
    x -= shift;
    cursor.end_x = Some(x + advance);

    match box_width {
        Some(width) => Call::TextBox {
            text: &run.text,
            at: (x, y),
            width,
            height: font.size,
            font,
        },
        None => Call::DrawText {
            text: &run.text,
            at: (x, y),
            font,
        },
    }
}

/// Re-centre a frame-local matrix on the frame origin `(left, top)`, so that
/// applying it in absolute page space has the same effect as applying it
/// about the frame's own origin.
pub fn compensate_matrix(matrix: [f64; 6], origin: (f64, f64)) -> [f64; 6] {
    let [a, b, c, d, e, f] = matrix;
    let (left, top) = origin;
    [
        a,
        b,
        c,
        d,
        e + left - (left * a + top * c),
        f + top - (left * b + top * d),
    ]
}

fn issue(call: Call<'_>, surface: &mut dyn Surface) -> Result<(), RenderError> {
    match call {
        Call::DrawText { text, at, font } => surface.draw_text(text, at, &font),
        Call::TextBox {
            text,
            at,
            width,
            height,
            font,
        } => surface.text_box(text, at, width, height, &font, Overflow::ShrinkToFit),
        Call::Transform(matrix) => surface.transformation_matrix(matrix),
        Call::Forward(op) => forward(op, surface),
    }
}

fn issue_scoped(
    call: Call<'_>,
    surface: &mut dyn Surface,
    body: Body<'_>,
) -> Result<(), RenderError> {
    match call {
        Call::Forward(Operation::BoundingBox(region)) => surface.bounding_box(*region, body),
        // Not a scoped surface operation: issue it, then run the children.
        other => {
            issue(other, surface)?;
            body(surface)
        }
    }
}

fn forward(op: &Operation, surface: &mut dyn Surface) -> Result<(), RenderError> {
    match op {
        Operation::MoveTo(x, y) => surface.move_to(*x, *y),
        Operation::LineTo(x, y) => surface.line_to(*x, *y),
        Operation::CurveTo(x1, y1, x2, y2, x, y) => surface.curve_to(*x1, *y1, *x2, *y2, *x, *y),
        Operation::ClosePath => surface.close_path(),
        Operation::Fill => surface.fill(),
        Operation::Stroke => surface.stroke(),
        Operation::FillAndStroke => surface.fill_and_stroke(),
        Operation::SetFillColor(color) => surface.set_fill_color(*color),
        Operation::SetStrokeColor(color) => surface.set_stroke_color(*color),
        Operation::SetLineWidth(width) => surface.set_line_width(*width),
        Operation::BoundingBox(region) => surface.bounding_box(*region, &mut |_| Ok(())),
        // Handled by `rewrite`; they never arrive here.
        Operation::TextBlock
        | Operation::FlowText(_)
        | Operation::BoxedText { .. }
        | Operation::Transform(_)
        | Operation::Clip
        | Operation::SaveState
        | Operation::RestoreState => Ok(()),
    }
}
