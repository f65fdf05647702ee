//! # Forme SVG
//!
//! Draws SVG documents onto page-native PDF canvases.
//!
//! SVG text positioning is awkward to do in one pass: a run without an
//! explicit `x` continues where the previous run ended, and where that is
//! depends on font metrics. Forme SVG splits the work. The planner turns the
//! markup into a command tree with those positions left pending, and the
//! interpreter resolves them while emitting, once the surface can measure.
//!
//! ## Architecture
//!
//! ```text
//! SVG markup
//!       ↓
//!   [svg::dom]          — Element tree (quick-xml)
//!       ↓
//!   [svg::parser]       — Shapes, paint, transforms
//!   [svg::text]         — Text-flow planning, deferred positions
//!       ↓
//!   DrawCommand tree
//!       ↓
//!   [svg::interpreter]  — Resolve, measure, anchor, emit
//!       ↓
//!   [pdf::PdfCanvas]    — PDF content-stream operators
//! ```

pub mod error;
pub mod font;
pub mod pdf;
pub mod svg;

pub use error::RenderError;
pub use pdf::PdfCanvas;
pub use svg::{draw, DrawReport, SvgOptions};

/// Draw `svg` onto a fresh page of the given size and return the canvas.
///
/// This is the primary entry point for one-off rendering. Use [`svg::draw`]
/// directly to draw several documents onto the same canvas.
pub fn render(
    svg: &str,
    page_width: f64,
    page_height: f64,
    options: &SvgOptions,
) -> Result<(PdfCanvas, DrawReport), RenderError> {
    let mut canvas = PdfCanvas::new(page_width, page_height);
    let report = draw(svg, &mut canvas, options)?;
    Ok((canvas, report))
}

/// Same as [`render`], with the options given as JSON.
pub fn render_json(
    svg: &str,
    page_width: f64,
    page_height: f64,
    options_json: &str,
) -> Result<(PdfCanvas, DrawReport), RenderError> {
    let options = SvgOptions::from_json(options_json)?;
    render(svg, page_width, page_height, &options)
}
