//! # Document and Draw
//!
//! Entry point for drawing a whole SVG onto a surface: parse, plan, then
//! interpret inside a clipped bounding box placed at the requested spot.

use serde::Deserialize;

use super::command::{DrawCommand, Operation, Region};
use super::dom::{parse_document, Element};
use super::interpreter::Interpreter;
use super::parser::Parser;
use super::surface::Surface;
use super::units::{points, DocumentUnits};
use crate::error::RenderError;

/// Placement and size overrides for [`draw`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SvgOptions {
    /// Top-left corner of the drawing, measured from the frame's top-left
    /// corner with y growing downward. Defaults to `[0, 0]`.
    pub at: Option<[f64; 2]>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SvgOptions {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A parsed SVG document with its resolved size in points.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
    pub width: f64,
    pub height: f64,
}

impl Document {
    /// Parse `data`. The size comes from `options` first, then the root's
    /// own `width`/`height`, then `bounds`.
    pub fn parse(
        data: &str,
        bounds: (f64, f64),
        options: &SvgOptions,
    ) -> Result<Self, RenderError> {
        let root = parse_document(data)?;
        if root.name != "svg" {
            return Err(RenderError::Parse(format!(
                "expected <svg> root element, found <{}>",
                root.name
            )));
        }

        let declared = |name: &str| root.attr(name).and_then(points);
        let width = options.width.or_else(|| declared("width")).unwrap_or(bounds.0);
        let height = options.height.or_else(|| declared("height")).unwrap_or(bounds.1);

        Ok(Self { root, width, height })
    }

    /// Plan the document body. Returns the commands and any warnings.
    pub fn commands(&self) -> (Vec<DrawCommand>, Vec<String>) {
        let (commands, warnings) = Parser::new(&DocumentUnits::new()).parse(&self.root);
        (commands, warnings.into_vec())
    }
}

/// Outcome of a successful [`draw`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawReport {
    pub warnings: Vec<String>,
    pub width: f64,
    pub height: f64,
}

/// Parse `data` and draw it onto `surface`.
pub fn draw(
    data: &str,
    surface: &mut dyn Surface,
    options: &SvgOptions,
) -> Result<DrawReport, RenderError> {
    let document = Document::parse(data, surface.frame_size(), options)?;
    let (width, height) = (document.width, document.height);
    log::debug!("drawing svg at {:?}, {}x{}pt", options.at, width, height);

    let (body, warnings) = document.commands();
    let tree = framed(body, options.at.unwrap_or([0.0, 0.0]), width, height);
    Interpreter::run(&tree, surface)?;

    Ok(DrawReport {
        warnings,
        width,
        height,
    })
}

/// Wrap `body` in a bounding box at `at`, clipped to the document rectangle.
fn framed(body: Vec<DrawCommand>, at: [f64; 2], width: f64, height: f64) -> Vec<DrawCommand> {
    let mut children: Vec<DrawCommand> = vec![
        Operation::SaveState.into(),
        Operation::MoveTo(0.0, 0.0).into(),
        Operation::LineTo(width, 0.0).into(),
        Operation::LineTo(width, -height).into(),
        Operation::LineTo(0.0, -height).into(),
        Operation::ClosePath.into(),
        Operation::Clip.into(),
    ];
    children.extend(body);
    children.push(Operation::RestoreState.into());

    let region = Region {
        x: at[0],
        y: -at[1],
        width,
        height,
    };
    vec![DrawCommand::with_children(Operation::BoundingBox(region), children)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_precedence() {
        let svg = r#"<svg width="200" height="1in"/>"#;
        let doc = Document::parse(svg, (600.0, 800.0), &SvgOptions::default()).unwrap();
        assert_eq!((doc.width, doc.height), (200.0, 72.0));

        let opts = SvgOptions {
            width: Some(50.0),
            ..Default::default()
        };
        let doc = Document::parse(svg, (600.0, 800.0), &opts).unwrap();
        assert_eq!((doc.width, doc.height), (50.0, 72.0));

        let doc = Document::parse("<svg/>", (600.0, 800.0), &SvgOptions::default()).unwrap();
        assert_eq!((doc.width, doc.height), (600.0, 800.0));
    }

    #[test]
    fn test_non_svg_root_rejected() {
        let err = Document::parse("<html/>", (1.0, 1.0), &SvgOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)));
    }

    #[test]
    fn test_options_from_json() {
        let opts = SvgOptions::from_json(r#"{"at": [10, 20], "width": 100}"#).unwrap();
        assert_eq!(opts.at, Some([10.0, 20.0]));
        assert_eq!(opts.width, Some(100.0));
        assert_eq!(opts.height, None);

        let err = SvgOptions::from_json(r#"{"at": "top"}"#).unwrap_err();
        assert!(matches!(err, RenderError::Options { .. }));
    }

    #[test]
    fn test_frame_clips_document_rectangle() {
        let tree = framed(Vec::new(), [5.0, 15.0], 100.0, 40.0);
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree[0].op,
            Operation::BoundingBox(Region {
                x: 5.0,
                y: -15.0,
                width: 100.0,
                height: 40.0
            })
        );
        let ops: Vec<&Operation> = tree[0].children.iter().map(|c| &c.op).collect();
        assert_eq!(ops[0], &Operation::SaveState);
        assert_eq!(ops[3], &Operation::LineTo(100.0, -40.0));
        assert_eq!(ops[6], &Operation::Clip);
        assert_eq!(ops.last(), Some(&&Operation::RestoreState));
    }
}
