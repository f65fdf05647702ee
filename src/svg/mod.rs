//! # SVG
//!
//! Parsing and drawing of SVG documents onto a [`Surface`].
//!
//! Drawing happens in two phases. Planning ([`parser`], [`text`]) turns the
//! element tree into a [`DrawCommand`] tree without any font access; text
//! positions that depend on measured widths are left as
//! [`Coordinate::Pending`]. Emission ([`interpreter`]) then walks that tree
//! once against a live surface, measuring runs as it goes.

pub mod command;
pub mod coord;
pub mod document;
pub mod dom;
pub mod interpreter;
pub mod parser;
pub mod style;
pub mod surface;
pub mod text;
pub mod units;
pub mod warnings;

pub use command::{DrawCommand, Operation, Region, Rgb, TextRun};
pub use coord::Coordinate;
pub use document::{draw, Document, DrawReport, SvgOptions};
pub use dom::{parse_document, Element, Node};
pub use interpreter::Interpreter;
pub use parser::Parser;
pub use style::{FontSubStyle, TextAnchor, TextStyle};
pub use surface::{Body, FontSpec, Overflow, Surface, TextMeasure};
pub use text::TextPlanner;
pub use units::{DocumentUnits, UnitConverter};
pub use warnings::WarningSink;
