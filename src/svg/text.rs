//! # Text-Flow Planner
//!
//! Turns a `<text>` element into draw commands without touching a font.
//!
//! Each axis carries a position list with one entry per character still to
//! be placed. While either list holds more than one entry, characters are
//! emitted one at a time so each lands on its own coordinate. Once both lists
//! are down to a single entry the rest of the string goes out as one run, and
//! the x entry becomes "continue from where that run ended". That last bit
//! needs the run's measured width, so it stays a [`Coordinate::Pending`]
//! until the interpreter resolves it.
//!
//! Nested `<tspan>`s work on a copy of both lists and of the style, and are
//! bracketed by save/restore so any graphics state they set doesn't leak.
//! When a span declares no `x` (or `y`) of its own, the parent picks up the
//! list the span left behind, so text after the span continues from it.

use std::collections::VecDeque;

use super::command::{DrawCommand, Operation, TextRun};
use super::coord::Coordinate;
use super::dom::{Element, Node};
use super::style::TextStyle;
use super::units::{split_list, UnitConverter};
use super::warnings::WarningSink;

pub struct TextPlanner<'a> {
    units: &'a dyn UnitConverter,
}

impl<'a> TextPlanner<'a> {
    pub fn new(units: &'a dyn UnitConverter) -> Self {
        Self { units }
    }

    /// Plan one text block. The result is a `TextBlock` node wrapping
    /// everything the element and its spans produce.
    pub fn plan(
        &self,
        element: &Element,
        style: &TextStyle,
        warnings: &mut WarningSink,
    ) -> DrawCommand {
        let mut commands = Vec::new();
        self.plan_span(
            element,
            VecDeque::from([self.units.x("0")]),
            VecDeque::from([self.units.y("0")]),
            style,
            &mut commands,
            warnings,
        );
        DrawCommand::with_children(Operation::TextBlock, commands)
    }

    /// Plan `element` and return what is left of its position lists.
    fn plan_span(
        &self,
        element: &Element,
        mut xs: Positions,
        mut ys: Positions,
        parent_style: &TextStyle,
        out: &mut Vec<DrawCommand>,
        warnings: &mut WarningSink,
    ) -> (Positions, Positions) {
        if let Some(raw) = element.attr("x") {
            xs = override_leading(raw, &xs, |n| self.units.x(n));
        }
        if let Some(raw) = element.attr("y") {
            ys = override_leading(raw, &ys, |n| self.units.y(n));
        }

        if let Some(raw) = element.attr("dx") {
            let mut deltas = split_list(raw).map(|n| self.units.distance(n).unwrap_or(0.0));
            for (entry, dx) in xs.iter_mut().zip(deltas.by_ref()) {
                *entry = entry.offset(dx);
            }
            // Surplus deltas continue from the end of the previous character.
            xs.extend(deltas.map(Coordinate::Pending));
        }
        if let Some(raw) = element.attr("dy") {
            let mut deltas = split_list(raw).map(|n| -self.units.distance(n).unwrap_or(0.0));
            for (entry, dy) in ys.iter_mut().zip(deltas.by_ref()) {
                *entry = entry.offset(dy);
            }
            for dy in deltas {
                let last = ys.back().copied().unwrap_or(Coordinate::ZERO_PENDING);
                ys.push_back(last.offset(dy));
            }
        }

        let style = parent_style.refined_by(element, self.units);
        let text_length = element.attr("textLength").and_then(|s| self.units.distance(s));

        for child in &element.children {
            match child {
                Node::Text(raw) => {
                    let text = collapse_whitespace(raw);
                    let mut rest = text.as_str();

                    while let Some(first) = rest.chars().next() {
                        let (x, y) = (front(&xs), front(&ys));

                        if xs.len() > 1 || ys.len() > 1 {
                            let (head, tail) = rest.split_at(first.len_utf8());
                            out.push(run_command(head, x, y, &style, text_length));
                            rest = tail;

                            if xs.len() > 1 {
                                xs.pop_front();
                            } else {
                                xs = VecDeque::from([Coordinate::ZERO_PENDING]);
                            }
                            if ys.len() > 1 {
                                ys.pop_front();
                            }
                        } else {
                            out.push(run_command(rest, x, y, &style, text_length));
                            xs = VecDeque::from([Coordinate::ZERO_PENDING]);
                            break;
                        }
                    }
                }
                Node::Element(span) if span.name == "tspan" => {
                    out.push(Operation::SaveState.into());
                    let (span_xs, span_ys) =
                        self.plan_span(span, xs.clone(), ys.clone(), &style, out, warnings);
                    out.push(Operation::RestoreState.into());

                    // A span without its own positions consumes the parent's.
                    if span.attr("x").is_none() {
                        xs = span_xs;
                    }
                    if span.attr("y").is_none() {
                        ys = span_ys;
                    }
                }
                Node::Element(other) => {
                    warnings.push(format!(
                        "Unknown tag '{}' inside text tag; ignoring",
                        other.name
                    ));
                }
            }
        }

        (xs, ys)
    }
}

/// One entry per character still to be placed; never empty.
type Positions = VecDeque<Coordinate>;

fn front(positions: &Positions) -> Coordinate {
    positions.front().copied().unwrap_or(Coordinate::ZERO_PENDING)
}

/// Replace the leading entries of `inherited` with the declared ones. Entries
/// past the declared length keep their inherited values.
fn override_leading(
    raw: &str,
    inherited: &Positions,
    convert: impl Fn(&str) -> Coordinate,
) -> Positions {
    let mut positions: Positions = split_list(raw).map(convert).collect();
    if positions.is_empty() {
        return inherited.clone();
    }
    positions.extend(inherited.iter().skip(positions.len()).copied());
    positions
}

fn run_command(
    text: &str,
    x: Coordinate,
    y: Coordinate,
    style: &TextStyle,
    text_length: Option<f64>,
) -> DrawCommand {
    let run = TextRun {
        text: text.to_string(),
        x,
        y,
        style: style.clone(),
    };
    match text_length {
        Some(width) => Operation::BoxedText { run, width }.into(),
        None => Operation::FlowText(run).into(),
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::style::TextAnchor;

    // Identity conversion keeps expected positions readable.
    struct PlainUnits;

    impl UnitConverter for PlainUnits {
        fn x(&self, raw: &str) -> Coordinate {
            Coordinate::Concrete(raw.trim().parse().unwrap_or(0.0))
        }
        fn y(&self, raw: &str) -> Coordinate {
            Coordinate::Concrete(raw.trim().parse().unwrap_or(0.0))
        }
        fn distance(&self, raw: &str) -> Option<f64> {
            raw.trim().parse().ok()
        }
    }

    fn plan(element: &Element) -> (DrawCommand, WarningSink) {
        let mut warnings = WarningSink::new();
        let block = TextPlanner::new(&PlainUnits).plan(element, &TextStyle::default(), &mut warnings);
        (block, warnings)
    }

    fn runs(block: &DrawCommand) -> Vec<&TextRun> {
        block
            .children
            .iter()
            .filter_map(|c| match &c.op {
                Operation::FlowText(run) => Some(run),
                Operation::BoxedText { run, .. } => Some(run),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_block_marker_wraps_output() {
        let (block, _) = plan(&Element::new("text").with_text("Hi"));
        assert_eq!(block.op, Operation::TextBlock);
        assert_eq!(block.children.len(), 1);
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        let (block, _) = plan(&Element::new("text").with_text("  Hello \n\t  world  "));
        let runs = runs(&block);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello world");
        assert_eq!(runs[0].x, Coordinate::Concrete(0.0));
    }

    #[test]
    fn test_empty_text_emits_nothing() {
        let (block, _) = plan(&Element::new("text").with_text("   \n  "));
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_per_character_positions() {
        let el = Element::new("text")
            .with_attr("x", "10 20")
            .with_attr("y", "50")
            .with_text("AB");
        let (block, _) = plan(&el);
        let runs = runs(&block);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].text.as_str(), runs[0].x, runs[0].y), ("A", Coordinate::Concrete(10.0), Coordinate::Concrete(50.0)));
        assert_eq!((runs[1].text.as_str(), runs[1].x, runs[1].y), ("B", Coordinate::Concrete(20.0), Coordinate::Concrete(50.0)));
    }

    #[test]
    fn test_fewer_coordinates_than_characters() {
        // Three coordinates, five characters: two single-character runs, then
        // the rest of the string from the last coordinate.
        let el = Element::new("text").with_attr("x", "1 2 3").with_text("ABCDE");
        let (block, _) = plan(&el);
        let runs = runs(&block);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "CDE"]);
        assert_eq!(runs[2].x, Coordinate::Concrete(3.0));
    }

    #[test]
    fn test_surplus_coordinates_ignored() {
        let el = Element::new("text").with_attr("x", "1 2 3 4 5").with_text("AB");
        let (block, _) = plan(&el);
        let runs = runs(&block);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].x, Coordinate::Concrete(1.0));
        assert_eq!(runs[1].x, Coordinate::Concrete(2.0));
    }

    #[test]
    fn test_text_after_run_continues_pending() {
        let el = Element::new("text")
            .with_attr("x", "5")
            .with_text("AB")
            .with_child(Element::new("tspan").with_text("CD"));
        let (block, _) = plan(&el);
        let runs = runs_deep(&block);
        assert_eq!(runs[0].x, Coordinate::Concrete(5.0));
        assert_eq!(runs[1].text, "CD");
        assert_eq!(runs[1].x, Coordinate::ZERO_PENDING);
    }

    #[test]
    fn test_y_list_longer_than_x_forces_single_characters() {
        let el = Element::new("text")
            .with_attr("x", "0")
            .with_attr("y", "1 2")
            .with_text("ABC");
        let (block, _) = plan(&el);
        let runs = runs(&block);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "A");
        assert_eq!(runs[0].x, Coordinate::Concrete(0.0));
        assert_eq!(runs[1].text, "BC");
        assert_eq!(runs[1].x, Coordinate::ZERO_PENDING);
        assert_eq!(runs[1].y, Coordinate::Concrete(2.0));
    }

    #[test]
    fn test_dx_adds_in_place_and_surplus_is_pending() {
        let el = Element::new("text")
            .with_attr("x", "10")
            .with_attr("dx", "1 2 3")
            .with_text("ABC");
        let (block, _) = plan(&el);
        let runs = runs(&block);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].x, Coordinate::Concrete(11.0));
        assert_eq!(runs[1].x, Coordinate::Pending(2.0));
        assert_eq!(runs[2].x, Coordinate::Pending(3.0));
    }

    #[test]
    fn test_dy_negated_and_accumulates() {
        let el = Element::new("text")
            .with_attr("y", "100")
            .with_attr("dy", "0 5 5")
            .with_text("ABC");
        let (block, _) = plan(&el);
        let ys: Vec<Coordinate> = runs(&block).iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![Coordinate::Concrete(100.0), Coordinate::Concrete(95.0), Coordinate::Concrete(90.0)]);
    }

    #[test]
    fn test_span_keeps_inherited_tail() {
        let el = Element::new("text")
            .with_attr("x", "1 2 3")
            .with_child(Element::new("tspan").with_attr("x", "9").with_text("ABC"));
        let (block, _) = plan(&el);
        let xs: Vec<Coordinate> = runs_deep(&block).iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![Coordinate::Concrete(9.0), Coordinate::Concrete(2.0), Coordinate::Concrete(3.0)]);
    }

    #[test]
    fn test_span_bracketed_by_save_restore() {
        let el = Element::new("text").with_child(Element::new("tspan").with_text("A"));
        let (block, _) = plan(&el);
        let ops: Vec<&Operation> = block.children.iter().map(|c| &c.op).collect();
        assert!(matches!(ops[0], Operation::SaveState));
        assert!(matches!(ops[1], Operation::FlowText(_)));
        assert!(matches!(ops[2], Operation::RestoreState));
    }

    #[test]
    fn test_span_consumes_parent_positions() {
        let el = Element::new("text")
            .with_attr("x", "1 2")
            .with_child(Element::new("tspan").with_text("A"))
            .with_text("B");
        let (block, _) = plan(&el);
        let runs = runs_deep(&block);
        assert_eq!(runs[0].x, Coordinate::Concrete(1.0));
        assert_eq!(runs[1].x, Coordinate::Concrete(2.0));
    }

    #[test]
    fn test_text_after_leading_span_continues_pending() {
        let el = Element::new("text")
            .with_attr("x", "10")
            .with_child(Element::new("tspan").with_attr("font-weight", "bold").with_text("Bold"))
            .with_text("Tail");
        let (block, _) = plan(&el);
        let runs = runs_deep(&block);
        assert_eq!(runs[0].text, "Bold");
        assert_eq!(runs[0].x, Coordinate::Concrete(10.0));
        assert_eq!(runs[1].text, "Tail");
        assert_eq!(runs[1].x, Coordinate::ZERO_PENDING);
    }

    #[test]
    fn test_span_with_own_x_leaves_parent_list() {
        let el = Element::new("text")
            .with_attr("x", "10")
            .with_child(Element::new("tspan").with_attr("x", "50").with_text("A"))
            .with_text("B");
        let (block, _) = plan(&el);
        let runs = runs_deep(&block);
        assert_eq!(runs[0].x, Coordinate::Concrete(50.0));
        assert_eq!(runs[1].x, Coordinate::Concrete(10.0));
    }

    #[test]
    fn test_long_coordinate_list() {
        let xs: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
        let text: String = "x".repeat(2000);
        let el = Element::new("text").with_attr("x", &xs.join(" ")).with_text(&text);
        let (block, _) = plan(&el);
        let runs = runs(&block);
        assert_eq!(runs.len(), 2000);
        assert_eq!(runs[1999].x, Coordinate::Concrete(1999.0));
    }

    #[test]
    fn test_text_length_selects_boxed_text() {
        let el = Element::new("text").with_attr("textLength", "100").with_text("Hi");
        let (block, _) = plan(&el);
        assert!(matches!(
            &block.children[0].op,
            Operation::BoxedText { width, .. } if (*width - 100.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_anchor_inherited_by_span() {
        let el = Element::new("text")
            .with_attr("text-anchor", "end")
            .with_child(Element::new("tspan").with_text("A"))
            .with_child(Element::new("tspan").with_attr("text-anchor", "start").with_text("B"));
        let (block, _) = plan(&el);
        let runs = runs_deep(&block);
        assert_eq!(runs[0].style.anchor, Some(TextAnchor::End));
        assert_eq!(runs[1].style.anchor, Some(TextAnchor::Start));
    }

    #[test]
    fn test_unknown_child_warns_once() {
        let el = Element::new("text")
            .with_text("A")
            .with_child(Element::new("a").with_text("link"));
        let (block, warnings) = plan(&el);
        assert_eq!(runs(&block).len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings.entries()[0].contains("Unknown tag 'a'"));
    }

    #[test]
    fn test_multibyte_characters_split_cleanly() {
        let el = Element::new("text").with_attr("x", "0 10").with_text("éü");
        let (block, _) = plan(&el);
        let texts: Vec<String> = runs(&block).iter().map(|r| r.text.clone()).collect();
        assert_eq!(texts, vec!["é".to_string(), "ü".to_string()]);
    }

    fn runs_deep(block: &DrawCommand) -> Vec<&TextRun> {
        fn walk<'a>(cmds: &'a [DrawCommand], out: &mut Vec<&'a TextRun>) {
            for c in cmds {
                match &c.op {
                    Operation::FlowText(run) | Operation::BoxedText { run, .. } => out.push(run),
                    _ => {}
                }
                walk(&c.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&block.children, &mut out);
        out
    }
}
