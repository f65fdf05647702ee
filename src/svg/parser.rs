//! # SVG Element Parser
//!
//! Walks the element tree below `<svg>` and produces the command tree.
//! Text goes through the [`TextPlanner`]; shapes become path commands with
//! fill/stroke painting. Supported shapes: rect, circle, ellipse, line,
//! polyline, polygon, path. Path commands: M, L, H, V, C, Q, Z (absolute +
//! relative).
//!
//! Anything that can't be drawn is skipped with exactly one warning.

use super::command::{DrawCommand, Operation, Rgb};
use super::dom::Element;
use super::style::TextStyle;
use super::text::TextPlanner;
use super::units::{split_list, UnitConverter};
use super::warnings::WarningSink;

const BLACK: Rgb = Rgb {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};

/// Paint and font state inherited down the tree.
#[derive(Debug, Clone)]
struct State {
    style: TextStyle,
    fill: Option<Rgb>,
    stroke: Option<Rgb>,
    stroke_width: f64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            fill: Some(BLACK),
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

pub struct Parser<'a> {
    units: &'a dyn UnitConverter,
    warnings: WarningSink,
}

impl<'a> Parser<'a> {
    pub fn new(units: &'a dyn UnitConverter) -> Self {
        Self {
            units,
            warnings: WarningSink::new(),
        }
    }

    /// Parse the children of the document root.
    pub fn parse(mut self, root: &Element) -> (Vec<DrawCommand>, WarningSink) {
        let state = self.refine(&State::default(), root);
        let mut commands = Vec::new();
        for child in root.elements() {
            self.parse_element(child, &state, &mut commands);
        }
        (commands, self.warnings)
    }

    fn parse_element(&mut self, element: &Element, parent: &State, out: &mut Vec<DrawCommand>) {
        let state = self.refine(parent, element);
        let transforms = element
            .attr("transform")
            .map(|t| self.parse_transform(t))
            .unwrap_or_default();

        let mut body = Vec::new();
        match element.name.as_str() {
            "g" | "svg" => {
                for child in element.elements() {
                    self.parse_element(child, &state, &mut body);
                }
            }
            "text" => {
                let planner = TextPlanner::new(self.units);
                let block = planner.plan(element, &state.style, &mut self.warnings);
                // Unfilled text paints nothing.
                let Some(fill) = state.fill else { return };
                if !block.children.is_empty() {
                    body.push(Operation::SetFillColor(fill).into());
                    body.push(block);
                }
            }
            "title" | "desc" | "metadata" => return,
            _ => match self.shape_path(element) {
                Some(path) => emit_shape(&mut body, &state, path),
                None => return,
            },
        }

        let grouped = matches!(element.name.as_str(), "g" | "svg");
        if transforms.is_empty() && !grouped {
            out.extend(body);
            return;
        }
        out.push(Operation::SaveState.into());
        out.extend(transforms.into_iter().map(|m| DrawCommand::leaf(Operation::Transform(m))));
        out.extend(body);
        out.push(Operation::RestoreState.into());
    }

    fn refine(&self, parent: &State, element: &Element) -> State {
        let mut state = parent.clone();
        state.style = parent.style.refined_by(element, self.units);

        if let Some(fill) = element.attr("fill") {
            state.fill = paint(fill, parent.fill);
        }
        if let Some(stroke) = element.attr("stroke") {
            state.stroke = paint(stroke, parent.stroke);
        }
        if let Some(width) = element.attr("stroke-width").and_then(|w| self.units.distance(w)) {
            state.stroke_width = width;
        }
        state
    }

    /// Path commands for a shape element, or `None` (with a warning) if it
    /// can't be drawn.
    fn shape_path(&mut self, element: &Element) -> Option<Vec<Operation>> {
        let units = self.units;
        let x = |name: &str| element.attr(name).map(|v| units.x(v).resolve(0.0)).unwrap_or(0.0);
        let y = |name: &str| element.attr(name).map(|v| units.y(v).resolve(0.0)).unwrap_or(0.0);
        let len = |name: &str| element.attr(name).and_then(|v| units.distance(v)).unwrap_or(0.0);

        let path = match element.name.as_str() {
            "rect" => {
                self.require(element, &["width", "height"])?;
                let (x, y, w, h) = (x("x"), y("y"), len("width"), len("height"));
                vec![
                    Operation::MoveTo(x, y),
                    Operation::LineTo(x + w, y),
                    Operation::LineTo(x + w, y - h),
                    Operation::LineTo(x, y - h),
                    Operation::ClosePath,
                ]
            }
            "circle" => {
                self.require(element, &["r"])?;
                ellipse_path(x("cx"), y("cy"), len("r"), len("r"))
            }
            "ellipse" => {
                self.require(element, &["rx", "ry"])?;
                ellipse_path(x("cx"), y("cy"), len("rx"), len("ry"))
            }
            "line" => vec![
                Operation::MoveTo(x("x1"), y("y1")),
                Operation::LineTo(x("x2"), y("y2")),
            ],
            "polyline" | "polygon" => {
                let raw = self.require(element, &["points"])?;
                let points = parse_points(raw[0]);
                let mut path: Vec<Operation> = Vec::with_capacity(points.len() + 1);
                if let Some((first, rest)) = points.split_first() {
                    path.push(self.move_to(*first));
                    path.extend(rest.iter().map(|&p| self.line_to(p)));
                    if element.name == "polygon" {
                        path.push(Operation::ClosePath);
                    }
                }
                path
            }
            "path" => {
                let raw = self.require(element, &["d"])?;
                parse_path_data(raw[0])
                    .into_iter()
                    .map(|op| self.to_frame(op))
                    .collect()
            }
            other => {
                self.warnings.push(format!("Unknown tag '{}'; ignoring", other));
                return None;
            }
        };

        if path.is_empty() {
            self.warnings.push(format!(
                "No drawable geometry on tag {}; skipping tag",
                element.name
            ));
            return None;
        }
        Some(path)
    }

    /// All of `names` must be present; otherwise warn once listing the
    /// missing ones.
    fn require<'e>(&mut self, element: &'e Element, names: &[&str]) -> Option<Vec<&'e str>> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| element.attr(n).is_none())
            .collect();
        if !missing.is_empty() {
            self.warnings.push(format!(
                "Must have attributes {} on tag {}; skipping tag",
                missing.join(", "),
                element.name
            ));
            return None;
        }
        names.iter().map(|n| element.attr(n)).collect()
    }

    fn move_to(&self, (x, y): (f64, f64)) -> Operation {
        let (x, y) = self.units.user_point(x, y);
        Operation::MoveTo(x, y)
    }

    fn line_to(&self, (x, y): (f64, f64)) -> Operation {
        let (x, y) = self.units.user_point(x, y);
        Operation::LineTo(x, y)
    }

    /// Map a user-space path operation into frame coordinates.
    fn to_frame(&self, op: Operation) -> Operation {
        let p = |x, y| self.units.user_point(x, y);
        match op {
            Operation::MoveTo(x, y) => self.move_to((x, y)),
            Operation::LineTo(x, y) => self.line_to((x, y)),
            Operation::CurveTo(x1, y1, x2, y2, x, y) => {
                let ((x1, y1), (x2, y2), (x, y)) = (p(x1, y1), p(x2, y2), p(x, y));
                Operation::CurveTo(x1, y1, x2, y2, x, y)
            }
            other => other,
        }
    }

    /// Parse a `transform` attribute into y-up matrices, outermost first.
    fn parse_transform(&mut self, raw: &str) -> Vec<[f64; 6]> {
        let mut matrices = Vec::new();
        for part in raw.split(')') {
            let Some((name, args)) = part.split_once('(') else {
                continue;
            };
            let name = name.trim().trim_start_matches(',').trim();
            let args: Vec<f64> = split_list(args).filter_map(|a| a.parse().ok()).collect();
            let arg = |i: usize, default: f64| args.get(i).copied().unwrap_or(default);

            let m = match (name, args.len()) {
                ("matrix", 6) => [args[0], args[1], args[2], args[3], args[4], args[5]],
                ("translate", 1 | 2) => [1.0, 0.0, 0.0, 1.0, args[0], arg(1, 0.0)],
                ("scale", 1 | 2) => [args[0], 0.0, 0.0, arg(1, args[0]), 0.0, 0.0],
                ("rotate", 1) => {
                    let (sin, cos) = args[0].to_radians().sin_cos();
                    [cos, sin, -sin, cos, 0.0, 0.0]
                }
                ("skewX", 1) => [1.0, 0.0, args[0].to_radians().tan(), 1.0, 0.0, 0.0],
                ("skewY", 1) => [1.0, args[0].to_radians().tan(), 0.0, 1.0, 0.0, 0.0],
                _ => {
                    self.warnings
                        .push(format!("Unknown transformation '{}'; ignoring", part.trim()));
                    continue;
                }
            };
            let [a, b, c, d, e, f] = m;
            matrices.push([a, -b, -c, d, e, -f]);
        }
        matrices
    }
}

fn emit_shape(out: &mut Vec<DrawCommand>, state: &State, path: Vec<Operation>) {
    let has_fill = state.fill.is_some();
    let has_stroke = state.stroke.is_some();

    if !has_fill && !has_stroke {
        return;
    }

    out.push(Operation::SaveState.into());

    if let Some(color) = state.fill {
        out.push(Operation::SetFillColor(color).into());
    }
    if let Some(color) = state.stroke {
        out.push(Operation::SetStrokeColor(color).into());
        out.push(Operation::SetLineWidth(state.stroke_width).into());
    }

    out.extend(path.into_iter().map(DrawCommand::leaf));

    let paint = match (has_fill, has_stroke) {
        (true, true) => Operation::FillAndStroke,
        (true, false) => Operation::Fill,
        _ => Operation::Stroke,
    };
    out.push(paint.into());
    out.push(Operation::RestoreState.into());
}

/// Cubic bezier approximation of an ellipse.
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<Operation> {
    let k: f64 = 0.5522847498;
    let kx = rx * k;
    let ky = ry * k;

    vec![
        Operation::MoveTo(cx + rx, cy),
        Operation::CurveTo(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry),
        Operation::CurveTo(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy),
        Operation::CurveTo(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry),
        Operation::CurveTo(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy),
        Operation::ClosePath,
    ]
}

/// Parse a `points` attribute (e.g. "10,20 30,40") into pairs.
fn parse_points(s: &str) -> Vec<(f64, f64)> {
    let nums: Vec<f64> = split_list(s).filter_map(|n| n.parse().ok()).collect();
    nums.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

/// Parse path data into absolute user-space operations.
fn parse_path_data(d: &str) -> Vec<Operation> {
    let tokens = tokenize_path(d);
    let mut ops = Vec::new();
    let (mut cur_x, mut cur_y) = (0.0f64, 0.0f64);
    let (mut start_x, mut start_y) = (0.0f64, 0.0f64);
    let mut command: Option<char> = None;
    let mut i = 0;

    while i < tokens.len() {
        if let Some(letter) = tokens[i].chars().next().filter(|c| c.is_ascii_alphabetic()) {
            i += 1;
            if letter == 'Z' || letter == 'z' {
                ops.push(Operation::ClosePath);
                cur_x = start_x;
                cur_y = start_y;
                command = None;
            } else {
                command = Some(letter);
            }
            continue;
        }

        let Some(letter) = command else {
            i += 1;
            continue;
        };
        let arity = match letter.to_ascii_uppercase() {
            'M' | 'L' => 2,
            'H' | 'V' => 1,
            'Q' => 4,
            'C' => 6,
            _ => {
                // Unsupported command: skip its operands.
                i += 1;
                continue;
            }
        };
        let Some(n) = tokens
            .get(i..i + arity)
            .and_then(|t| t.iter().map(|s| s.parse::<f64>().ok()).collect::<Option<Vec<f64>>>())
        else {
            break;
        };
        i += arity;

        let relative = letter.is_ascii_lowercase();
        let (ox, oy) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };

        match letter.to_ascii_uppercase() {
            'M' => {
                cur_x = ox + n[0];
                cur_y = oy + n[1];
                start_x = cur_x;
                start_y = cur_y;
                ops.push(Operation::MoveTo(cur_x, cur_y));
                // Further pairs after a moveto are implicit linetos.
                command = Some(if relative { 'l' } else { 'L' });
            }
            'L' => {
                cur_x = ox + n[0];
                cur_y = oy + n[1];
                ops.push(Operation::LineTo(cur_x, cur_y));
            }
            'H' => {
                cur_x = ox + n[0];
                ops.push(Operation::LineTo(cur_x, cur_y));
            }
            'V' => {
                cur_y = oy + n[0];
                ops.push(Operation::LineTo(cur_x, cur_y));
            }
            'C' => {
                let (x1, y1, x2, y2) = (ox + n[0], oy + n[1], ox + n[2], oy + n[3]);
                cur_x = ox + n[4];
                cur_y = oy + n[5];
                ops.push(Operation::CurveTo(x1, y1, x2, y2, cur_x, cur_y));
            }
            _ => {
                // Quadratic: raise to cubic.
                let (qx, qy) = (ox + n[0], oy + n[1]);
                let (end_x, end_y) = (ox + n[2], oy + n[3]);
                let c1x = cur_x + (2.0 / 3.0) * (qx - cur_x);
                let c1y = cur_y + (2.0 / 3.0) * (qy - cur_y);
                let c2x = end_x + (2.0 / 3.0) * (qx - end_x);
                let c2y = end_y + (2.0 / 3.0) * (qy - end_y);
                cur_x = end_x;
                cur_y = end_y;
                ops.push(Operation::CurveTo(c1x, c1y, c2x, c2y, cur_x, cur_y));
            }
        }
    }

    ops
}

/// Tokenize a path `d` string into command letters and numbers.
fn tokenize_path(d: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in d.chars() {
        if ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(ch.to_string());
        } else if ch == '-' && !current.is_empty() && !current.ends_with(['e', 'E']) {
            // A minus sign starts a new number unless it follows an exponent.
            tokens.push(std::mem::take(&mut current));
            current.push(ch);
        } else if ch == '.' && current.contains('.') && !current.contains(['e', 'E']) {
            // "1.5.5" is two numbers.
            tokens.push(std::mem::take(&mut current));
            current.push(ch);
        } else if ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E') {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Resolve a `fill`/`stroke` value. Unparseable colours keep the inherited
/// paint.
fn paint(value: &str, inherited: Option<Rgb>) -> Option<Rgb> {
    let value = value.trim();
    if value == "none" {
        return None;
    }
    parse_color_list(value).or(inherited)
}

/// First parseable colour in a whitespace-separated fallback list, such as
/// `url(#gradient) rgb(3, 4, 5) white`.
fn parse_color_list(s: &str) -> Option<Rgb> {
    if let Some(color) = parse_color(s) {
        return Some(color);
    }
    let mut candidates = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    candidates.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    candidates.push(current);
    candidates.iter().find_map(|c| parse_color(c))
}

/// Parse an SVG color string (hex, `rgb()`, named colors).
pub fn parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    let rgb = |r: f64, g: f64, b: f64| Rgb {
        r: r / 255.0,
        g: g / 255.0,
        b: b / 255.0,
    };

    if let Some(hex) = s.strip_prefix('#') {
        let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(f64::from);
        match hex.len() {
            3 => Some(rgb(
                channel(&hex.get(0..1)?.repeat(2))?,
                channel(&hex.get(1..2)?.repeat(2))?,
                channel(&hex.get(2..3)?.repeat(2))?,
            )),
            6 => Some(rgb(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
            )),
            _ => None,
        }
    } else if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<f64> = inner
            .split(',')
            .map(|p| {
                let p = p.trim();
                let v = match p.strip_suffix('%') {
                    Some(pct) => pct.trim().parse::<f64>().ok().map(|v| (v * 2.55).floor()),
                    None => p.parse::<f64>().ok(),
                };
                v.map(|v| v.clamp(0.0, 255.0))
            })
            .collect::<Option<Vec<f64>>>()?;
        match parts.as_slice() {
            [r, g, b] => Some(rgb(*r, *g, *b)),
            _ => None,
        }
    } else {
        let (r, g, b) = match s.to_ascii_lowercase().as_str() {
            "black" => (0.0, 0.0, 0.0),
            "white" => (255.0, 255.0, 255.0),
            "red" => (255.0, 0.0, 0.0),
            "green" => (0.0, 128.0, 0.0),
            "lime" => (0.0, 255.0, 0.0),
            "blue" => (0.0, 0.0, 255.0),
            "navy" => (0.0, 0.0, 128.0),
            "yellow" => (255.0, 255.0, 0.0),
            "gray" | "grey" => (128.0, 128.0, 128.0),
            "silver" => (192.0, 192.0, 192.0),
            "maroon" => (128.0, 0.0, 0.0),
            "olive" => (128.0, 128.0, 0.0),
            "teal" => (0.0, 128.0, 128.0),
            "orange" => (255.0, 165.0, 0.0),
            "purple" => (128.0, 0.0, 128.0),
            "cyan" | "aqua" => (0.0, 255.0, 255.0),
            "magenta" | "fuchsia" => (255.0, 0.0, 255.0),
            _ => return None,
        };
        Some(rgb(r, g, b))
    }
}
