//! Unit conversion from SVG attribute values to page points.
//!
//! The planner only talks to the `UnitConverter` trait, so callers with
//! their own viewport scaling can swap in their own conversion.

use super::coord::Coordinate;

pub trait UnitConverter {
    /// Horizontal position in the frame (origin at the left edge).
    fn x(&self, raw: &str) -> Coordinate;
    /// Vertical position in the frame (origin at the top edge, y axis up).
    fn y(&self, raw: &str) -> Coordinate;
    /// A length. `None` when `raw` holds no number at all.
    fn distance(&self, raw: &str) -> Option<f64>;

    /// A point given as bare user-space numbers, as found in path data and
    /// `points` lists. Flips y to match the frame's y-up axis.
    fn user_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x, -y)
    }
}

/// Plain physical-unit conversion with no viewBox scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentUnits;

impl DocumentUnits {
    pub fn new() -> Self {
        Self
    }
}

impl UnitConverter for DocumentUnits {
    fn x(&self, raw: &str) -> Coordinate {
        Coordinate::Concrete(points(raw).unwrap_or(0.0))
    }

    fn y(&self, raw: &str) -> Coordinate {
        Coordinate::Concrete(-points(raw).unwrap_or(0.0))
    }

    fn distance(&self, raw: &str) -> Option<f64> {
        points(raw)
    }
}

const POINTS_PER_INCH: f64 = 72.0;

/// Convert a length such as `"32mm"` to points. Unknown suffixes are ignored.
pub fn points(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let split = numeric_prefix_len(raw);
    if split == 0 {
        return None;
    }
    let value: f64 = raw[..split].parse().ok()?;
    let factor = match raw[split..].trim() {
        "in" => POINTS_PER_INCH,
        "ft" => POINTS_PER_INCH * 12.0,
        "mm" => POINTS_PER_INCH * 0.0393700787,
        "cm" => POINTS_PER_INCH * 0.393700787,
        "m" => POINTS_PER_INCH * 39.3700787,
        _ => 1.0,
    };
    Some(value * factor)
}

// Length of the longest prefix that looks like a float: sign, digits,
// fraction, exponent.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start || digits > 0 {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Split a list attribute (`x`, `dx`, `points`...) on whitespace and commas.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}
