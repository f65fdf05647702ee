//! Inherited text style.
//!
//! A `TextStyle` travels down the element tree by value. Nested spans clone
//! their parent's style and refine the clone, so siblings never see each
//! other's changes.

use super::dom::Element;
use super::units::UnitConverter;

/// Horizontal alignment of a run relative to its start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn parse(s: &str) -> Option<TextAnchor> {
        match s.trim() {
            "start" => Some(TextAnchor::Start),
            "middle" => Some(TextAnchor::Middle),
            "end" => Some(TextAnchor::End),
            _ => None,
        }
    }

    /// How far to shift a run of the given width to honour this anchor.
    pub fn shift(self, width: f64) -> f64 {
        match self {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => width / 2.0,
            TextAnchor::End => width,
        }
    }
}

/// Weight/slant combination, the "sub-family" of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSubStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontSubStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, FontSubStyle::Bold | FontSubStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontSubStyle::Italic | FontSubStyle::BoldItalic)
    }

    pub fn with_bold(self, bold: bool) -> Self {
        Self::from_parts(bold, self.is_italic())
    }

    pub fn with_italic(self, italic: bool) -> Self {
        Self::from_parts(self.is_bold(), italic)
    }

    fn from_parts(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontSubStyle::Normal,
            (true, false) => FontSubStyle::Bold,
            (false, true) => FontSubStyle::Italic,
            (true, true) => FontSubStyle::BoldItalic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    /// Font size in points. `None` means the surface default.
    pub size: Option<f64>,
    pub family: Option<String>,
    pub sub_style: FontSubStyle,
    pub anchor: Option<TextAnchor>,
}

impl TextStyle {
    /// Copy of `self` refined by the font attributes declared on `element`.
    pub fn refined_by(&self, element: &Element, units: &dyn UnitConverter) -> TextStyle {
        let mut style = self.clone();

        if let Some(size) = element.attr("font-size").and_then(|s| units.distance(s)) {
            style.size = Some(size);
        }
        if let Some(family) = element.attr("font-family") {
            let first = family
                .split(',')
                .next()
                .map(|f| f.trim().trim_matches(|c| c == '\'' || c == '"'))
                .unwrap_or_default();
            if !first.is_empty() {
                style.family = Some(first.to_string());
            }
        }
        if let Some(weight) = element.attr("font-weight") {
            let bold = match weight.trim() {
                "bold" | "bolder" => true,
                "normal" | "lighter" => false,
                n => n.parse::<u32>().map(|w| w >= 600).unwrap_or(style.sub_style.is_bold()),
            };
            style.sub_style = style.sub_style.with_bold(bold);
        }
        if let Some(slant) = element.attr("font-style") {
            let italic = matches!(slant.trim(), "italic" | "oblique");
            style.sub_style = style.sub_style.with_italic(italic);
        }
        if let Some(anchor) = element.attr("text-anchor").and_then(TextAnchor::parse) {
            style.anchor = Some(anchor);
        }

        style
    }
}
