//! # Font Management
//!
//! Font lookup and text measurement for the PDF surface.
//!
//! The 14 standard PDF fonts need no embedding and carry built-in metrics.
//! Custom TrueType/OpenType fonts can be registered from bytes; their
//! advance widths are read with ttf-parser.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

use crate::error::RenderError;
use crate::svg::FontSpec;

/// A font registry that maps font family + weight + style to font data.
#[derive(Debug)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
    fallback: FontData,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    /// Key for a resolved font request, weights snapped to 400/700.
    pub fn for_spec(font: &FontSpec) -> Self {
        FontKey {
            family: canonical_family(font.family.as_deref().unwrap_or("Helvetica")).to_string(),
            weight: if font.sub_style.is_bold() { 700 } else { 400 },
            italic: font.sub_style.is_italic(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the 14 standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font registered by the caller. Only its metrics
    /// are kept; the canvas writes glyph IDs and does not embed the font.
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, RenderError> {
        let face = ttf_parser::Face::parse(data, 0).map_err(|e| RenderError::Font(e.to_string()))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            glyph_ids,
        })
    }
}

/// The 14 standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }
}

/// Map generic and common SVG family names onto the standard families.
pub fn canonical_family(family: &str) -> &str {
    match family.trim().to_ascii_lowercase().as_str() {
        "helvetica" | "arial" | "sans-serif" => "Helvetica",
        "times" | "times new roman" | "times-roman" | "serif" => "Times",
        "courier" | "courier new" | "monospace" => "Courier",
        _ => family.trim(),
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = vec![
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Times", 400, false), StandardFont::TimesRoman),
            (("Times", 700, false), StandardFont::TimesBold),
            (("Times", 400, true), StandardFont::TimesItalic),
            (("Times", 700, true), StandardFont::TimesBoldItalic),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::CourierBold),
            (("Courier", 400, true), StandardFont::CourierOblique),
            (("Courier", 700, true), StandardFont::CourierBoldOblique),
            (("Symbol", 400, false), StandardFont::Symbol),
            (("ZapfDingbats", 400, false), StandardFont::ZapfDingbats),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self {
            fonts,
            fallback: FontData::Standard(StandardFont::Helvetica),
        }
    }

    /// Look up a font, falling back to Helvetica in the same weight/slant.
    pub fn resolve(&self, key: &FontKey) -> &FontData {
        if let Some(font) = self.fonts.get(key) {
            return font;
        }

        let helvetica = FontKey {
            family: "Helvetica".to_string(),
            ..key.clone()
        };
        self.fonts.get(&helvetica).unwrap_or(&self.fallback)
    }

    /// Register a custom font from TrueType/OpenType bytes.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let metrics = CustomFontMetrics::from_font_data(data)?;
        self.register_metrics(family, weight, italic, metrics);
        Ok(())
    }

    /// Register already-parsed metrics under a family name.
    pub fn register_metrics(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        metrics: CustomFontMetrics,
    ) {
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight: if weight >= 600 { 700 } else { 400 },
                italic,
            },
            FontData::Custom(metrics),
        );
    }
}

/// Shared font context used by the PDF surface.
/// Provides text measurement with real glyph metrics.
#[derive(Debug, Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font: &FontSpec) -> f64 {
        match self.resolve(font) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font.size),
            FontData::Custom(metrics) => {
                text.chars().map(|ch| metrics.char_width(ch, font.size)).sum()
            }
        }
    }

    /// Resolve a font request to its font data.
    pub fn resolve(&self, font: &FontSpec) -> &FontData {
        self.registry.resolve(&FontKey::for_spec(font))
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}
