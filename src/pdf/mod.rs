//! # PDF Canvas
//!
//! A [`Surface`] that writes PDF content-stream operators.
//!
//! Callers pass coordinates relative to the current frame: origin at the
//! frame's top-left corner, y axis up. The canvas keeps a stack of frames
//! (one per open bounding box) and translates every point into absolute page
//! space before writing it. Transformation matrices are written as given, so
//! they apply in absolute page space.
//!
//! Only the content stream is produced. Wrapping it into a page object, font
//! dictionaries and the file trailer is left to whoever owns the document.
//!
//! ```text
//! q                     <- save_graphics_state
//! 1 0 0 1 10 -20 cm     <- transformation_matrix
//! BT /F1 12.0 Tf ...    <- draw_text
//! Q                     <- restore_graphics_state
//! ```

use std::fmt::Write as FmtWrite; // for write! on String

use crate::error::RenderError;
use crate::font::{FontContext, FontData, FontKey};
use crate::svg::{Body, FontSpec, Overflow, Region, Rgb, Surface, TextMeasure};
use miniz_oxide::deflate::compress_to_vec_zlib;

/// An open frame in absolute page coordinates.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

#[derive(Debug)]
pub struct PdfCanvas {
    stream: String,
    fonts: FontContext,
    frames: Vec<Frame>,
    state_depth: usize,
    /// Base font names in resource order: `/F1` is the first entry.
    fonts_used: Vec<String>,
    default_font_size: f64,
}

impl PdfCanvas {
    /// A canvas for a page of the given size. The root frame is the whole page.
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self::with_fonts(page_width, page_height, FontContext::new())
    }

    pub fn with_fonts(page_width: f64, page_height: f64, fonts: FontContext) -> Self {
        Self {
            stream: String::new(),
            fonts,
            frames: vec![Frame {
                left: 0.0,
                top: page_height,
                width: page_width,
                height: page_height,
            }],
            state_depth: 0,
            fonts_used: Vec::new(),
            default_font_size: 12.0,
        }
    }

    pub fn set_default_font_size(&mut self, size: f64) {
        self.default_font_size = size;
    }

    /// Register a TrueType/OpenType font for use by family name.
    pub fn register_font(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.fonts.registry_mut().register(family, weight, italic, data)
    }

    /// The content stream written so far.
    pub fn content(&self) -> &str {
        &self.stream
    }

    /// The content stream, zlib-compressed for a `/FlateDecode` stream.
    pub fn compressed_content(&self) -> Vec<u8> {
        compress_to_vec_zlib(self.stream.as_bytes(), 6)
    }

    /// Font resources referenced by the stream, as `(resource, base font)`
    /// pairs.
    pub fn fonts_used(&self) -> Vec<(String, String)> {
        self.fonts_used
            .iter()
            .enumerate()
            .map(|(i, name)| (format!("F{}", i + 1), name.clone()))
            .collect()
    }

    fn frame(&self) -> Frame {
        // The root frame is never popped.
        self.frames.last().copied().unwrap_or(Frame {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        })
    }

    fn absolute(&self, x: f64, y: f64) -> (f64, f64) {
        let frame = self.frame();
        (frame.left + x, frame.top + y)
    }

    fn point(&mut self, x: f64, y: f64, operator: &str) -> Result<(), RenderError> {
        check_finite(operator, &[x, y])?;
        let (x, y) = self.absolute(x, y);
        let _ = writeln!(self.stream, "{:.2} {:.2} {}", x, y, operator);
        Ok(())
    }

    fn color(&mut self, color: Rgb, operator: &str) -> Result<(), RenderError> {
        check_finite(operator, &[color.r, color.g, color.b])?;
        let _ = writeln!(
            self.stream,
            "{:.3} {:.3} {:.3} {}",
            color.r.clamp(0.0, 1.0),
            color.g.clamp(0.0, 1.0),
            color.b.clamp(0.0, 1.0),
            operator
        );
        Ok(())
    }

    /// Resource name for `font`, adding it to the used list on first sight.
    fn font_resource(&mut self, font: &FontSpec) -> String {
        let base = match self.fonts.resolve(font) {
            FontData::Standard(standard) => standard.pdf_name().to_string(),
            FontData::Custom(_) => custom_font_name(&FontKey::for_spec(font)),
        };
        let index = match self.fonts_used.iter().position(|used| *used == base) {
            Some(index) => index,
            None => {
                self.fonts_used.push(base);
                self.fonts_used.len() - 1
            }
        };
        format!("F{}", index + 1)
    }

    /// Encode `text` as a PDF string operand for `font`.
    fn encode_text(&self, text: &str, font: &FontSpec) -> String {
        match self.fonts.resolve(font) {
            FontData::Custom(metrics) => {
                let glyphs: String = text
                    .chars()
                    .map(|ch| format!("{:04X}", metrics.glyph_ids.get(&ch).copied().unwrap_or(0)))
                    .collect();
                format!("<{}>", glyphs)
            }
            FontData::Standard(_) => format!("({})", winansi_literal(text)),
        }
    }

    fn write_text(
        &mut self,
        text: &str,
        baseline: (f64, f64),
        font: &FontSpec,
    ) -> Result<(), RenderError> {
        check_finite("text", &[baseline.0, baseline.1, font.size])?;
        let resource = self.font_resource(font);
        let operand = self.encode_text(text, font);
        let (x, y) = self.absolute(baseline.0, baseline.1);
        let _ = write!(
            self.stream,
            "BT\n/{} {:.1} Tf\n{:.2} {:.2} Td\n{} Tj\nET\n",
            resource, font.size, x, y, operand
        );
        Ok(())
    }
}

impl TextMeasure for PdfCanvas {
    fn width_of(&self, text: &str, font: &FontSpec) -> f64 {
        self.fonts.measure_string(text, font)
    }
}

impl Surface for PdfCanvas {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), RenderError> {
        self.point(x, y, "m")
    }

    fn line_to(&mut self, x: f64, y: f64) -> Result<(), RenderError> {
        self.point(x, y, "l")
    }

    fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    ) -> Result<(), RenderError> {
        check_finite("c", &[x1, y1, x2, y2, x, y])?;
        let (x1, y1) = self.absolute(x1, y1);
        let (x2, y2) = self.absolute(x2, y2);
        let (x, y) = self.absolute(x, y);
        let _ = writeln!(
            self.stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x1, y1, x2, y2, x, y
        );
        Ok(())
    }

    fn close_path(&mut self) -> Result<(), RenderError> {
        self.add_content("h")
    }

    fn fill(&mut self) -> Result<(), RenderError> {
        self.add_content("f")
    }

    fn stroke(&mut self) -> Result<(), RenderError> {
        self.add_content("S")
    }

    fn fill_and_stroke(&mut self) -> Result<(), RenderError> {
        self.add_content("B")
    }

    fn set_fill_color(&mut self, color: Rgb) -> Result<(), RenderError> {
        self.color(color, "rg")
    }

    fn set_stroke_color(&mut self, color: Rgb) -> Result<(), RenderError> {
        self.color(color, "RG")
    }

    fn set_line_width(&mut self, width: f64) -> Result<(), RenderError> {
        check_finite("w", &[width])?;
        let _ = writeln!(self.stream, "{:.2} w", width);
        Ok(())
    }

    fn add_content(&mut self, operators: &str) -> Result<(), RenderError> {
        self.stream.push_str(operators);
        self.stream.push('\n');
        Ok(())
    }

    fn save_graphics_state(&mut self) -> Result<(), RenderError> {
        self.state_depth += 1;
        self.add_content("q")
    }

    fn restore_graphics_state(&mut self) -> Result<(), RenderError> {
        if self.state_depth == 0 {
            return Err(RenderError::Surface(
                "restore_graphics_state without a matching save".to_string(),
            ));
        }
        self.state_depth -= 1;
        self.add_content("Q")
    }

    fn transformation_matrix(&mut self, matrix: [f64; 6]) -> Result<(), RenderError> {
        check_finite("cm", &matrix)?;
        let [a, b, c, d, e, f] = matrix;
        let _ = writeln!(
            self.stream,
            "{:.4} {:.4} {:.4} {:.4} {:.2} {:.2} cm",
            a, b, c, d, e, f
        );
        Ok(())
    }

    fn frame_origin(&self) -> (f64, f64) {
        let frame = self.frame();
        (frame.left, frame.top)
    }

    fn frame_size(&self) -> (f64, f64) {
        let frame = self.frame();
        (frame.width, frame.height)
    }

    fn default_font_size(&self) -> f64 {
        self.default_font_size
    }

    fn draw_text(
        &mut self,
        text: &str,
        at: (f64, f64),
        font: &FontSpec,
    ) -> Result<(), RenderError> {
        self.write_text(text, at, font)
    }

    fn text_box(
        &mut self,
        text: &str,
        at: (f64, f64),
        width: f64,
        height: f64,
        font: &FontSpec,
        overflow: Overflow,
    ) -> Result<(), RenderError> {
        check_finite("text box", &[width, height])?;
        let mut font = font.clone();
        let measured = self.width_of(text, &font);
        if overflow == Overflow::ShrinkToFit && measured > width && measured > 0.0 {
            font.size *= width / measured;
        }
        self.write_text(text, (at.0, at.1 - height), &font)
    }

    fn bounding_box(&mut self, region: Region, body: Body<'_>) -> Result<(), RenderError> {
        check_finite("bounding box", &[region.x, region.y, region.width, region.height])?;
        let (left, top) = self.absolute(region.x, region.y);
        self.frames.push(Frame {
            left,
            top,
            width: region.width,
            height: region.height,
        });
        let result = body(self);
        self.frames.pop();
        result
    }
}

fn check_finite(operator: &str, values: &[f64]) -> Result<(), RenderError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(RenderError::Surface(format!(
            "non-finite argument to '{}': {:?}",
            operator, values
        )))
    }
}

fn custom_font_name(key: &FontKey) -> String {
    let family: String = key.family.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match (key.weight >= 700, key.italic) {
        (true, true) => format!("{}-BoldItalic", family),
        (true, false) => format!("{}-Bold", family),
        (false, true) => format!("{}-Italic", family),
        (false, false) => family,
    }
}

/// Encode `text` as the body of a literal string in WinAnsiEncoding.
/// Characters outside the encoding become `?`.
fn winansi_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch).unwrap_or(b'?') {
            b @ (b'\\' | b'(' | b')') => {
                out.push('\\');
                out.push(b as char);
            }
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to its WinAnsiEncoding (Windows-1252) byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    let byte = match cp {
        0x20AC => 0x80, // euro
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85, // ellipsis
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91, // curly quotes
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96, // en dash
        0x2014 => 0x97, // em dash
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::CustomFontMetrics;
    use crate::svg::FontSubStyle;

    fn helvetica(size: f64) -> FontSpec {
        FontSpec {
            family: Some("Helvetica".to_string()),
            sub_style: FontSubStyle::Normal,
            size,
        }
    }

    #[test]
    fn test_points_translated_to_page_space() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        canvas.move_to(10.0, -20.0).unwrap();
        canvas.line_to(30.0, -40.0).unwrap();
        assert_eq!(canvas.content(), "10.00 772.00 m\n30.00 752.00 l\n");
    }

    #[test]
    fn test_bounding_box_shifts_origin() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        let region = Region {
            x: 5.0,
            y: -10.0,
            width: 100.0,
            height: 50.0,
        };
        canvas
            .bounding_box(region, &mut |s: &mut dyn Surface| {
                assert_eq!(s.frame_origin(), (5.0, 782.0));
                assert_eq!(s.frame_size(), (100.0, 50.0));
                s.move_to(0.0, 0.0)
            })
            .unwrap();
        assert_eq!(canvas.content(), "5.00 782.00 m\n");
        assert_eq!(canvas.frame_origin(), (0.0, 792.0));
    }

    #[test]
    fn test_restore_underflow_is_surface_error() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.save_graphics_state().unwrap();
        canvas.restore_graphics_state().unwrap();
        let err = canvas.restore_graphics_state().unwrap_err();
        assert!(matches!(err, RenderError::Surface(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        assert!(canvas.move_to(f64::NAN, 0.0).is_err());
        assert!(canvas
            .transformation_matrix([1.0, 0.0, 0.0, 1.0, f64::INFINITY, 0.0])
            .is_err());
        assert!(canvas.content().is_empty());
    }

    #[test]
    fn test_draw_text_standard_font() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        canvas.draw_text("Hi (x)", (10.0, -20.0), &helvetica(12.0)).unwrap();
        assert_eq!(
            canvas.content(),
            "BT\n/F1 12.0 Tf\n10.00 772.00 Td\n(Hi \\(x\\)) Tj\nET\n"
        );
        assert_eq!(canvas.fonts_used(), vec![("F1".to_string(), "Helvetica".to_string())]);
    }

    #[test]
    fn test_font_resources_deduplicated() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        let bold = FontSpec {
            sub_style: FontSubStyle::Bold,
            ..helvetica(12.0)
        };
        canvas.draw_text("a", (0.0, 0.0), &helvetica(12.0)).unwrap();
        canvas.draw_text("b", (0.0, 0.0), &bold).unwrap();
        canvas.draw_text("c", (0.0, 0.0), &helvetica(9.0)).unwrap();
        let used: Vec<String> = canvas.fonts_used().into_iter().map(|(_, base)| base).collect();
        assert_eq!(used, vec!["Helvetica", "Helvetica-Bold"]);
        assert!(canvas.content().contains("/F1 9.0 Tf"));
    }

    #[test]
    fn test_text_box_shrinks_to_fit() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        let font = helvetica(20.0);
        let natural = canvas.width_of("Hello", &font);
        canvas
            .text_box("Hello", (0.0, 0.0), natural / 2.0, 20.0, &font, Overflow::ShrinkToFit)
            .unwrap();
        assert!(canvas.content().contains("/F1 10.0 Tf"));
        assert!(canvas.content().contains("0.00 772.00 Td"));
    }

    #[test]
    fn test_winansi_literal() {
        assert_eq!(winansi_literal("a\\b"), "a\\\\b");
        assert_eq!(winansi_literal("caf\u{e9}"), "caf\\351");
        assert_eq!(winansi_literal("\u{2014}"), "\\227");
        assert_eq!(winansi_literal("\u{4e2d}"), "?");
    }

    #[test]
    fn test_compressed_content_inflates_back() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.add_content("W n").unwrap();
        let compressed = canvas.compressed_content();
        let inflated = miniz_oxide::inflate::decompress_to_vec_zlib(&compressed).unwrap();
        assert_eq!(inflated, b"W n\n");
    }

    #[test]
    fn test_custom_font_written_as_glyph_ids() {
        let mut fonts = FontContext::new();
        let metrics = CustomFontMetrics {
            units_per_em: 1000,
            advance_widths: [('H', 700), ('i', 300)].into_iter().collect(),
            default_advance: 500,
            glyph_ids: [('H', 0x2B), ('i', 0x4C)].into_iter().collect(),
        };
        fonts.registry_mut().register_metrics("Open Sans", 400, true, metrics);
        let mut canvas = PdfCanvas::with_fonts(612.0, 792.0, fonts);
        let font = FontSpec {
            family: Some("Open Sans".to_string()),
            sub_style: FontSubStyle::Italic,
            size: 10.0,
        };

        assert!((canvas.width_of("Hi", &font) - 10.0).abs() < 1e-9);
        canvas.draw_text("Hi?", (0.0, 0.0), &font).unwrap();
        assert!(canvas.content().contains("<002B004C0000> Tj"));
        assert_eq!(
            canvas.fonts_used(),
            vec![("F1".to_string(), "OpenSans-Italic".to_string())]
        );
    }

    #[test]
    fn test_default_font_size_used_by_interpreter() {
        let mut canvas = PdfCanvas::new(612.0, 792.0);
        canvas.set_default_font_size(9.0);
        crate::svg::draw("<svg><text>x</text></svg>", &mut canvas, &Default::default()).unwrap();
        assert!(canvas.content().contains("/F1 9.0 Tf"));
    }

    #[test]
    fn test_custom_font_name() {
        let key = FontKey {
            family: "Open Sans".to_string(),
            weight: 700,
            italic: true,
        };
        assert_eq!(custom_font_name(&key), "OpenSans-BoldItalic");
    }
}
