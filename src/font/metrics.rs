//! Glyph advance widths for the standard PDF fonts.
//!
//! Widths are in 1/1000 em, taken from the Adobe core font AFM files for
//! printable ASCII (0x20..=0x7E). Anything outside that range falls back to
//! the font's default advance.

use super::StandardFont;

pub struct StandardFontMetrics {
    widths: Option<&'static [u16; 95]>,
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match (self.widths, ch as u32) {
            (Some(table), code @ 0x20..=0x7E) => table[(code - 0x20) as usize],
            _ => self.default_width,
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of `text` in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

impl StandardFont {
    /// Metrics for this font. Oblique and italic faces share the table of
    /// their upright weight.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                StandardFontMetrics {
                    widths: None,
                    default_width: 600,
                }
            }
            Self::HelveticaBold | Self::HelveticaBoldOblique => StandardFontMetrics {
                widths: Some(&HELVETICA_BOLD_WIDTHS),
                default_width: 556,
            },
            Self::TimesRoman | Self::TimesItalic => StandardFontMetrics {
                widths: Some(&TIMES_ROMAN_WIDTHS),
                default_width: 500,
            },
            Self::TimesBold | Self::TimesBoldItalic => StandardFontMetrics {
                widths: Some(&TIMES_BOLD_WIDTHS),
                default_width: 500,
            },
            _ => StandardFontMetrics {
                widths: Some(&HELVETICA_WIDTHS),
                default_width: 556,
            },
        }
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 333, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space() {
        let m = StandardFont::Helvetica.metrics();
        assert!((m.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let m = StandardFont::Courier.metrics();
        assert_eq!(m.char_width('i', 10.0), m.char_width('W', 10.0));
        assert!((m.measure_string("abc", 10.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_times_has_own_widths() {
        let roman = StandardFont::TimesRoman.metrics();
        // H 722 + e 444 + l 278 + l 278 + o 500 = 2222
        assert!((roman.measure_string("Hello", 10.0) - 22.22).abs() < 1e-9);
        assert!(roman.char_width('e', 10.0) < StandardFont::Helvetica.metrics().char_width('e', 10.0));

        let bold = StandardFont::TimesBold.metrics();
        assert!((bold.char_width('W', 1000.0) - 1000.0).abs() < 1e-9);
        assert!((StandardFont::TimesItalic.metrics().char_width('A', 1.0) - 0.722).abs() < 1e-9);
    }

    #[test]
    fn test_non_ascii_uses_default() {
        let m = StandardFont::Helvetica.metrics();
        assert!((m.char_width('é', 1000.0) - 556.0).abs() < 1e-9);
    }
}
