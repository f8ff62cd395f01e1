#![forbid(unsafe_code)]

//! Text measurement.
//!
//! The engine sizes the pin-name bar, voltage bar, and every centered label
//! from measured text extents. Hosts with real font metrics implement
//! [`TextMeasurer`]; the default is a deterministic monospace model so
//! layout (and tests) never depend on a font stack.

use unicode_width::UnicodeWidthStr;

/// Measured size of a rendered string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Maps a string at a font size to a pixel extent.
pub trait TextMeasurer {
    fn measure(&self, text: &str, size: f64) -> TextExtent;
}

/// Fixed-advance measurer: every terminal column advances a constant
/// fraction of the font size. Wide (CJK) graphemes count as two columns via
/// `unicode-width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonoMeasurer {
    /// Horizontal advance per column, as a fraction of the font size.
    pub advance: f64,
    /// Line height as a fraction of the font size.
    pub line_height: f64,
}

impl Default for MonoMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasurer for MonoMeasurer {
    fn measure(&self, text: &str, size: f64) -> TextExtent {
        let columns = UnicodeWidthStr::width(text) as f64;
        TextExtent {
            width: columns * size * self.advance,
            height: size * self.line_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length_and_size() {
        let m = MonoMeasurer::default();
        let small = m.measure("CLK", 10.0);
        let large = m.measure("CLK", 20.0);
        assert_eq!(small.width, 3.0 * 10.0 * 0.6);
        assert_eq!(large.width, small.width * 2.0);
    }

    #[test]
    fn empty_string_has_zero_width() {
        let m = MonoMeasurer::default();
        let e = m.measure("", 14.0);
        assert_eq!(e.width, 0.0);
        assert!(e.height > 0.0);
    }

    #[test]
    fn wide_graphemes_take_two_columns() {
        let m = MonoMeasurer::default();
        assert_eq!(m.measure("信号", 10.0).width, 4.0 * 10.0 * 0.6);
    }
}
