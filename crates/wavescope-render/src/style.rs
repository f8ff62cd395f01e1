#![forbid(unsafe_code)]

//! The color palette.
//!
//! All colors the engine paints with, as one immutable style value supplied
//! by the caller. Per-marker and per-cursor colors are indexed lists with an
//! explicit default slot; an index past the list falls back to the default
//! color rather than failing.

use wavescope_core::color::Rgba;
use wavescope_core::sample::Line;

/// Colors for every painted element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    pub background: Rgba,
    pub frame_line: Rgba,
    /// Trace color when the line defines none.
    pub default_trace: Rgba,
    /// Dashed continuation segments and "!" glyphs for NaN samples.
    pub nan_trace: Rgba,
    pub compare_line: Rgba,
    /// Fill of the compare-window band (semi-transparent).
    pub compare_window: Rgba,
    /// Fill behind a failing (pin, cycle) block (semi-transparent).
    pub fail_cycle: Rgba,
    pub fail_circle: Rgba,
    pub pin_top_label_box: Rgba,
    pub pin_top_label_text: Rgba,
    pub pin_name: Rgba,
    pub timing_text: Rgba,
    pub voltage_text: Rgba,
    pub cycle_top_label: Rgba,
    /// Dashed max/min voltage scale lines.
    pub scale_line: Rgba,
    /// Indexed colors for user voltage-level markers.
    pub voltage_levels: Vec<Rgba>,
    pub default_voltage_level: Rgba,
    /// Indexed colors for timing cursors.
    pub cursors: Vec<Rgba>,
    pub default_cursor: Rgba,
    pub mouse_point_text: Rgba,
    pub mouse_cursor_line: Rgba,
    pub mouse_cursor_text: Rgba,
    pub information_text: Rgba,
    /// Shading over the record's ignored final sample column.
    pub ignored_last_point: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::WHITE,
            frame_line: Rgba::BLACK,
            default_trace: Rgba::BLACK,
            nan_trace: Rgba::RED,
            compare_line: Rgba::BLACK,
            compare_window: Rgba::BLUE.with_alpha(128),
            fail_cycle: Rgba::RED.with_alpha(85),
            fail_circle: Rgba::RED,
            pin_top_label_box: Rgba::rgb(255, 165, 0),
            pin_top_label_text: Rgba::WHITE,
            pin_name: Rgba::BLUE,
            timing_text: Rgba::BLACK,
            voltage_text: Rgba::BLACK,
            cycle_top_label: Rgba::BLACK,
            scale_line: Rgba::GREEN,
            voltage_levels: Vec::new(),
            default_voltage_level: Rgba::rgb(255, 165, 0),
            cursors: Vec::new(),
            default_cursor: Rgba::BLUE,
            mouse_point_text: Rgba::BLUE,
            mouse_cursor_line: Rgba::rgb(105, 105, 105),
            mouse_cursor_text: Rgba::RED,
            information_text: Rgba::BLUE,
            ignored_last_point: Rgba::rgb(211, 211, 211),
        }
    }
}

impl Palette {
    /// Color for the n-th user voltage-level marker.
    pub fn voltage_level_color(&self, index: usize) -> Rgba {
        self.voltage_levels
            .get(index)
            .copied()
            .unwrap_or(self.default_voltage_level)
    }

    /// Color for the n-th timing cursor.
    pub fn cursor_color(&self, index: usize) -> Rgba {
        self.cursors
            .get(index)
            .copied()
            .unwrap_or(self.default_cursor)
    }

    /// Effective trace color for a line.
    pub fn line_color(&self, line: &Line) -> Rgba {
        line.color.unwrap_or(self.default_trace)
    }
}
