#![forbid(unsafe_code)]

//! The layout engine.
//!
//! [`LayoutGeometry::compute`] derives every pixel measurement of a frame —
//! plot rectangle, bar widths, scale factors, scroll maxima — from three
//! inputs: the viewport size, the zoom scales, and measured content metrics.
//! It is a pure function; the engine stores the result once per layout pass
//! and every painter reads the same snapshot.

use wavescope_core::geometry::{PointF, RectF};
use wavescope_core::sample::SampleStore;
use wavescope_core::text::TextMeasurer;
use wavescope_core::units::UnitFormat;

/// Fixed spacing and sizing configuration.
///
/// Treated as an immutable style value, like the palette.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    /// Outer window padding on all sides.
    pub window_padding: f64,
    /// Legend band height above the frame.
    pub legend_height: f64,
    /// Mouse-info band height below the frame.
    pub info_height: f64,
    /// Error-bar band height (fail circles) above the plot.
    pub error_band_height: f64,
    /// Time band height (cycle labels) below the plot.
    pub time_band_height: f64,
    /// Horizontal pixels per sample point at zoom 1.0.
    pub base_px_per_point: f64,
    /// Pin row height at zoom 1.0.
    pub base_row_height: f64,
    /// Padding around pin-name/top-label text in the pin bar.
    pub pin_text_padding: f64,
    /// Inner padding around voltage text in the voltage bar.
    pub volt_text_padding: f64,
    /// Vertical padding between a row edge and its voltage band.
    pub volt_band_padding: f64,
    /// Voltage-scale tick width at zoom 1.0.
    pub base_scale_tick_width: f64,
    /// Error-band fail-circle radius.
    pub fail_circle_radius: f64,
    /// Default frame/grid stroke width.
    pub line_width: f64,
    /// Seconds per sample point.
    pub timing_resolution: f64,
    /// Zoom change per zoom-in/out step.
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Compare-arrow head length as a fraction of the arrow height.
    pub compare_arrow_scale: f64,
    /// Compare-arrow head half-angle in degrees.
    pub compare_arrow_angle_deg: f64,
    pub time_text_size: f64,
    pub pin_name_text_size: f64,
    pub volt_text_size: f64,
    pub legend_text_size: f64,
    pub cursor_text_size: f64,
    pub cycle_label_text_size: f64,
    pub nan_glyph_text_size: f64,
    pub pin_label_text_size: f64,
    pub mouse_text_size: f64,
    /// Left padding of the info readout text.
    pub info_text_padding: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            window_padding: 5.0,
            legend_height: 30.0,
            info_height: 30.0,
            error_band_height: 26.0,
            time_band_height: 26.0,
            base_px_per_point: 5.0,
            base_row_height: 86.0,
            pin_text_padding: 5.0,
            volt_text_padding: 5.0,
            volt_band_padding: 0.1,
            base_scale_tick_width: 10.0,
            fail_circle_radius: 7.5,
            line_width: 1.0,
            timing_resolution: 1e-9,
            zoom_step: 0.5,
            min_zoom: 0.05,
            max_zoom: 5.0,
            compare_arrow_scale: 0.1,
            compare_arrow_angle_deg: 45.0,
            time_text_size: 8.0,
            pin_name_text_size: 14.0,
            volt_text_size: 8.0,
            legend_text_size: 14.0,
            cursor_text_size: 8.0,
            cycle_label_text_size: 8.0,
            nan_glyph_text_size: 24.0,
            pin_label_text_size: 8.0,
            mouse_text_size: 8.0,
            info_text_padding: 5.0,
        }
    }
}

impl Spacing {
    /// Clamp a zoom scale to the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Measured content inputs to the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentMetrics {
    pub cycle_count: usize,
    pub total_points: usize,
    pub visible_pin_count: usize,
    /// Widest rendered pin name or top label among visible pins.
    pub pin_text_width: f64,
    /// Widest rendered max/min/marker voltage text among visible pins.
    pub volt_text_width: f64,
    /// Height of voltage-bar text (positions the voltage band).
    pub volt_text_height: f64,
}

impl ContentMetrics {
    /// Measure the store's visible pins.
    pub fn measure(
        store: &SampleStore,
        units: &UnitFormat,
        spacing: &Spacing,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let mut pin_text_width = 0.0f64;
        let mut volt_text_width = 0.0f64;
        for &pin_idx in &store.visible_pins() {
            let pin = &store.pins()[pin_idx];
            let name = measurer.measure(pin.name(), spacing.pin_name_text_size);
            pin_text_width = pin_text_width.max(name.width);
            if let Some(label) = pin.top_label() {
                let label = measurer.measure(label, spacing.pin_label_text_size);
                pin_text_width = pin_text_width.max(label.width);
            }

            let range = pin.voltage_range();
            let mut volts = vec![range.max_volt(), range.min_volt()];
            volts.extend(range.markers().iter().map(|m| m.voltage));
            for volt in volts {
                let text = units.voltage(volt);
                let extent = measurer.measure(&text, spacing.volt_text_size);
                volt_text_width = volt_text_width.max(extent.width);
            }
        }
        let volt_text_height = measurer.measure("0", spacing.volt_text_size).height;
        Self {
            cycle_count: store.cycles().len(),
            total_points: store.cycles().total_points(),
            visible_pin_count: store.visible_pin_count(),
            pin_text_width,
            volt_text_width,
            volt_text_height,
        }
    }
}

/// Every derived pixel measurement of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutGeometry {
    pub window_w: f64,
    pub window_h: f64,
    /// Framed content width/height (window minus padding and bands).
    pub actual_w: f64,
    pub actual_h: f64,
    /// Top-left corner of the framed content.
    pub origin: PointF,
    /// The waveform plotting area.
    pub plot: RectF,
    pub pin_bar_width: f64,
    pub volt_bar_width: f64,
    pub px_per_sample: f64,
    pub row_height: f64,
    pub scale_tick_width: f64,
    pub max_scroll_x: f64,
    pub max_scroll_y: f64,
    /// Voltage-bar text height carried through for band placement.
    pub volt_text_height: f64,
}

impl LayoutGeometry {
    /// Derive the full geometry for one frame.
    pub fn compute(
        window_w: f64,
        window_h: f64,
        zoom_x: f64,
        zoom_y: f64,
        metrics: &ContentMetrics,
        spacing: &Spacing,
    ) -> Self {
        let zoom_x = spacing.clamp_zoom(zoom_x);
        let zoom_y = spacing.clamp_zoom(zoom_y);
        let pad = spacing.window_padding;

        let actual_w = (window_w - 2.0 * pad).max(0.0);
        let actual_h =
            (window_h - 2.0 * pad - spacing.legend_height - spacing.info_height).max(0.0);
        let wave_h = (actual_h - spacing.error_band_height - spacing.time_band_height).max(0.0);
        let origin = PointF::new(pad, pad + spacing.legend_height);

        let pin_bar_width = (metrics.pin_text_width + 2.0 * spacing.pin_text_padding).max(10.0);
        let scale_tick_width = spacing.base_scale_tick_width * zoom_x;
        let volt_bar_width =
            metrics.volt_text_width + 2.0 * spacing.volt_text_padding + scale_tick_width / 2.0;

        let px_per_sample = spacing.base_px_per_point * zoom_x;
        let row_height = spacing.base_row_height * zoom_y;

        let left = origin.x + pin_bar_width + volt_bar_width;
        let top = origin.y + spacing.error_band_height;
        let right = origin.x + actual_w;
        let plot = RectF::new(left, top, (right - left).max(0.0), wave_h);

        let content_w = metrics.total_points as f64 * px_per_sample;
        let content_h = metrics.visible_pin_count as f64 * row_height;
        let max_scroll_x = (content_w - plot.width).max(0.0);
        let max_scroll_y = (content_h - plot.height).max(0.0);

        Self {
            window_w,
            window_h,
            actual_w,
            actual_h,
            origin,
            plot,
            pin_bar_width,
            volt_bar_width,
            px_per_sample,
            row_height,
            scale_tick_width,
            max_scroll_x,
            max_scroll_y,
            volt_text_height: metrics.volt_text_height,
        }
    }

    /// The voltage band `[top, bottom]` of a pin row starting at `row_top`.
    ///
    /// The max-volt line sits half a text height inside the row so its label
    /// centers on the line; same for min at the bottom.
    pub fn volt_band(&self, row_top: f64, spacing: &Spacing) -> (f64, f64) {
        let inset = spacing.volt_band_padding + self.volt_text_height / 2.0;
        (row_top + inset, row_top + self.row_height - inset)
    }
}
