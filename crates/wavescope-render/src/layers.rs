#![forbid(unsafe_code)]

//! The layer set: six independently invalidated draw lists and the
//! change-kind → redraw table.
//!
//! Which layers repaint for a given external change is data, not implicit
//! call order: [`ChangeKind::layers`] returns the ordered redraw set and
//! [`Frame::ops`] composites back-to-front. Repaint order matters — Traces
//! reads voltage-band geometry that the Grid/Pins pass settles.

use bitflags::bitflags;

use crate::display_list::{DisplayList, DrawOp};
use crate::layout::{LayoutGeometry, Spacing};
use crate::style::Palette;
use wavescope_core::cursor::CursorSet;
use wavescope_core::geometry::PointF;
use wavescope_core::sample::SampleStore;
use wavescope_core::text::{TextExtent, TextMeasurer};
use wavescope_core::units::UnitFormat;

/// One of the six render layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerId {
    /// Static frame, bands, and the line legend.
    Frame,
    /// Cycle separators, time/fail markers, last-point shading.
    Grid,
    /// Pin names, top labels, fail dots, voltage scale.
    Pins,
    /// Waveform polylines, NaN markers, compare markers.
    Traces,
    /// Transient pointer overlay.
    Mouse,
    /// Timing-cursor overlay.
    Cursor,
}

impl LayerId {
    /// All layers, in composite (back-to-front) order.
    pub const COMPOSITE_ORDER: [LayerId; 6] = [
        LayerId::Frame,
        LayerId::Grid,
        LayerId::Pins,
        LayerId::Traces,
        LayerId::Mouse,
        LayerId::Cursor,
    ];

    const fn slot(self) -> usize {
        match self {
            LayerId::Frame => 0,
            LayerId::Grid => 1,
            LayerId::Pins => 2,
            LayerId::Traces => 3,
            LayerId::Mouse => 4,
            LayerId::Cursor => 5,
        }
    }
}

bitflags! {
    /// Dirty-layer bit set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerMask: u8 {
        const FRAME  = 1 << 0;
        const GRID   = 1 << 1;
        const PINS   = 1 << 2;
        const TRACES = 1 << 3;
        const MOUSE  = 1 << 4;
        const CURSOR = 1 << 5;
    }
}

impl From<LayerId> for LayerMask {
    fn from(id: LayerId) -> Self {
        match id {
            LayerId::Frame => LayerMask::FRAME,
            LayerId::Grid => LayerMask::GRID,
            LayerId::Pins => LayerMask::PINS,
            LayerId::Traces => LayerMask::TRACES,
            LayerId::Mouse => LayerMask::MOUSE,
            LayerId::Cursor => LayerMask::CURSOR,
        }
    }
}

/// What changed since the last render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Horizontal scroll moved.
    Horizontal,
    /// Vertical scroll moved.
    Vertical,
    /// Zoom scale changed.
    Zoom,
    /// Pin visibility or ordering changed.
    PinVisibility,
    /// Only the pointer moved.
    MouseMove,
    /// Everything: new data, resize, or first render.
    Full,
}

impl ChangeKind {
    /// Ordered set of layers this change invalidates.
    pub const fn layers(self) -> &'static [LayerId] {
        use LayerId::{Cursor, Frame, Grid, Mouse, Pins, Traces};
        match self {
            ChangeKind::Horizontal => &[Grid, Traces, Cursor],
            ChangeKind::Vertical => &[Pins, Traces, Cursor],
            ChangeKind::Zoom => &[Grid, Pins, Frame, Traces, Cursor],
            ChangeKind::PinVisibility => &[Pins, Traces, Cursor],
            ChangeKind::MouseMove => &[Mouse],
            ChangeKind::Full => &[Grid, Pins, Frame, Traces, Mouse, Cursor],
        }
    }

    /// Whether this change requires a fresh layout pass first.
    pub const fn needs_layout(self) -> bool {
        !matches!(self, ChangeKind::Horizontal | ChangeKind::MouseMove)
    }

    /// The invalidated layers as a bit set.
    pub fn mask(self) -> LayerMask {
        self.layers()
            .iter()
            .fold(LayerMask::empty(), |acc, &id| acc | LayerMask::from(id))
    }
}

/// The composited frame: one retained list per layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    lists: [DisplayList; 6],
}

impl Frame {
    /// Read one layer's list.
    pub fn layer(&self, id: LayerId) -> &DisplayList {
        &self.lists[id.slot()]
    }

    /// Mutable access for repainting one layer.
    pub fn layer_mut(&mut self, id: LayerId) -> &mut DisplayList {
        &mut self.lists[id.slot()]
    }

    /// Clear every layer.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    /// All ops, composited back-to-front.
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        LayerId::COMPOSITE_ORDER
            .into_iter()
            .flat_map(|id| self.layer(id).ops().iter())
    }
}

/// Everything a layer painter reads.
pub struct PaintCtx<'a> {
    pub store: &'a SampleStore,
    pub layout: &'a LayoutGeometry,
    pub spacing: &'a Spacing,
    pub palette: &'a Palette,
    pub units: &'a UnitFormat,
    pub measurer: &'a dyn TextMeasurer,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Declaration indexes of shown pins, in display order.
    pub visible_pins: &'a [usize],
    pub cursors: &'a CursorSet,
    pub mouse: Option<PointF>,
}

impl PaintCtx<'_> {
    /// Pixel x of a (possibly fractional) global sample index.
    pub fn sample_x(&self, point: f64) -> f64 {
        self.layout.plot.left() + point * self.layout.px_per_sample - self.scroll_x
    }

    /// Top edge of the n-th visible pin row.
    pub fn row_top(&self, visible_row: usize) -> f64 {
        self.layout.plot.top() + visible_row as f64 * self.layout.row_height - self.scroll_y
    }

    /// Global sample index under a pixel x (may be negative off the left).
    pub fn point_at_x(&self, x: f64) -> i64 {
        ((self.scroll_x + x - self.layout.plot.left()) / self.layout.px_per_sample).floor() as i64
    }

    /// Visible row index under a pixel y (may be negative above the plot).
    pub fn row_at_y(&self, y: f64) -> i64 {
        ((self.scroll_y + y - self.layout.plot.top()) / self.layout.row_height).floor() as i64
    }

    /// Time in seconds of a global sample index.
    pub fn time_of(&self, point: usize) -> f64 {
        point as f64 * self.spacing.timing_resolution
    }

    /// Measure text at a size.
    pub fn text_extent(&self, text: &str, size: f64) -> TextExtent {
        self.measurer.measure(text, size)
    }

    /// The inclusive visible cycle range for the current scroll.
    pub fn visible_cycles(&self) -> Option<(usize, usize)> {
        self.store.cycles().visible_cycles(
            self.scroll_x,
            self.layout.plot.width,
            self.layout.px_per_sample,
        )
    }

    /// The inclusive visible pin-row range for the current scroll.
    pub fn visible_rows(&self) -> Option<(usize, usize)> {
        wavescope_core::sample::visible_rows(
            self.scroll_y,
            self.layout.plot.height,
            self.layout.row_height,
            self.visible_pins.len(),
        )
    }
}

/// Repaint a single layer into its list.
pub fn paint_layer(ctx: &PaintCtx<'_>, id: LayerId, list: &mut DisplayList) {
    list.clear();
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("paint_layer", layer = ?id).entered();
    match id {
        LayerId::Frame => crate::chrome::paint(ctx, list),
        LayerId::Grid => crate::grid::paint(ctx, list),
        LayerId::Pins => crate::pins::paint(ctx, list),
        LayerId::Traces => crate::trace::paint(ctx, list),
        LayerId::Mouse => crate::overlay::paint(ctx, list),
        LayerId::Cursor => crate::cursors::paint(ctx, list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redraw_table_matches_layer_dependencies() {
        // Grid depends on horizontal scroll, Pins on vertical, Traces on both.
        assert_eq!(
            ChangeKind::Horizontal.layers(),
            &[LayerId::Grid, LayerId::Traces, LayerId::Cursor]
        );
        assert_eq!(
            ChangeKind::Vertical.layers(),
            &[LayerId::Pins, LayerId::Traces, LayerId::Cursor]
        );
        assert!(!ChangeKind::Horizontal.mask().contains(LayerMask::PINS));
        assert!(!ChangeKind::Vertical.mask().contains(LayerMask::GRID));
    }

    #[test]
    fn mouse_move_touches_only_the_overlay() {
        assert_eq!(ChangeKind::MouseMove.layers(), &[LayerId::Mouse]);
        assert_eq!(ChangeKind::MouseMove.mask(), LayerMask::MOUSE);
        assert!(!ChangeKind::MouseMove.needs_layout());
    }

    #[test]
    fn full_invalidates_everything() {
        assert_eq!(ChangeKind::Full.mask(), LayerMask::all());
        assert!(ChangeKind::Full.needs_layout());
    }

    #[test]
    fn zoom_skips_the_mouse_overlay() {
        let mask = ChangeKind::Zoom.mask();
        assert!(mask.contains(LayerMask::FRAME | LayerMask::TRACES));
        assert!(!mask.contains(LayerMask::MOUSE));
    }

    #[test]
    fn composite_order_is_frame_first_cursor_last() {
        assert_eq!(LayerId::COMPOSITE_ORDER[0], LayerId::Frame);
        assert_eq!(LayerId::COMPOSITE_ORDER[5], LayerId::Cursor);
    }

    #[test]
    fn frame_composites_layers_in_order() {
        use crate::display_list::Stroke;
        use wavescope_core::color::Rgba;

        let mut frame = Frame::default();
        frame
            .layer_mut(LayerId::Cursor)
            .text(PointF::new(0.0, 0.0), "top", 8.0, Rgba::BLACK);
        frame.layer_mut(LayerId::Frame).line(
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 0.0),
            Stroke::solid(Rgba::BLACK, 1.0),
        );
        let ops: Vec<_> = frame.ops().collect();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::Line { .. }));
        assert!(matches!(ops[1], DrawOp::Text { .. }));
    }
}
