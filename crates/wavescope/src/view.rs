#![forbid(unsafe_code)]

//! The waveform engine: scroll/zoom state, render dispatch, and every
//! interaction query.
//!
//! Single-threaded and synchronous: each call completes before returning,
//! and layer repaint order within a render pass is significant (Traces reads
//! band geometry settled by the Grid/Pins passes). Re-entrant calls from
//! inside a paint are unsupported.

use std::fmt;

use wavescope_core::cursor::{CursorPosition, CursorSet, TimingCursor};
use wavescope_core::geometry::PointF;
use wavescope_core::sample::{CycleSet, Line, Pin, SampleStore};
use wavescope_core::text::{MonoMeasurer, TextMeasurer};
use wavescope_core::units::UnitFormat;
use wavescope_render::layers::{ChangeKind, Frame, PaintCtx, paint_layer};
use wavescope_render::layout::{ContentMetrics, LayoutGeometry, Spacing};
use wavescope_render::style::Palette;

/// Result of a pointer hit test inside the plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitInfo {
    /// Plain waveform area.
    Normal,
    /// A timing cursor occupies the exact (cycle, point) under the pointer.
    TimingCursor { name: String },
}

/// Direction of one zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Structured failures for interaction queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The store holds no cycles.
    NoCycles,
    /// No cycle carries the requested pattern offset.
    OffsetNotFound { offset: u64 },
    /// Offset + delta lands outside the cycle range.
    JumpOutOfRange {
        offset: u64,
        delta: i64,
        cycles: usize,
    },
    /// No pin with this name exists.
    PinNotFound { name: String },
    /// The pin exists but is hidden.
    PinHidden { name: String },
    /// A cursor is being dragged; the operation must wait for release.
    CursorBusy,
    /// No cursor with this name exists.
    CursorNotFound { name: String },
    /// A cursor with this name already exists.
    CursorNameTaken { name: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCycles => write!(f, "no cycles are loaded"),
            Self::OffsetNotFound { offset } => {
                write!(f, "pattern offset {offset} does not match any cycle")
            }
            Self::JumpOutOfRange {
                offset,
                delta,
                cycles,
            } => write!(
                f,
                "jump target (offset {offset}, delta {delta}) is outside the cycle range [0, {}]",
                cycles.saturating_sub(1)
            ),
            Self::PinNotFound { name } => write!(f, "pin \"{name}\" is not defined"),
            Self::PinHidden { name } => write!(f, "pin \"{name}\" is not shown"),
            Self::CursorBusy => write!(f, "another timing cursor is being moved"),
            Self::CursorNotFound { name } => write!(f, "timing cursor \"{name}\" does not exist"),
            Self::CursorNameTaken { name } => {
                write!(f, "timing cursor \"{name}\" already exists")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// The waveform view engine.
///
/// Owns the derived geometry, layer lists, and cursor state; the sample
/// store and style values come from the caller. All mutation happens
/// synchronously in response to a single call.
pub struct WaveformView {
    store: SampleStore,
    palette: Palette,
    spacing: Spacing,
    units: UnitFormat,
    measurer: Box<dyn TextMeasurer>,
    window_w: f64,
    window_h: f64,
    zoom_x: f64,
    zoom_y: f64,
    scroll_x: f64,
    scroll_y: f64,
    mouse: Option<PointF>,
    cursors: CursorSet,
    layout: LayoutGeometry,
    visible_pins: Vec<usize>,
    frame: Frame,
}

impl Default for WaveformView {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformView {
    /// Create an engine with default style values and no samples.
    pub fn new() -> Self {
        let mut view = Self {
            store: SampleStore::default(),
            palette: Palette::default(),
            spacing: Spacing::default(),
            units: UnitFormat::default(),
            measurer: Box::new(MonoMeasurer::default()),
            window_w: 0.0,
            window_h: 0.0,
            zoom_x: 1.0,
            zoom_y: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            mouse: None,
            cursors: CursorSet::default(),
            layout: LayoutGeometry::default(),
            visible_pins: Vec::new(),
            frame: Frame::default(),
        };
        view.refresh_layout();
        view
    }

    // --- Setup -------------------------------------------------------------

    /// Load a new record; cursors are dropped and scroll resets.
    pub fn set_samples(&mut self, cycles: CycleSet, pins: Vec<Pin>, lines: Vec<Line>) {
        self.store = SampleStore::new(cycles, pins, lines);
        self.cursors.clear();
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        self.refresh_layout();
    }

    /// Swap the color palette.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Swap the spacing configuration.
    pub fn set_spacing(&mut self, spacing: Spacing) {
        self.spacing = spacing;
        self.refresh_layout();
    }

    /// Swap the unit/precision format.
    pub fn set_units(&mut self, units: UnitFormat) {
        self.units = units;
        self.refresh_layout();
    }

    /// Install host font metrics in place of the monospace default.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.refresh_layout();
    }

    // --- Layout inputs -----------------------------------------------------

    /// Set the viewport (window) size in pixels.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.window_w = width;
        self.window_h = height;
        self.refresh_layout();
    }

    /// Set both zoom scales (clamped to the configured range).
    pub fn set_zoom(&mut self, zoom_x: f64, zoom_y: f64) {
        self.zoom_x = self.spacing.clamp_zoom(zoom_x);
        self.zoom_y = self.spacing.clamp_zoom(zoom_y);
        self.refresh_layout();
    }

    /// Current (x, y) zoom scales.
    pub fn zoom(&self) -> (f64, f64) {
        (self.zoom_x, self.zoom_y)
    }

    /// Set scroll offsets, clamped to `[0, max]`.
    pub fn set_scroll(&mut self, scroll_x: f64, scroll_y: f64) {
        self.scroll_x = scroll_x.clamp(0.0, self.layout.max_scroll_x);
        self.scroll_y = scroll_y.clamp(0.0, self.layout.max_scroll_y);
    }

    /// Current scroll offsets.
    pub fn scroll(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    /// Maximum scroll extents for scrollbar sizing.
    pub fn max_scroll(&self) -> (f64, f64) {
        (self.layout.max_scroll_x, self.layout.max_scroll_y)
    }

    // --- Accessors ---------------------------------------------------------

    /// The loaded record.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Mutable record access (flag/visibility edits; follow with a render
    /// pass of the matching change kind).
    pub fn store_mut(&mut self) -> &mut SampleStore {
        &mut self.store
    }

    /// The timing cursors.
    pub fn cursors(&self) -> &CursorSet {
        &self.cursors
    }

    /// The geometry of the last layout pass.
    pub fn layout(&self) -> &LayoutGeometry {
        &self.layout
    }

    /// The last composited frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    // --- Rendering ---------------------------------------------------------

    /// Repaint the layers invalidated by `change` and return the frame.
    pub fn render(&mut self, change: ChangeKind) -> &Frame {
        tracing::debug!(?change, "render pass");
        if change.needs_layout() {
            self.refresh_layout();
        }
        let mut frame = std::mem::take(&mut self.frame);
        {
            let ctx = self.paint_ctx();
            for &layer in change.layers() {
                paint_layer(&ctx, layer, frame.layer_mut(layer));
            }
        }
        self.frame = frame;
        &self.frame
    }

    fn refresh_layout(&mut self) {
        self.visible_pins = self.store.visible_pins();
        let metrics = ContentMetrics::measure(
            &self.store,
            &self.units,
            &self.spacing,
            self.measurer.as_ref(),
        );
        self.layout = LayoutGeometry::compute(
            self.window_w,
            self.window_h,
            self.zoom_x,
            self.zoom_y,
            &metrics,
            &self.spacing,
        );
        self.scroll_x = self.scroll_x.clamp(0.0, self.layout.max_scroll_x);
        self.scroll_y = self.scroll_y.clamp(0.0, self.layout.max_scroll_y);
    }

    fn paint_ctx(&self) -> PaintCtx<'_> {
        PaintCtx {
            store: &self.store,
            layout: &self.layout,
            spacing: &self.spacing,
            palette: &self.palette,
            units: &self.units,
            measurer: self.measurer.as_ref(),
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            visible_pins: &self.visible_pins,
            cursors: &self.cursors,
            mouse: self.mouse,
        }
    }

    // --- Pixel <-> logical -------------------------------------------------

    /// Global sample index under a pixel x.
    fn point_at_x(&self, x: f64) -> i64 {
        ((self.scroll_x + x - self.layout.plot.left()) / self.layout.px_per_sample).floor() as i64
    }

    /// Resolve a plot pixel to `(cycle, point_in_cycle)`.
    fn resolve_sample(&self, x: f64) -> Option<(usize, usize)> {
        let global = self.point_at_x(x);
        let cycle_idx = self.store.cycles().cycle_at_point(global)?;
        let cycle = self.store.cycles().get(cycle_idx)?;
        Some((cycle_idx, global as usize - cycle.cumulative_points()))
    }

    fn time_at(&self, cycle_idx: usize, point: usize) -> f64 {
        let cycle = self
            .store
            .cycles()
            .get(cycle_idx)
            .expect("resolved cycle index");
        (cycle.cumulative_points() + point) as f64 * self.spacing.timing_resolution
    }

    // --- Interaction -------------------------------------------------------

    /// What is under a pointer position; `None` outside the plot or off the
    /// record.
    pub fn hit_test(&self, point: PointF) -> Option<HitInfo> {
        if self.store.cycles().is_empty() || !self.layout.plot.contains(point) {
            return None;
        }
        let (cycle, sample) = self.resolve_sample(point.x)?;
        match self.cursors.find_at(cycle, sample) {
            Some(cursor) => Some(HitInfo::TimingCursor {
                name: cursor.name().to_string(),
            }),
            None => Some(HitInfo::Normal),
        }
    }

    /// Track the pointer (`None` = left the view). While a cursor is being
    /// dragged, each move pins it to the resolved sample position.
    pub fn mouse_move(&mut self, point: Option<PointF>) {
        self.mouse = point;
        let Some(p) = point else {
            return;
        };
        if !self.layout.plot.contains(p) {
            return;
        }
        let Some((cycle, sample)) = self.resolve_sample(p.x) else {
            return;
        };
        let time = self.time_at(cycle, sample);
        if let Some(moving) = self.cursors.moving_mut() {
            moving.set_position(CursorPosition {
                cycle,
                point: sample,
                time,
            });
        }
    }

    /// Add a timing cursor; auto-named `X{n}` when `name` is `None`.
    ///
    /// The new cursor starts in the moving state and has no position until
    /// the next pointer move resolves one.
    pub fn add_cursor(&mut self, name: Option<&str>) -> Result<String, QueryError> {
        if self.cursors.any_moving() {
            return Err(QueryError::CursorBusy);
        }
        let name = match name {
            Some(given) if self.cursors.contains(given) => {
                return Err(QueryError::CursorNameTaken {
                    name: given.to_string(),
                });
            }
            Some(given) => given.to_string(),
            None => self.cursors.auto_name(),
        };
        self.cursors.push(TimingCursor::new(&name));
        Ok(name)
    }

    /// Remove a cursor by name.
    pub fn remove_cursor(&mut self, name: &str) -> Result<(), QueryError> {
        if self.cursors.remove(name) {
            Ok(())
        } else {
            Err(QueryError::CursorNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Start dragging an existing cursor.
    pub fn begin_move_cursor(&mut self, name: &str) -> Result<(), QueryError> {
        if !self.cursors.contains(name) {
            return Err(QueryError::CursorNotFound {
                name: name.to_string(),
            });
        }
        if self.cursors.get(name).is_some_and(TimingCursor::is_moving) {
            return Ok(());
        }
        if self.cursors.any_moving() {
            return Err(QueryError::CursorBusy);
        }
        self.cursors
            .get_mut(name)
            .expect("existence checked")
            .begin_move();
        Ok(())
    }

    /// Commit the drag in progress (pointer released).
    pub fn end_cursor_move(&mut self) {
        if let Some(moving) = self.cursors.moving_mut() {
            moving.end_move();
        }
    }

    /// Drop every cursor.
    pub fn clear_cursors(&mut self) {
        self.cursors.clear();
    }

    /// Designate (or clear) the delta-measurement cursor pair.
    pub fn set_measurement(&mut self, pair: Option<(&str, &str)>) -> Result<(), QueryError> {
        if let Some((a, b)) = pair {
            for name in [a, b] {
                if !self.cursors.contains(name) {
                    return Err(QueryError::CursorNotFound {
                        name: name.to_string(),
                    });
                }
            }
            self.cursors
                .set_measurement(Some((a.to_string(), b.to_string())));
        } else {
            self.cursors.set_measurement(None);
        }
        Ok(())
    }

    /// One zoom step about a plot point. The logical sample/row under the
    /// pointer stays under it (subject to scroll clamping). Returns false —
    /// and changes nothing — for points outside the plot.
    pub fn zoom_about(&mut self, point: PointF, direction: ZoomDirection) -> bool {
        if !self.layout.plot.contains(point) {
            return false;
        }
        let plot = self.layout.plot;
        let sample = (self.scroll_x + point.x - plot.left()) / self.layout.px_per_sample;
        let row = (self.scroll_y + point.y - plot.top()) / self.layout.row_height;

        let step = match direction {
            ZoomDirection::In => self.spacing.zoom_step,
            ZoomDirection::Out => -self.spacing.zoom_step,
        };
        self.zoom_x = self.spacing.clamp_zoom(self.zoom_x + step);
        self.zoom_y = self.spacing.clamp_zoom(self.zoom_y + step);
        self.refresh_layout();

        self.scroll_x = (sample * self.layout.px_per_sample - (point.x - plot.left()))
            .clamp(0.0, self.layout.max_scroll_x);
        self.scroll_y = (row * self.layout.row_height - (point.y - plot.top()))
            .clamp(0.0, self.layout.max_scroll_y);
        self.render(ChangeKind::Zoom);
        true
    }

    /// Restore both zoom scales to 1.0.
    pub fn reset_zoom(&mut self) {
        self.zoom_x = 1.0;
        self.zoom_y = 1.0;
        self.refresh_layout();
    }

    // --- Fail navigation ---------------------------------------------------

    /// Next failing `(cycle, visible_pin_row)` pair at or after the current
    /// scroll position; pin order within the starting cycle resumes one past
    /// the current row.
    pub fn find_next_fail(&self) -> Option<(usize, usize)> {
        self.find_fail(true)
    }

    /// Previous failing `(cycle, visible_pin_row)` pair.
    pub fn find_previous_fail(&self) -> Option<(usize, usize)> {
        self.find_fail(false)
    }

    fn find_fail(&self, forward: bool) -> Option<(usize, usize)> {
        let cycles = self.store.cycles();
        let start_cycle =
            cycles.cycle_at_point((self.scroll_x / self.layout.px_per_sample).floor() as i64)?;
        let current_row = (self.scroll_y / self.layout.row_height).floor() as usize;
        let pins = self.store.visible_pins();
        if pins.is_empty() {
            return None;
        }

        let row_fails = |cycle: usize, row: usize| -> bool {
            self.store.pins()[pins[row]].cycle_has_fail(cycle)
        };

        if forward {
            for cycle in start_cycle..cycles.len() {
                let from = if cycle == start_cycle {
                    current_row + 1
                } else {
                    0
                };
                for row in from..pins.len() {
                    if row_fails(cycle, row) {
                        return Some((cycle, row));
                    }
                }
            }
        } else {
            for cycle in (0..=start_cycle).rev() {
                let from = if cycle == start_cycle {
                    match current_row.checked_sub(1) {
                        Some(row) => row,
                        None => continue,
                    }
                } else {
                    pins.len() - 1
                };
                for row in (0..=from).rev() {
                    if row_fails(cycle, row) {
                        return Some((cycle, row));
                    }
                }
            }
        }
        None
    }

    /// Find the next failing pair and scroll it into view.
    pub fn jump_to_next_fail(&mut self) -> Option<(usize, usize)> {
        let hit = self.find_next_fail()?;
        self.scroll_to_fail(hit);
        Some(hit)
    }

    /// Find the previous failing pair and scroll it into view.
    pub fn jump_to_previous_fail(&mut self) -> Option<(usize, usize)> {
        let hit = self.find_previous_fail()?;
        self.scroll_to_fail(hit);
        Some(hit)
    }

    fn scroll_to_fail(&mut self, (cycle, row): (usize, usize)) {
        let cum = self
            .store
            .cycles()
            .get(cycle)
            .map_or(0, |c| c.cumulative_points()) as f64;
        self.set_scroll(
            cum * self.layout.px_per_sample,
            row as f64 * self.layout.row_height,
        );
        self.render(ChangeKind::Full);
    }

    // --- Jumps -------------------------------------------------------------

    /// Scroll to `offset`'s cycle plus `delta` cycles; errors when the
    /// offset is unknown or the target leaves the cycle range.
    pub fn jump_to_pattern_offset(&mut self, offset: u64, delta: i64) -> Result<usize, QueryError> {
        let cycles = self.store.cycles();
        if cycles.is_empty() {
            return Err(QueryError::NoCycles);
        }
        let base = cycles
            .find_offset(offset)
            .ok_or(QueryError::OffsetNotFound { offset })?;
        let target = base as i64 + delta;
        if target < 0 || target >= cycles.len() as i64 {
            return Err(QueryError::JumpOutOfRange {
                offset,
                delta,
                cycles: cycles.len(),
            });
        }
        let target = target as usize;
        tracing::debug!(offset, delta, target, "pattern jump");
        let cum = cycles.get(target).expect("range checked").cumulative_points() as f64;
        self.set_scroll(cum * self.layout.px_per_sample, self.scroll_y);
        self.render(ChangeKind::Horizontal);
        Ok(target)
    }

    /// Scroll a named pin's row to the top of the plot.
    pub fn jump_to_pin(&mut self, name: &str) -> Result<usize, QueryError> {
        let idx = self
            .store
            .find_pin(name)
            .ok_or_else(|| QueryError::PinNotFound {
                name: name.to_string(),
            })?;
        if !self.store.pins()[idx].show {
            return Err(QueryError::PinHidden {
                name: name.to_string(),
            });
        }
        let row = self
            .store
            .visible_pins()
            .iter()
            .position(|&i| i == idx)
            .expect("shown pin appears in the visible list");
        self.set_scroll(self.scroll_x, row as f64 * self.layout.row_height);
        self.render(ChangeKind::Vertical);
        Ok(row)
    }

    /// Smallest pattern offset in the record.
    pub fn min_offset(&self) -> Option<u64> {
        self.store.cycles().get(0).map(|c| c.offset())
    }

    /// Largest pattern offset in the record.
    pub fn max_offset(&self) -> Option<u64> {
        self.store.cycles().last().map(|c| c.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_view_has_no_content() {
        let view = WaveformView::new();
        assert_eq!(view.min_offset(), None);
        assert_eq!(view.max_offset(), None);
        assert_eq!(view.max_scroll(), (0.0, 0.0));
        assert_eq!(view.hit_test(PointF::new(0.0, 0.0)), None);
    }

    #[test]
    fn jump_on_empty_store_reports_no_cycles() {
        let mut view = WaveformView::new();
        assert_eq!(
            view.jump_to_pattern_offset(0, 0),
            Err(QueryError::NoCycles)
        );
    }

    #[test]
    fn query_errors_are_descriptive() {
        let msg = QueryError::JumpOutOfRange {
            offset: 16,
            delta: 5,
            cycles: 3,
        }
        .to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("[0, 2]"));
        let msg = QueryError::PinHidden {
            name: "CLK".into(),
        }
        .to_string();
        assert!(msg.contains("CLK"));
    }

    #[test]
    fn scroll_is_clamped_to_maxima() {
        let mut view = WaveformView::new();
        view.set_viewport_size(800.0, 600.0);
        view.set_scroll(1000.0, 1000.0);
        assert_eq!(view.scroll(), (0.0, 0.0));
    }
}
