#![forbid(unsafe_code)]

//! The sample store: cycles, pins, lines, and per-cycle sample blocks.
//!
//! A record is a sequence of [`Cycle`]s (variable point counts) sampled on
//! many [`Pin`]s; each pin carries one or more [`Line`]s (traces) and one
//! [`SampleBlock`] per (line, cycle) pair. The store is read-mostly: the
//! caller builds it once and hands it to the engine, which derives all pixel
//! geometry from it.

use crate::color::Rgba;
use crate::error::DataError;
use crate::voltage::{LevelRef, VoltageRange};

/// A contiguous run of samples sharing one pattern offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    offset: u64,
    point_count: usize,
    is_fail: bool,
    index: usize,
    cumulative_points: usize,
}

impl Cycle {
    /// Create a cycle; fails when `point_count` is zero.
    ///
    /// `index` and `cumulative_points` are assigned when the cycle joins a
    /// [`CycleSet`].
    pub fn new(offset: u64, point_count: usize) -> Result<Self, DataError> {
        if point_count == 0 {
            return Err(DataError::ZeroPointCount { offset });
        }
        Ok(Self {
            offset,
            point_count,
            is_fail: false,
            index: 0,
            cumulative_points: 0,
        })
    }

    /// Caller-defined pattern offset.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of sample points in this cycle (> 0).
    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Whether the whole cycle is flagged failing.
    #[inline]
    pub fn is_fail(&self) -> bool {
        self.is_fail
    }

    /// Flag the cycle as failing (drives the error-band fail circle).
    pub fn set_fail(&mut self, fail: bool) {
        self.is_fail = fail;
    }

    /// 0-based sequence position within the set.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sum of the point counts of all prior cycles.
    #[inline]
    pub fn cumulative_points(&self) -> usize {
        self.cumulative_points
    }

    /// First sample index past this cycle.
    #[inline]
    pub fn end_point(&self) -> usize {
        self.cumulative_points + self.point_count
    }
}

/// An ordered cycle sequence with derived cumulative point sums.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSet {
    cycles: Vec<Cycle>,
    total_points: usize,
}

impl CycleSet {
    /// Build a set, assigning `index` and `cumulative_points` in order.
    pub fn new(mut cycles: Vec<Cycle>) -> Self {
        let mut sum = 0;
        for (idx, cycle) in cycles.iter_mut().enumerate() {
            cycle.index = idx;
            cycle.cumulative_points = sum;
            sum += cycle.point_count;
        }
        Self {
            cycles,
            total_points: sum,
        }
    }

    /// Number of cycles.
    #[inline]
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// True when the set holds no cycles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Total sample points across all cycles.
    #[inline]
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Cycle by sequence index.
    pub fn get(&self, index: usize) -> Option<&Cycle> {
        self.cycles.get(index)
    }

    /// Mutable cycle access (point counts are fixed; only flags mutate).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cycle> {
        self.cycles.get_mut(index)
    }

    /// Last cycle of the set.
    pub fn last(&self) -> Option<&Cycle> {
        self.cycles.last()
    }

    /// Iterate the cycles in order.
    pub fn iter(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles.iter()
    }

    /// Find the cycle owning a linear sample index.
    ///
    /// Binary search over the `[cumulative_points, end_point)` spans;
    /// `None` for indexes outside `[0, total_points)`.
    pub fn cycle_at_point(&self, point_index: i64) -> Option<usize> {
        if point_index < 0 {
            return None;
        }
        let point = point_index as usize;
        let mut lo = 0usize;
        let mut hi = self.cycles.len().checked_sub(1)?;
        while lo <= hi {
            let mid = (lo + hi) / 2;
            let cycle = &self.cycles[mid];
            if cycle.end_point() <= point {
                lo = mid + 1;
            } else if cycle.cumulative_points > point {
                hi = mid.checked_sub(1)?;
            } else {
                return Some(mid);
            }
        }
        None
    }

    /// Find a cycle by its pattern offset (first match).
    pub fn find_offset(&self, offset: u64) -> Option<usize> {
        self.cycles.iter().position(|c| c.offset == offset)
    }

    /// Inclusive range of cycle indexes whose pixel spans overlap the
    /// viewport `[scroll_x, scroll_x + viewport_w]`.
    ///
    /// The left edge is resolved by index search; a right edge past the last
    /// cycle extends the range to the last index. `None` when nothing
    /// overlaps (no cycles, the viewport is degenerate, or the scroll sits
    /// beyond the record).
    pub fn visible_cycles(
        &self,
        scroll_x: f64,
        viewport_w: f64,
        px_per_sample: f64,
    ) -> Option<(usize, usize)> {
        if self.cycles.is_empty() || px_per_sample <= 0.0 || viewport_w <= 0.0 {
            return None;
        }
        let first_point = (scroll_x / px_per_sample).floor() as i64;
        let first = self.cycle_at_point(first_point.max(0))?;
        let last_point = ((scroll_x + viewport_w) / px_per_sample).floor() as i64;
        let last = self
            .cycle_at_point(last_point)
            .unwrap_or(self.cycles.len() - 1);
        Some((first, last))
    }
}

/// Inclusive range of pin rows intersecting the viewport.
///
/// Pins are uniform height, so this is plain integer division (no search),
/// clamped to `[0, pin_count - 1]`; `None` when the scroll position exceeds
/// the content.
pub fn visible_rows(
    scroll_y: f64,
    viewport_h: f64,
    row_height: f64,
    pin_count: usize,
) -> Option<(usize, usize)> {
    if pin_count == 0 || row_height <= 0.0 || viewport_h <= 0.0 {
        return None;
    }
    let first = (scroll_y / row_height).floor().max(0.0) as usize;
    if first >= pin_count {
        return None;
    }
    let last = ((scroll_y + viewport_h) / row_height).floor() as usize;
    Some((first, last.min(pin_count - 1)))
}

/// Expected comparison state at a compare point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    High,
    Low,
}

/// A pass/fail comparison annotation inside one sample block.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareMarker {
    /// Single-point comparison: one arrow at `point`.
    Strobe {
        point: usize,
        expect: Expected,
        level: LevelRef,
    },
    /// Windowed comparison: arrows at `start`/`end` plus a shaded band.
    Window {
        start: usize,
        end: usize,
        expect: Expected,
        level: LevelRef,
    },
}

/// One cycle's samples for one (pin, line) pair.
///
/// Values start as NaN ("undefined / don't-care") and are filled in by the
/// caller; out-of-range writes are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    values: Vec<f64>,
    is_fail: bool,
    top_label: Option<String>,
    compares: Vec<CompareMarker>,
}

impl SampleBlock {
    /// Create an all-NaN block for a cycle with `point_count` samples.
    pub fn new(point_count: usize) -> Self {
        Self {
            values: vec![f64::NAN; point_count],
            is_fail: false,
            top_label: None,
            compares: Vec::new(),
        }
    }

    /// Number of samples in the block.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.values.len()
    }

    /// Voltage at a point index.
    pub fn value(&self, point: usize) -> Option<f64> {
        self.values.get(point).copied()
    }

    /// All sample values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Set one sample; writes past the block length are ignored.
    pub fn set_value(&mut self, point: usize, volt: f64) {
        if let Some(slot) = self.values.get_mut(point) {
            *slot = volt;
        }
    }

    /// Fill the block from a slice (excess input is ignored).
    pub fn fill(&mut self, volts: &[f64]) {
        let n = self.values.len().min(volts.len());
        self.values[..n].copy_from_slice(&volts[..n]);
    }

    /// Whether this block failed comparison.
    #[inline]
    pub fn is_fail(&self) -> bool {
        self.is_fail
    }

    /// Flag the block as failing.
    pub fn set_fail(&mut self, fail: bool) {
        self.is_fail = fail;
    }

    /// Label drawn at the top of the cycle for this pin.
    pub fn top_label(&self) -> Option<&str> {
        self.top_label.as_deref()
    }

    /// Set the cycle top label.
    pub fn set_top_label(&mut self, label: Option<String>) {
        self.top_label = label;
    }

    /// Compare annotations attached to this block.
    pub fn compares(&self) -> &[CompareMarker] {
        &self.compares
    }

    /// Attach a compare annotation.
    pub fn push_compare(&mut self, marker: CompareMarker) {
        self.compares.push(marker);
    }
}

/// Style of one trace drawn inside every pin row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub thickness: f64,
    /// `None` falls back to the palette's default trace color.
    pub color: Option<Rgba>,
    pub show: bool,
}

impl Line {
    /// Create a visible line with default thickness.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thickness: 1.0,
            color: None,
            show: true,
        }
    }

    /// Set an explicit trace color.
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the stroke thickness.
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }
}

/// A logical channel: one voltage range plus a (line x cycle) block matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    name: String,
    top_label: Option<String>,
    pub show: bool,
    /// Order among visible pins; ties resolve by declaration order.
    pub display_index: usize,
    voltage_range: VoltageRange,
    /// Indexed `[line][cycle]`.
    blocks: Vec<Vec<SampleBlock>>,
}

impl Pin {
    /// Create a pin with all-NaN blocks sized to the cycle set.
    pub fn new(
        name: impl Into<String>,
        voltage_range: VoltageRange,
        line_count: usize,
        cycles: &CycleSet,
    ) -> Self {
        let blocks = (0..line_count)
            .map(|_| {
                cycles
                    .iter()
                    .map(|c| SampleBlock::new(c.point_count()))
                    .collect()
            })
            .collect();
        Self {
            name: name.into(),
            top_label: None,
            show: true,
            display_index: 0,
            voltage_range,
            blocks,
        }
    }

    /// Set the pin-header label.
    pub fn with_top_label(mut self, label: impl Into<String>) -> Self {
        self.top_label = Some(label.into());
        self
    }

    /// Pin name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label drawn in the pin-header box, if any.
    pub fn top_label(&self) -> Option<&str> {
        self.top_label.as_deref()
    }

    /// This pin's voltage scale.
    #[inline]
    pub fn voltage_range(&self) -> &VoltageRange {
        &self.voltage_range
    }

    /// Mutable voltage scale (mutations re-assert `max > min`).
    pub fn voltage_range_mut(&mut self) -> &mut VoltageRange {
        &mut self.voltage_range
    }

    /// Number of lines this pin carries.
    pub fn line_count(&self) -> usize {
        self.blocks.len()
    }

    /// Sample block for a (line, cycle) pair.
    pub fn block(&self, line: usize, cycle: usize) -> Option<&SampleBlock> {
        self.blocks.get(line)?.get(cycle)
    }

    /// Mutable sample block access.
    pub fn block_mut(&mut self, line: usize, cycle: usize) -> Option<&mut SampleBlock> {
        self.blocks.get_mut(line)?.get_mut(cycle)
    }

    /// True when any owned block reports fail (pin-header fail dot).
    pub fn has_fail(&self) -> bool {
        self.blocks
            .iter()
            .any(|line| line.iter().any(SampleBlock::is_fail))
    }

    /// True when any line's block for `cycle` reports fail.
    ///
    /// This is the navigation predicate: the cycle-level flag only draws
    /// the error-band circle.
    pub fn cycle_has_fail(&self, cycle: usize) -> bool {
        self.blocks
            .iter()
            .any(|line| line.get(cycle).is_some_and(SampleBlock::is_fail))
    }

    /// First top label defined for `cycle` across this pin's lines.
    pub fn cycle_top_label(&self, cycle: usize) -> Option<&str> {
        self.blocks
            .iter()
            .find_map(|line| line.get(cycle).and_then(SampleBlock::top_label))
    }
}

/// The complete read-mostly record handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStore {
    cycles: CycleSet,
    pins: Vec<Pin>,
    lines: Vec<Line>,
}

impl SampleStore {
    /// Assemble a store; pin `display_index` defaults to declaration order
    /// when every pin still carries the default value.
    pub fn new(cycles: CycleSet, mut pins: Vec<Pin>, lines: Vec<Line>) -> Self {
        if pins.iter().all(|p| p.display_index == 0) {
            for (idx, pin) in pins.iter_mut().enumerate() {
                pin.display_index = idx;
            }
        }
        Self {
            cycles,
            pins,
            lines,
        }
    }

    /// The cycle sequence.
    #[inline]
    pub fn cycles(&self) -> &CycleSet {
        &self.cycles
    }

    /// Mutable cycle access.
    pub fn cycles_mut(&mut self) -> &mut CycleSet {
        &mut self.cycles
    }

    /// All pins, in declaration order.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Mutable pin access.
    pub fn pins_mut(&mut self) -> &mut [Pin] {
        &mut self.pins
    }

    /// Pin by declaration index.
    pub fn pin(&self, index: usize) -> Option<&Pin> {
        self.pins.get(index)
    }

    /// The line styles, shared by every pin.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable line-style access.
    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Declaration index of a pin by name.
    pub fn find_pin(&self, name: &str) -> Option<usize> {
        self.pins.iter().position(|p| p.name() == name)
    }

    /// Declaration indexes of shown pins, ordered by `display_index`.
    pub fn visible_pins(&self) -> Vec<usize> {
        let mut shown: Vec<usize> = (0..self.pins.len()).filter(|&i| self.pins[i].show).collect();
        shown.sort_by_key(|&i| self.pins[i].display_index);
        shown
    }

    /// Number of shown pins.
    pub fn visible_pin_count(&self) -> usize {
        self.pins.iter().filter(|p| p.show).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cycles(counts: &[usize]) -> CycleSet {
        CycleSet::new(
            counts
                .iter()
                .enumerate()
                .map(|(i, &n)| Cycle::new(i as u64 * 16, n).unwrap())
                .collect(),
        )
    }

    #[test]
    fn zero_point_count_is_rejected() {
        assert_eq!(
            Cycle::new(7, 0),
            Err(DataError::ZeroPointCount { offset: 7 })
        );
    }

    #[test]
    fn cumulative_points_accumulate() {
        let set = cycles(&[10, 20, 5]);
        let sums: Vec<usize> = set.iter().map(Cycle::cumulative_points).collect();
        assert_eq!(sums, vec![0, 10, 30]);
        assert_eq!(set.total_points(), 35);
    }

    #[test]
    fn cycle_at_point_spec_scenario() {
        let set = cycles(&[10, 20, 5]);
        assert_eq!(set.cycle_at_point(0), Some(0));
        assert_eq!(set.cycle_at_point(9), Some(0));
        assert_eq!(set.cycle_at_point(10), Some(1));
        assert_eq!(set.cycle_at_point(25), Some(1));
        assert_eq!(set.cycle_at_point(30), Some(2));
        assert_eq!(set.cycle_at_point(34), Some(2));
        assert_eq!(set.cycle_at_point(35), None);
        assert_eq!(set.cycle_at_point(-1), None);
    }

    #[test]
    fn cycle_at_point_empty_set() {
        let set = CycleSet::default();
        assert_eq!(set.cycle_at_point(0), None);
    }

    #[test]
    fn find_offset_resolves_first_match() {
        let set = cycles(&[4, 4, 4]);
        assert_eq!(set.find_offset(16), Some(1));
        assert_eq!(set.find_offset(3), None);
    }

    #[test]
    fn visible_cycles_overlap() {
        // 3 cycles x 10 points at 2 px/sample: spans [0,20), [20,60), [60,70).
        let set = cycles(&[10, 20, 5]);
        assert_eq!(set.visible_cycles(0.0, 19.0, 2.0), Some((0, 0)));
        assert_eq!(set.visible_cycles(0.0, 40.0, 2.0), Some((0, 1)));
        assert_eq!(set.visible_cycles(25.0, 10.0, 2.0), Some((1, 1)));
        // Right edge past the record extends to the last cycle.
        assert_eq!(set.visible_cycles(25.0, 500.0, 2.0), Some((1, 2)));
        // Left edge past the record: empty.
        assert_eq!(set.visible_cycles(71.0, 10.0, 2.0), None);
    }

    #[test]
    fn visible_rows_clamps_and_empties() {
        assert_eq!(visible_rows(0.0, 100.0, 40.0, 5), Some((0, 2)));
        assert_eq!(visible_rows(90.0, 100.0, 40.0, 5), Some((2, 4)));
        assert_eq!(visible_rows(300.0, 100.0, 40.0, 5), None);
        assert_eq!(visible_rows(0.0, 100.0, 40.0, 0), None);
    }

    #[test]
    fn sample_block_starts_undefined() {
        let block = SampleBlock::new(4);
        assert!(block.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sample_block_ignores_out_of_range_writes() {
        let mut block = SampleBlock::new(2);
        block.set_value(5, 1.0);
        assert!(block.value(0).unwrap().is_nan());
        assert_eq!(block.value(5), None);
    }

    #[test]
    fn pin_fail_flags_derive_from_blocks() {
        let set = cycles(&[4, 4]);
        let range = VoltageRange::new(3.3, 0.0).unwrap();
        let mut pin = Pin::new("CLK", range, 2, &set);
        assert!(!pin.has_fail());
        pin.block_mut(1, 0).unwrap().set_fail(true);
        assert!(pin.has_fail());
        assert!(pin.cycle_has_fail(0));
        assert!(!pin.cycle_has_fail(1));
    }

    #[test]
    fn visible_pins_order_by_display_index() {
        let set = cycles(&[4]);
        let range = || VoltageRange::new(1.0, 0.0).unwrap();
        let mut a = Pin::new("A", range(), 1, &set);
        let mut b = Pin::new("B", range(), 1, &set);
        let mut c = Pin::new("C", range(), 1, &set);
        a.display_index = 2;
        b.display_index = 0;
        c.display_index = 1;
        c.show = false;
        let store = SampleStore::new(set, vec![a, b, c], vec![Line::new("v")]);
        assert_eq!(store.visible_pins(), vec![1, 0]);
        assert_eq!(store.visible_pin_count(), 2);
    }

    proptest! {
        #[test]
        fn cycle_at_point_finds_unique_owner(
            counts in proptest::collection::vec(1usize..50, 1..40),
            probe in 0usize..2000,
        ) {
            let set = cycles(&counts);
            let total = set.total_points();
            match set.cycle_at_point(probe as i64) {
                Some(idx) => {
                    let cycle = set.get(idx).unwrap();
                    prop_assert!(cycle.cumulative_points() <= probe);
                    prop_assert!(probe < cycle.end_point());
                    // No other cycle owns the same point.
                    for (other, c) in set.iter().enumerate() {
                        if other != idx {
                            prop_assert!(
                                probe < c.cumulative_points() || probe >= c.end_point()
                            );
                        }
                    }
                }
                None => prop_assert!(probe >= total),
            }
        }

        #[test]
        fn visible_cycles_only_returns_overlapping_spans(
            counts in proptest::collection::vec(1usize..30, 1..20),
            scroll in 0.0f64..500.0,
            width in 1.0f64..300.0,
        ) {
            let pps = 2.0;
            let set = cycles(&counts);
            if let Some((first, last)) = set.visible_cycles(scroll, width, pps) {
                prop_assert!(first <= last);
                for idx in first..=last {
                    let c = set.get(idx).unwrap();
                    let span_left = c.cumulative_points() as f64 * pps;
                    let span_right = c.end_point() as f64 * pps;
                    prop_assert!(span_right >= scroll && span_left <= scroll + width);
                }
            }
        }
    }
}
