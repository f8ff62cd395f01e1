#![forbid(unsafe_code)]

//! Timing cursors: named, draggable vertical markers bound to sample
//! positions, used for time-delta measurement.

/// A resolved cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPosition {
    pub cycle: usize,
    pub point: usize,
    /// Seconds: `(cumulative_points + point) * timing_resolution`.
    pub time: f64,
}

/// A named timing cursor.
///
/// A freshly added cursor has no position until the first pointer move
/// resolves one; it is born `moving` and pinned on release.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingCursor {
    name: String,
    position: Option<CursorPosition>,
    moving: bool,
}

impl TimingCursor {
    /// Create an unresolved, moving cursor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            moving: true,
        }
    }

    /// Unique cursor name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved position, `None` until the first drag update.
    #[inline]
    pub fn position(&self) -> Option<CursorPosition> {
        self.position
    }

    /// Pin the cursor to a sample position.
    pub fn set_position(&mut self, position: CursorPosition) {
        self.position = Some(position);
    }

    /// Whether the cursor is being dragged.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Enter the drag state.
    pub fn begin_move(&mut self) {
        self.moving = true;
    }

    /// Leave the drag state (pointer released).
    pub fn end_move(&mut self) {
        self.moving = false;
    }
}

/// The cursor list plus the designated measurement pair.
///
/// Lifecycle rules (at most one cursor `moving`, unique names, auto-name
/// allocation) live here; the engine translates rejections into query
/// errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorSet {
    cursors: Vec<TimingCursor>,
    measurement: Option<(String, String)>,
}

impl CursorSet {
    /// Number of cursors.
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// True when no cursors exist.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Iterate cursors in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &TimingCursor> {
        self.cursors.iter()
    }

    /// True while some cursor is being dragged.
    pub fn any_moving(&self) -> bool {
        self.cursors.iter().any(TimingCursor::is_moving)
    }

    /// The cursor currently being dragged, if any.
    pub fn moving_mut(&mut self) -> Option<&mut TimingCursor> {
        self.cursors.iter_mut().find(|c| c.is_moving())
    }

    /// Whether a cursor with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.cursors.iter().any(|c| c.name() == name)
    }

    /// Cursor by name.
    pub fn get(&self, name: &str) -> Option<&TimingCursor> {
        self.cursors.iter().find(|c| c.name() == name)
    }

    /// Mutable cursor by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TimingCursor> {
        self.cursors.iter_mut().find(|c| c.name() == name)
    }

    /// Cursor occupying an exact (cycle, point) position.
    pub fn find_at(&self, cycle: usize, point: usize) -> Option<&TimingCursor> {
        self.cursors.iter().find(|c| {
            c.position()
                .is_some_and(|p| p.cycle == cycle && p.point == point)
        })
    }

    /// Next auto-name: `X{n}` with n one past the largest numeric suffix in
    /// use. Removed names are never reused.
    pub fn auto_name(&self) -> String {
        let next = self
            .cursors
            .iter()
            .filter_map(|c| c.name().strip_prefix('X'))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);
        format!("X{next}")
    }

    /// Add a cursor (callers enforce the single-moving rule first).
    pub fn push(&mut self, cursor: TimingCursor) {
        self.cursors.push(cursor);
    }

    /// Remove a cursor by name; true when one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.cursors.len();
        self.cursors.retain(|c| c.name() != name);
        self.cursors.len() != before
    }

    /// Drop every cursor and the measurement pair.
    pub fn clear(&mut self) {
        self.cursors.clear();
        self.measurement = None;
    }

    /// The delta-measurement cursor pair, if designated.
    pub fn measurement(&self) -> Option<(&str, &str)> {
        self.measurement
            .as_ref()
            .map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Designate (or clear) the measurement pair.
    pub fn set_measurement(&mut self, pair: Option<(String, String)>) {
        self.measurement = pair;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned(name: &str, cycle: usize, point: usize) -> TimingCursor {
        let mut c = TimingCursor::new(name);
        c.set_position(CursorPosition {
            cycle,
            point,
            time: 0.0,
        });
        c.end_move();
        c
    }

    #[test]
    fn auto_name_starts_at_zero() {
        let set = CursorSet::default();
        assert_eq!(set.auto_name(), "X0");
    }

    #[test]
    fn auto_name_is_max_plus_one_without_reuse() {
        let mut set = CursorSet::default();
        set.push(pinned("X0", 0, 0));
        assert_eq!(set.auto_name(), "X1");
        set.push(pinned("X1", 0, 1));
        assert!(set.remove("X0"));
        // The freed suffix is not reused.
        assert_eq!(set.auto_name(), "X2");
    }

    #[test]
    fn auto_name_ignores_foreign_names() {
        let mut set = CursorSet::default();
        set.push(pinned("trigger", 0, 0));
        set.push(pinned("X9", 0, 1));
        set.push(pinned("Xabc", 0, 2));
        assert_eq!(set.auto_name(), "X10");
    }

    #[test]
    fn new_cursor_is_moving_and_unresolved() {
        let c = TimingCursor::new("X0");
        assert!(c.is_moving());
        assert_eq!(c.position(), None);
    }

    #[test]
    fn find_at_matches_exact_position_only() {
        let mut set = CursorSet::default();
        set.push(pinned("X0", 2, 7));
        assert_eq!(set.find_at(2, 7).map(TimingCursor::name), Some("X0"));
        assert!(set.find_at(2, 8).is_none());
        assert!(set.find_at(1, 7).is_none());
    }

    #[test]
    fn moving_mut_finds_the_dragged_cursor() {
        let mut set = CursorSet::default();
        set.push(pinned("X0", 0, 0));
        set.push(TimingCursor::new("X1"));
        assert!(set.any_moving());
        assert_eq!(set.moving_mut().unwrap().name(), "X1");
    }
}
