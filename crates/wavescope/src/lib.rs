#![forbid(unsafe_code)]

//! wavescope: a waveform timing-diagram engine.
//!
//! Renders large multi-pin sample records (ATE/oscilloscope style) into
//! retained draw-command frames with pan, zoom, pass/fail markers,
//! voltage-level annotations, compare arrows, and movable timing cursors —
//! and maps pixels back to logical sample positions for interaction.
//!
//! ```
//! use wavescope::{
//!     ChangeKind, Cycle, CycleSet, Line, Pin, VoltageRange, WaveformView,
//! };
//!
//! let cycles = CycleSet::new(vec![
//!     Cycle::new(0, 10).unwrap(),
//!     Cycle::new(16, 20).unwrap(),
//! ]);
//! let range = VoltageRange::new(3.3, 0.0).unwrap();
//! let pins = vec![Pin::new("CLK", range, 1, &cycles)];
//!
//! let mut view = WaveformView::new();
//! view.set_viewport_size(800.0, 600.0);
//! view.set_samples(cycles, pins, vec![Line::new("probe")]);
//! let frame = view.render(ChangeKind::Full);
//! assert!(frame.ops().count() > 0);
//! ```

use std::fmt;

mod view;

// --- Core re-exports -------------------------------------------------------

pub use wavescope_core::color::Rgba;
pub use wavescope_core::cursor::{CursorPosition, CursorSet, TimingCursor};
pub use wavescope_core::error::DataError;
pub use wavescope_core::geometry::{PointF, RectF};
pub use wavescope_core::sample::{
    CompareMarker, Cycle, CycleSet, Expected, Line, Pin, SampleBlock, SampleStore,
};
pub use wavescope_core::text::{MonoMeasurer, TextExtent, TextMeasurer};
pub use wavescope_core::units::{TimeUnit, UnitFormat, VoltUnit};
pub use wavescope_core::voltage::{LevelRef, VoltageLevelMarker, VoltageRange};

// --- Render re-exports -----------------------------------------------------

pub use wavescope_render::display_list::{DashPattern, DisplayList, DrawOp, Stroke};
pub use wavescope_render::layers::{ChangeKind, Frame, LayerId, LayerMask};
pub use wavescope_render::layout::{ContentMetrics, LayoutGeometry, Spacing};
pub use wavescope_render::style::Palette;

// --- Engine ----------------------------------------------------------------

pub use view::{HitInfo, QueryError, WaveformView, ZoomDirection};

// --- Errors ----------------------------------------------------------------

/// Top-level error type for wavescope callers.
#[derive(Debug)]
pub enum Error {
    /// Sample-store invariant violation.
    Data(DataError),
    /// Interaction query failure.
    Query(QueryError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<DataError> for Error {
    fn from(err: DataError) -> Self {
        Self::Data(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

/// Standard result type for wavescope APIs.
pub type Result<T> = std::result::Result<T, Error>;

pub use wavescope_core as core;
pub use wavescope_render as render;
