#![forbid(unsafe_code)]

//! Retained draw-command lists.
//!
//! A layer paints into a [`DisplayList`]; the host replays the ops of the
//! composited frame against whatever 2D surface it owns. Ops carry final
//! pixel coordinates; no transform state is retained.

use wavescope_core::color::Rgba;
use wavescope_core::geometry::{PointF, RectF};

/// Dash style of a stroked line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DashPattern {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
}

/// Stroke style for lines and outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    pub dash: DashPattern,
}

impl Stroke {
    /// Solid stroke.
    pub const fn solid(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            dash: DashPattern::Solid,
        }
    }

    /// Same stroke with a different dash pattern.
    pub const fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = dash;
        self
    }
}

/// One retained drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        from: PointF,
        to: PointF,
        stroke: Stroke,
    },
    Rect {
        rect: RectF,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Ellipse {
        center: PointF,
        rx: f64,
        ry: f64,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    /// Text anchored at the top-left corner of its box.
    Text {
        origin: PointF,
        text: String,
        size: f64,
        color: Rgba,
    },
}

/// An append-only list of draw ops for one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all ops (the layer repaints from scratch).
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Number of retained ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been painted.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The retained ops, in paint order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Append a raw op.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Append a stroked line segment.
    pub fn line(&mut self, from: PointF, to: PointF, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    /// Append a filled (and optionally outlined) rectangle.
    pub fn rect(&mut self, rect: RectF, fill: Option<Rgba>, stroke: Option<Stroke>) {
        self.ops.push(DrawOp::Rect { rect, fill, stroke });
    }

    /// Append an ellipse.
    pub fn ellipse(
        &mut self,
        center: PointF,
        rx: f64,
        ry: f64,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    ) {
        self.ops.push(DrawOp::Ellipse {
            center,
            rx,
            ry,
            fill,
            stroke,
        });
    }

    /// Append a text run.
    pub fn text(&mut self, origin: PointF, text: impl Into<String>, size: f64, color: Rgba) {
        self.ops.push(DrawOp::Text {
            origin,
            text: text.into(),
            size,
            color,
        });
    }
}
