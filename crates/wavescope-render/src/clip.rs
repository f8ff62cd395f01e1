#![forbid(unsafe_code)]

//! Line–rectangle clipping for trace segments.
//!
//! Segments are clipped against the pin's voltage band (top/bottom) and the
//! plot viewport (left/right) by intersecting the two-point line equation
//! with the violated edge. Degenerate inputs (parallel lines, zero-length
//! edges) yield "no intersection" — NaN or infinity never reaches emitted
//! geometry.

use wavescope_core::geometry::{PointF, RectF};

/// Slack, in plot units, for segments that graze a boundary.
///
/// A segment whose endpoints sit within this distance outside an edge is
/// snapped onto the edge instead of discarded; floating-point error at an
/// exact boundary must not drop visible geometry.
pub const CLIP_TOLERANCE: f64 = 5e-5;

/// Intersection of the infinite lines through `(a1, a2)` and `(b1, b2)`.
///
/// `None` for parallel or degenerate (coincident-point) lines. Vertical and
/// horizontal lines are exact: the fixed coordinate passes through
/// untouched.
pub fn cross_point(a1: PointF, a2: PointF, b1: PointF, b2: PointF) -> Option<PointF> {
    let adx = a1.x - a2.x;
    let ady = a1.y - a2.y;
    let bdx = b1.x - b2.x;
    let bdy = b1.y - b2.y;

    let denom = adx * bdy - ady * bdx;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let a_det = a1.x * a2.y - a1.y * a2.x;
    let b_det = b1.x * b2.y - b1.y * b2.x;
    let x = (a_det * bdx - adx * b_det) / denom;
    let y = (a_det * bdy - ady * b_det) / denom;
    if x.is_finite() && y.is_finite() {
        Some(PointF::new(x, y))
    } else {
        None
    }
}

/// Clip a left-to-right trace segment to the voltage band and viewport.
///
/// `band_top`/`band_bottom` are the pin's voltage-band edges; the effective
/// clip band is their intersection with the viewport's vertical extent.
/// Returns the drawable sub-segment, or `None` when nothing remains.
pub fn clip_segment(
    last: PointF,
    curr: PointF,
    band_top: f64,
    band_bottom: f64,
    viewport: RectF,
) -> Option<(PointF, PointF)> {
    let top = band_top.max(viewport.top());
    let bottom = band_bottom.min(viewport.bottom());
    if top > bottom {
        return None;
    }

    let mut last = last;
    let mut curr = curr;

    let top_edge = (
        PointF::new(viewport.left(), top),
        PointF::new(viewport.right(), top),
    );
    let bottom_edge = (
        PointF::new(viewport.left(), bottom),
        PointF::new(viewport.right(), bottom),
    );

    if curr.y < top && last.y < top {
        // Entirely above: keep only boundary-grazing segments.
        if (curr.y - top).abs() > CLIP_TOLERANCE || (last.y - top).abs() > CLIP_TOLERANCE {
            return None;
        }
        curr.y = top;
        last.y = top;
    } else if curr.y > bottom && last.y > bottom {
        if (curr.y - bottom).abs() > CLIP_TOLERANCE || (last.y - bottom).abs() > CLIP_TOLERANCE {
            return None;
        }
        curr.y = bottom;
        last.y = bottom;
    } else if last.y < top && curr.y >= top {
        last = cross_point(top_edge.0, top_edge.1, curr, last)?;
    } else if last.y >= top && curr.y < top {
        curr = cross_point(top_edge.0, top_edge.1, curr, last)?;
    } else if last.y > bottom && curr.y <= bottom {
        last = cross_point(bottom_edge.0, bottom_edge.1, curr, last)?;
    } else if last.y <= bottom && curr.y > bottom {
        curr = cross_point(bottom_edge.0, bottom_edge.1, curr, last)?;
    }

    // Fully left or fully right of the viewport.
    if curr.x <= viewport.left() || last.x >= viewport.right() {
        return None;
    }

    if last.x < viewport.left() {
        let edge = (
            PointF::new(viewport.left(), top),
            PointF::new(viewport.left(), bottom),
        );
        last = cross_point(edge.0, edge.1, last, curr)?;
    } else if curr.x > viewport.right() {
        let edge = (
            PointF::new(viewport.right(), top),
            PointF::new(viewport.right(), bottom),
        );
        curr = cross_point(edge.0, edge.1, last, curr)?;
    }

    Some((last, curr))
}

/// Clamp a rectangle to a bounding region; `None` when fully outside.
pub fn clamp_rect(rect: RectF, bounds: RectF) -> Option<RectF> {
    rect.intersection_opt(&bounds)
}
