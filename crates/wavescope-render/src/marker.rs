#![forbid(unsafe_code)]

//! Compare-marker geometry: strobe arrows and window bands.
//!
//! A strobe draws one vertical arrow from the band edge matching the
//! expected state to the referenced voltage level; a window draws two such
//! arrows plus a shaded rectangle spanning its two points. Arrows clip
//! against the plot edges; an arrow whose span leaves the plot entirely is
//! suppressed rather than clamped into nonsense.

use crate::clip::{clamp_rect, cross_point};
use crate::display_list::{DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::{PointF, RectF};
use wavescope_core::sample::{CompareMarker, Expected, Pin};
use wavescope_core::voltage::voltage_to_y;

pub(crate) fn paint_compare(
    ctx: &PaintCtx<'_>,
    list: &mut DisplayList,
    pin: &Pin,
    cycle_idx: usize,
    compare: &CompareMarker,
    band_top: f64,
    band_bottom: f64,
) {
    let range = pin.voltage_range();
    let cycle = ctx.store.cycles().get(cycle_idx).expect("in range");
    let pen = Stroke::solid(ctx.palette.compare_line, ctx.spacing.line_width);

    match *compare {
        CompareMarker::Strobe {
            point,
            expect,
            level,
        } => {
            // A dangling marker index skips the marker, never a fabricated level.
            let Some(volt) = range.level_voltage(level) else {
                return;
            };
            let level_y = voltage_to_y(volt, range, band_top, band_bottom);
            let base = base_point(ctx, cycle.cumulative_points() + point, expect, band_top, band_bottom);
            paint_arrow(ctx, list, base, expect, (base.y - level_y).abs(), pen);
        }
        CompareMarker::Window {
            start,
            end,
            expect,
            level,
        } => {
            let Some(volt) = range.level_voltage(level) else {
                return;
            };
            let level_y = voltage_to_y(volt, range, band_top, band_bottom);
            let from = base_point(ctx, cycle.cumulative_points() + start, expect, band_top, band_bottom);
            let to = base_point(ctx, cycle.cumulative_points() + end, expect, band_top, band_bottom);
            let height = (from.y - level_y).abs();
            paint_arrow(ctx, list, from, expect, height, pen);
            paint_arrow(ctx, list, to, expect, height, pen);

            let top = match expect {
                Expected::High => from.y - height,
                Expected::Low => from.y,
            };
            let window = RectF::new(from.x, top, to.x - from.x, height);
            if let Some(clipped) = clamp_rect(window, ctx.layout.plot) {
                list.rect(clipped, Some(ctx.palette.compare_window), None);
            }
        }
    }
}

/// The arrow's base: the band edge for the expected state at the sample's x.
fn base_point(
    ctx: &PaintCtx<'_>,
    global_point: usize,
    expect: Expected,
    band_top: f64,
    band_bottom: f64,
) -> PointF {
    let x = ctx.sample_x(global_point as f64);
    match expect {
        Expected::High => PointF::new(x, band_bottom),
        Expected::Low => PointF::new(x, band_top),
    }
}

/// One vertical arrow of `height` pixels from `base` toward the level:
/// upward for expected-high, downward for expected-low.
fn paint_arrow(
    ctx: &PaintCtx<'_>,
    list: &mut DisplayList,
    base: PointF,
    expect: Expected,
    height: f64,
    pen: Stroke,
) {
    let plot = ctx.layout.plot;
    let spacing = ctx.spacing;

    let mut base = base;
    let mut tip = match expect {
        Expected::High => base.offset(0.0, -height),
        Expected::Low => base.offset(0.0, height),
    };
    let inner = height * spacing.compare_arrow_scale;
    let half_base = inner / spacing.compare_arrow_angle_deg.to_radians().tan();

    let shaft_visible = tip.x >= plot.left() && tip.x <= plot.right();
    let mut head = true;

    match expect {
        Expected::Low => {
            if tip.y <= plot.top() {
                return;
            }
            if tip.y >= plot.bottom() {
                tip.y = plot.bottom();
                head = false;
            }
            if base.y < plot.top() {
                base.y = plot.top();
            }
        }
        Expected::High => {
            if tip.y < plot.top() {
                tip.y = plot.top();
                head = false;
            }
            if tip.y >= plot.bottom() || base.y <= plot.top() {
                return;
            }
            if base.y >= plot.bottom() {
                base.y = plot.bottom();
            }
        }
    }

    if shaft_visible {
        list.line(base, tip, pen);
    }
    if !head {
        return;
    }

    let back = match expect {
        Expected::High => inner,
        Expected::Low => -inner,
    };
    let left_leg = tip.offset(-half_base, back);
    let right_leg = tip.offset(half_base, back);
    paint_leg(list, plot, tip, left_leg, pen);
    paint_leg(list, plot, tip, right_leg, pen);
}

/// Draw one head leg, clipped against the plot's vertical edges.
fn paint_leg(list: &mut DisplayList, plot: RectF, tip: PointF, end: PointF, pen: Stroke) {
    let in_x = |x: f64| x >= plot.left() && x <= plot.right();
    if in_x(tip.x) && in_x(end.x) {
        list.line(tip, end, pen);
        return;
    }

    let edge_x = if tip.x.min(end.x) < plot.left() {
        plot.left()
    } else {
        plot.right()
    };
    let edge = (
        PointF::new(edge_x, plot.top()),
        PointF::new(edge_x, plot.bottom()),
    );
    if let Some(cut) = cross_point(edge.0, edge.1, tip, end) {
        let visible_end = if in_x(tip.x) { tip } else { end };
        if in_x(visible_end.x) {
            list.line(cut, visible_end, pen);
        }
    }
}
