#![forbid(unsafe_code)]

//! Grid layer: cycle separators, offset/index and time labels, fail circles,
//! and the ignored-last-point shading.

use crate::clip::clamp_rect;
use crate::display_list::{DashPattern, DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::{PointF, RectF};

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let Some((first, last)) = ctx.visible_cycles() else {
        return;
    };
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let palette = ctx.palette;
    let plot = layout.plot;
    let cycles = ctx.store.cycles();

    let dash_pen =
        Stroke::solid(palette.frame_line, spacing.line_width).with_dash(DashPattern::Dash);
    let radius = spacing.fail_circle_radius;
    let band_y = plot.top() - radius;

    // Labels never overwrite each other; the running right edge of the last
    // drawn label gates the next one.
    let mut label_gate = plot.left();

    for idx in first..=last {
        let cycle = cycles.get(idx).expect("visible range is in bounds");
        let mid = (cycle.cumulative_points() + cycle.end_point()) as f64 / 2.0;
        let mid_x = ctx.sample_x(mid);
        let right_x = ctx.sample_x(cycle.end_point() as f64);

        // [offset,index] label centered on the cycle.
        if mid_x > plot.left() && mid_x < plot.right() {
            let text = format!("[{},{}]", cycle.offset(), cycle.index());
            let extent = ctx.text_extent(&text, spacing.time_text_size);
            let tx = mid_x - extent.width / 2.0;
            let ty = plot.bottom() + (spacing.time_band_height - extent.height) / 2.0;
            if tx > label_gate && tx + extent.width < plot.right() {
                list.text(PointF::new(tx, ty), text, spacing.time_text_size, palette.timing_text);
                label_gate = mid_x + extent.width / 2.0;
            }
        }

        // Dashed separator and cumulative-time label at the cycle's right edge.
        if right_x > plot.left() && right_x < plot.right() {
            list.line(
                PointF::new(right_x, plot.top()),
                PointF::new(right_x, plot.bottom()),
                dash_pen,
            );
            let text = ctx.units.time(ctx.time_of(cycle.end_point()));
            let extent = ctx.text_extent(&text, spacing.time_text_size);
            let tx = right_x - extent.width / 2.0;
            let ty = plot.bottom() + (spacing.time_band_height - extent.height) / 2.0;
            if tx > label_gate && tx + extent.width < plot.right() {
                list.text(PointF::new(tx, ty), text, spacing.time_text_size, palette.timing_text);
                label_gate = right_x + extent.width / 2.0;
            }
        }

        // Fail circle centered over the cycle in the error band.
        if cycle.is_fail()
            && mid_x - radius > plot.left()
            && mid_x < plot.right() - radius
        {
            list.ellipse(
                PointF::new(mid_x, band_y),
                radius,
                radius,
                Some(palette.fail_circle),
                None,
            );
        }

        // The record's final sample column is never compared; shade it.
        if idx == cycles.len() - 1 {
            let shade = RectF::new(
                ctx.sample_x(cycles.total_points() as f64) - layout.px_per_sample,
                plot.top(),
                layout.px_per_sample,
                plot.height,
            );
            if let Some(clipped) = clamp_rect(shade, plot) {
                list.rect(clipped, Some(palette.ignored_last_point), None);
            }
        }
    }

    paint_edge_indicators(ctx, list, first, last);
}

/// Outlined circles pinned at the error band's corners when failing cycles
/// exist off-screen in that direction.
fn paint_edge_indicators(ctx: &PaintCtx<'_>, list: &mut DisplayList, first: usize, last: usize) {
    let layout = ctx.layout;
    let plot = layout.plot;
    let palette = ctx.palette;
    let radius = ctx.spacing.fail_circle_radius;
    let cycles = ctx.store.cycles();
    let pen = Stroke::solid(palette.fail_circle, ctx.spacing.line_width);

    let content_mid = |idx: usize| -> f64 {
        let c = cycles.get(idx).expect("index is in bounds");
        (c.cumulative_points() + c.end_point()) as f64 / 2.0 * layout.px_per_sample
    };

    let first_cycle = cycles.get(first).expect("visible range is in bounds");
    let first_half_hidden =
        first_cycle.is_fail() && ctx.scroll_x >= content_mid(first) - radius;
    let fail_before = first_half_hidden || cycles.iter().take(first).any(|c| c.is_fail());
    if fail_before {
        list.ellipse(
            PointF::new(plot.left() + radius, plot.top() - radius),
            radius,
            radius,
            None,
            Some(pen),
        );
    }

    let last_cycle = cycles.get(last).expect("visible range is in bounds");
    let last_half_hidden = last_cycle.is_fail()
        && ctx.scroll_x + plot.width <= content_mid(last) + radius;
    let fail_after =
        last_half_hidden || cycles.iter().skip(last + 1).any(|c| c.is_fail());
    if fail_after {
        list.ellipse(
            PointF::new(plot.right() - radius, plot.top() - radius),
            radius,
            radius,
            None,
            Some(pen),
        );
    }
}
