#![forbid(unsafe_code)]

//! Traces layer: the waveform rasterizer.
//!
//! Walks every visible pin × visible cycle × shown line × sample point,
//! mapping samples to pixels and emitting clipped segments. A NaN sample
//! holds the previous Y (flat continuation) drawn dashed with a "!" glyph;
//! a sample outside the pin's voltage band clips against the band/viewport
//! via [`crate::clip`].

use smallvec::SmallVec;

use crate::clip::{clamp_rect, clip_segment};
use crate::display_list::{DashPattern, DisplayList, Stroke};
use crate::layers::PaintCtx;
use crate::marker;
use wavescope_core::geometry::{PointF, RectF};
use wavescope_core::sample::Pin;
use wavescope_core::voltage::voltage_to_y;

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let Some((first_row, last_row)) = ctx.visible_rows() else {
        return;
    };
    let Some((first_cycle, last_cycle)) = ctx.visible_cycles() else {
        return;
    };

    for row in first_row..=last_row {
        let pin = &ctx.store.pins()[ctx.visible_pins[row]];
        let row_top = ctx.row_top(row);
        paint_fail_shading(ctx, list, pin, row_top, first_cycle, last_cycle);
        paint_lines(ctx, list, pin, row_top, first_cycle, last_cycle);
        paint_cycle_labels(ctx, list, pin, row_top, first_cycle, last_cycle);
        let (band_top, band_bottom) = ctx.layout.volt_band(row_top, ctx.spacing);
        for line_idx in 0..pin.line_count() {
            for cycle_idx in first_cycle..=last_cycle {
                if let Some(block) = pin.block(line_idx, cycle_idx) {
                    for compare in block.compares() {
                        marker::paint_compare(
                            ctx, list, pin, cycle_idx, compare, band_top, band_bottom,
                        );
                    }
                }
            }
        }
    }
}

/// Semi-transparent shading behind failing (pin, cycle) blocks.
fn paint_fail_shading(
    ctx: &PaintCtx<'_>,
    list: &mut DisplayList,
    pin: &Pin,
    row_top: f64,
    first_cycle: usize,
    last_cycle: usize,
) {
    let layout = ctx.layout;
    for cycle_idx in first_cycle..=last_cycle {
        if !pin.cycle_has_fail(cycle_idx) {
            continue;
        }
        let cycle = ctx.store.cycles().get(cycle_idx).expect("in range");
        let shade = RectF::new(
            ctx.sample_x(cycle.cumulative_points() as f64),
            row_top,
            cycle.point_count() as f64 * layout.px_per_sample,
            layout.row_height,
        );
        if let Some(clipped) = clamp_rect(shade, layout.plot) {
            list.rect(clipped, Some(ctx.palette.fail_cycle), None);
        }
    }
}

fn paint_lines(
    ctx: &PaintCtx<'_>,
    list: &mut DisplayList,
    pin: &Pin,
    row_top: f64,
    first_cycle: usize,
    last_cycle: usize,
) {
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let plot = layout.plot;
    let range = pin.voltage_range();
    let (band_top, band_bottom) = layout.volt_band(row_top, spacing);

    let nan_pen =
        Stroke::solid(ctx.palette.nan_trace, spacing.line_width).with_dash(DashPattern::Dash);
    let glyph = ctx.text_extent("!", spacing.nan_glyph_text_size);

    let strokes: SmallVec<[Stroke; 4]> = ctx
        .store
        .lines()
        .iter()
        .map(|line| Stroke::solid(ctx.palette.line_color(line), line.thickness))
        .collect();

    let inside = |p: PointF| -> bool {
        p.x >= plot.left()
            && p.x <= plot.right()
            && p.y >= plot.top()
            && p.y <= plot.bottom()
            && p.y >= band_top
            && p.y <= band_bottom
    };

    for (line_idx, line) in ctx.store.lines().iter().enumerate() {
        if !line.show || line_idx >= pin.line_count() {
            continue;
        }
        let stroke = strokes[line_idx];
        let mut last: Option<PointF> = None;

        for cycle_idx in first_cycle..=last_cycle {
            let Some(block) = pin.block(line_idx, cycle_idx) else {
                continue;
            };
            let cycle = ctx.store.cycles().get(cycle_idx).expect("in range");
            for point in 0..block.point_count() {
                let volt = block.value(point).unwrap_or(f64::NAN);
                let x = ctx.sample_x((cycle.cumulative_points() + point) as f64);
                let y = if volt.is_nan() {
                    // Flat continuation through undefined samples.
                    last.map_or((band_top + band_bottom) / 2.0, |p| p.y)
                } else {
                    voltage_to_y(volt, range, band_top, band_bottom)
                };
                let curr = PointF::new(x, y);

                match last {
                    Some(prev) => {
                        if inside(prev) && inside(curr) {
                            if volt.is_nan() {
                                list.line(prev, curr, nan_pen);
                                list.text(
                                    PointF::new(
                                        curr.x - glyph.width / 2.0,
                                        curr.y - glyph.height / 2.0,
                                    ),
                                    "!",
                                    spacing.nan_glyph_text_size,
                                    ctx.palette.nan_trace,
                                );
                            } else {
                                list.line(prev, curr, stroke);
                            }
                        } else if let Some((a, b)) =
                            clip_segment(prev, curr, band_top, band_bottom, plot)
                        {
                            list.line(a, b, stroke);
                        }
                    }
                    None => {
                        // Nothing to connect yet; a NaN first point still
                        // announces itself.
                        if volt.is_nan() && x >= plot.left() - glyph.width / 2.0 && x <= plot.right()
                        {
                            list.text(
                                PointF::new(x - glyph.width / 2.0, y - glyph.height / 2.0),
                                "!",
                                spacing.nan_glyph_text_size,
                                ctx.palette.nan_trace,
                            );
                        }
                    }
                }
                last = Some(curr);
            }
        }
    }
}

/// Per-cycle block labels centered near the top of the row.
fn paint_cycle_labels(
    ctx: &PaintCtx<'_>,
    list: &mut DisplayList,
    pin: &Pin,
    row_top: f64,
    first_cycle: usize,
    last_cycle: usize,
) {
    let spacing = ctx.spacing;
    let plot = ctx.layout.plot;
    for cycle_idx in first_cycle..=last_cycle {
        let Some(label) = pin.cycle_top_label(cycle_idx) else {
            continue;
        };
        let cycle = ctx.store.cycles().get(cycle_idx).expect("in range");
        let mid = (cycle.cumulative_points() + cycle.end_point()) as f64 / 2.0;
        let extent = ctx.text_extent(label, spacing.cycle_label_text_size);
        let tx = ctx.sample_x(mid) - extent.width / 2.0;
        let ty = row_top + extent.height / 2.0;
        let fits = tx > plot.left()
            && tx + extent.width < plot.right()
            && ty > plot.top()
            && ty + extent.height < plot.bottom();
        if fits {
            list.text(
                PointF::new(tx, ty),
                label,
                spacing.cycle_label_text_size,
                ctx.palette.cycle_top_label,
            );
        }
    }
}
