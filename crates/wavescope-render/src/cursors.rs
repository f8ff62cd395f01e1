#![forbid(unsafe_code)]

//! Cursor overlay: timing-cursor lines, labels, and the measurement-pair
//! delta annotation.

use crate::display_list::{DashPattern, DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::PointF;

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let plot = layout.plot;
    let visible = ctx.visible_cycles();

    for (idx, cursor) in ctx.cursors.iter().enumerate() {
        let Some(pos) = cursor.position() else {
            continue;
        };
        let Some((first, last)) = visible else {
            break;
        };
        if pos.cycle < first || pos.cycle > last {
            continue;
        }
        let Some(cycle) = ctx.store.cycles().get(pos.cycle) else {
            continue;
        };
        let x = ctx.sample_x((cycle.cumulative_points() + pos.point) as f64);
        let pen = Stroke::solid(ctx.palette.cursor_color(idx), spacing.line_width)
            .with_dash(DashPattern::DashDot);

        if x > plot.left() && x < plot.right() {
            list.line(
                PointF::new(x, plot.top()),
                PointF::new(x, plot.bottom()),
                pen,
            );
        }

        let name_extent = ctx.text_extent(cursor.name(), spacing.cursor_text_size);
        let name_x = x - name_extent.width / 2.0;
        if name_x > plot.left() && name_x + name_extent.width < plot.right() {
            list.text(
                PointF::new(name_x, plot.top() - name_extent.height),
                cursor.name(),
                spacing.cursor_text_size,
                pen.color,
            );
        }

        let time_text = ctx.units.time(pos.time);
        let time_extent = ctx.text_extent(&time_text, spacing.cursor_text_size);
        let time_x = x - time_extent.width / 2.0;
        if time_x > plot.left() && time_x + time_extent.width < plot.right() {
            list.text(
                PointF::new(time_x, plot.bottom()),
                time_text,
                spacing.cursor_text_size,
                pen.color,
            );
        }
    }

    paint_measurement(ctx, list);
}

/// `|A - B| = dt` in the legend band when both named cursors exist.
fn paint_measurement(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let Some((name_a, name_b)) = ctx.cursors.measurement() else {
        return;
    };
    let (Some(a), Some(b)) = (ctx.cursors.get(name_a), ctx.cursors.get(name_b)) else {
        return;
    };
    let (Some(pos_a), Some(pos_b)) = (a.position(), b.position()) else {
        return;
    };

    let delta = ctx.units.time((pos_b.time - pos_a.time).abs());
    let text = format!("|{} - {}| = {}", a.name(), b.name(), delta);
    let extent = ctx.text_extent(&text, ctx.spacing.legend_text_size);
    list.text(
        PointF::new(
            ctx.layout.plot.right() - extent.width,
            ctx.layout.origin.y - ctx.spacing.legend_height / 2.0 - extent.height,
        ),
        text,
        ctx.spacing.legend_text_size,
        ctx.palette.default_cursor,
    );
}
