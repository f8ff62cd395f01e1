#![forbid(unsafe_code)]

//! Static frame layer: background, outer frame, bands, bar separators, and
//! the line-style legend.

use crate::display_list::{DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::{PointF, RectF};

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let palette = ctx.palette;
    let pen = Stroke::solid(palette.frame_line, spacing.line_width);

    // Window background.
    list.rect(
        RectF::new(0.0, 0.0, layout.window_w, layout.window_h),
        Some(palette.background),
        None,
    );

    // Framed content, error band, time band.
    list.rect(
        RectF::new(layout.origin.x, layout.origin.y, layout.actual_w, layout.actual_h),
        Some(palette.background),
        Some(pen),
    );
    list.rect(
        RectF::new(
            layout.origin.x,
            layout.origin.y,
            layout.actual_w,
            spacing.error_band_height,
        ),
        Some(palette.background),
        Some(pen),
    );
    list.rect(
        RectF::new(
            layout.origin.x,
            layout.plot.bottom(),
            layout.actual_w,
            spacing.time_band_height,
        ),
        Some(palette.background),
        Some(pen),
    );

    // Line legend in the top band.
    let mid_y = spacing.legend_height / 2.0;
    let mut x = layout.origin.x;
    for line in ctx.store.lines() {
        let extent = ctx.text_extent(&line.name, spacing.legend_text_size);
        list.text(
            PointF::new(x, mid_y - extent.height / 2.0),
            line.name.clone(),
            spacing.legend_text_size,
            palette.information_text,
        );
        let sample_from = x + extent.width + 5.0;
        let sample_to = sample_from + extent.width.max(10.0);
        list.line(
            PointF::new(sample_from, mid_y),
            PointF::new(sample_to, mid_y),
            Stroke::solid(palette.line_color(line), line.thickness),
        );
        x = sample_to + 5.0;
    }

    // Pin-bar / voltage-bar separators.
    let bar_x = layout.plot.left() - layout.volt_bar_width;
    list.line(
        PointF::new(bar_x, layout.plot.top()),
        PointF::new(bar_x, layout.plot.bottom()),
        pen,
    );
    list.line(
        PointF::new(layout.plot.left(), layout.plot.top()),
        PointF::new(layout.plot.left(), layout.plot.bottom()),
        pen,
    );
}
