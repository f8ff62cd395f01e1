#![forbid(unsafe_code)]

//! Pins layer: row separators, pin names, top-label boxes, fail dots, and
//! the per-pin voltage scale.

use crate::clip::clamp_rect;
use crate::display_list::{DashPattern, DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::{PointF, RectF};
use wavescope_core::voltage::voltage_to_y;

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let Some((first, last)) = ctx.visible_rows() else {
        return;
    };
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let palette = ctx.palette;
    let plot = layout.plot;

    let pen = Stroke::solid(palette.frame_line, spacing.line_width);
    let scale_pen =
        Stroke::solid(palette.scale_line, spacing.line_width).with_dash(DashPattern::Dash);

    for row in first..=last {
        let pin = &ctx.store.pins()[ctx.visible_pins[row]];
        let row_top = ctx.row_top(row);
        let row_bottom = row_top + layout.row_height;
        let half_row = layout.row_height / 2.0;

        // Row separator across the full framed width.
        if row_bottom > plot.top() && row_bottom < plot.bottom() {
            list.line(
                PointF::new(layout.origin.x, row_bottom),
                PointF::new(layout.origin.x + layout.actual_w, row_bottom),
                pen,
            );
        }

        // Header label box in the pin bar.
        if let Some(label) = pin.top_label() {
            let box_h = half_row - spacing.fail_circle_radius * 2.0;
            if box_h > 0.0 {
                let bar = RectF::new(layout.origin.x, plot.top(), layout.pin_bar_width, plot.height);
                let label_box =
                    RectF::new(layout.origin.x, row_top, layout.pin_bar_width, box_h);
                if let Some(clipped) = clamp_rect(label_box, bar) {
                    list.rect(clipped, Some(palette.pin_top_label_box), None);
                }
                let extent = ctx.text_extent(label, spacing.pin_label_text_size);
                let tx = layout.origin.x + (layout.pin_bar_width - extent.width) / 2.0;
                let ty = row_top + (box_h - extent.height) / 2.0;
                if ty > plot.top() && ty + extent.height < plot.bottom() {
                    list.text(
                        PointF::new(tx, ty),
                        label,
                        spacing.pin_label_text_size,
                        palette.pin_top_label_text,
                    );
                }
            }
        }

        // Fail dot near the pin bar's right edge.
        if pin.has_fail() {
            let radius = (layout.row_height / 8.0).min(layout.pin_bar_width / 8.0);
            let center = PointF::new(
                layout.origin.x + layout.pin_bar_width - radius,
                row_bottom - half_row - radius,
            );
            if center.y - radius >= plot.top() && center.y + radius <= plot.bottom() {
                list.ellipse(center, radius, radius, Some(palette.fail_circle), None);
            }
        }

        // Pin name centered in the bar, in the lower half of the row.
        let name_extent = ctx.text_extent(pin.name(), spacing.pin_name_text_size);
        let name_y = row_bottom - half_row + (half_row - name_extent.height) / 2.0;
        if name_y >= plot.top() && name_y + name_extent.height < plot.bottom() {
            list.text(
                PointF::new(
                    layout.origin.x + (layout.pin_bar_width - name_extent.width) / 2.0,
                    name_y,
                ),
                pin.name(),
                spacing.pin_name_text_size,
                palette.pin_name,
            );
        }

        // Voltage scale: max/min bounds plus user markers.
        let range = pin.voltage_range();
        let (band_top, band_bottom) = layout.volt_band(row_top, spacing);
        if range.show_max_volt {
            paint_level(ctx, list, band_top, range.max_volt(), scale_pen);
        }
        if range.show_min_volt {
            paint_level(ctx, list, band_bottom, range.min_volt(), scale_pen);
        }
        for (idx, marker) in range.markers().iter().enumerate() {
            if !marker.show {
                continue;
            }
            let y = voltage_to_y(marker.voltage, range, band_top, band_bottom);
            let marker_pen = Stroke::solid(palette.voltage_level_color(idx), spacing.line_width)
                .with_dash(DashPattern::Dash);
            paint_level(ctx, list, y, marker.voltage, marker_pen);
        }
    }
}

/// One horizontal voltage level: scale tick, dashed line across the plot,
/// and right-aligned value text in the voltage bar.
fn paint_level(ctx: &PaintCtx<'_>, list: &mut DisplayList, y: f64, volt: f64, line_pen: Stroke) {
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let plot = layout.plot;
    let tick_pen = Stroke::solid(ctx.palette.frame_line, spacing.line_width);

    let text = ctx.units.voltage(volt);
    let extent = ctx.text_extent(&text, spacing.volt_text_size);
    let text_y = y - extent.height / 2.0;
    if text_y > plot.top() && text_y + extent.height < plot.bottom() {
        let text_x = plot.left() - layout.scale_tick_width / 2.0 - extent.width;
        list.text(
            PointF::new(text_x, text_y),
            text,
            spacing.volt_text_size,
            ctx.palette.voltage_text,
        );
    }

    if y > plot.top() && y < plot.bottom() {
        let tick_x = plot.left() - layout.scale_tick_width / 2.0;
        list.line(
            PointF::new(tick_x, y),
            PointF::new(tick_x + layout.scale_tick_width, y),
            tick_pen,
        );
        list.line(
            PointF::new(plot.left(), y),
            PointF::new(plot.right(), y),
            line_pen,
        );
    }
}
