#![forbid(unsafe_code)]

//! Mouse overlay: position readout, hovered-sample crosshair, and per-line
//! voltage guide lines.

use crate::display_list::{DashPattern, DisplayList, Stroke};
use crate::layers::PaintCtx;
use wavescope_core::geometry::PointF;
use wavescope_core::voltage::voltage_to_y;

pub(crate) fn paint(ctx: &PaintCtx<'_>, list: &mut DisplayList) {
    let layout = ctx.layout;
    let spacing = ctx.spacing;
    let palette = ctx.palette;
    let plot = layout.plot;
    let info_mid_y = layout.origin.y + layout.actual_h + spacing.info_height / 2.0;

    // Pointer readout, right-aligned in the info band.
    let position_text = match ctx.mouse {
        Some(p) => format!(
            "Mouse Point: {:.2}, {:.2}",
            p.x, p.y
        ),
        None => "Mouse Point: Leave".to_string(),
    };
    let extent = ctx.text_extent(&position_text, spacing.legend_text_size);
    list.text(
        PointF::new(
            layout.origin.x + layout.actual_w - extent.width,
            info_mid_y - extent.height / 2.0,
        ),
        position_text,
        spacing.legend_text_size,
        palette.mouse_point_text,
    );

    let Some(pointer) = ctx.mouse else {
        return;
    };
    if !plot.contains(pointer) {
        return;
    }

    // Resolve the hovered sample.
    let global_point = ctx.point_at_x(pointer.x);
    let Some(cycle_idx) = ctx.store.cycles().cycle_at_point(global_point) else {
        return;
    };
    let row = ctx.row_at_y(pointer.y);
    if row < 0 || row as usize >= ctx.visible_pins.len() {
        return;
    }
    let row = row as usize;
    let pin = &ctx.store.pins()[ctx.visible_pins[row]];
    let cycle = ctx.store.cycles().get(cycle_idx).expect("resolved");
    let point_in_cycle = global_point as usize - cycle.cumulative_points();
    let time_text = ctx.units.time(ctx.time_of(global_point as usize));

    // Info readout line.
    let mut volt_info = String::new();
    for (line_idx, line) in ctx.store.lines().iter().enumerate() {
        if !line.show || line_idx >= pin.line_count() {
            continue;
        }
        let volt = pin
            .block(line_idx, cycle_idx)
            .and_then(|b| b.value(point_in_cycle))
            .unwrap_or(f64::NAN);
        volt_info.push_str(&format!("{}({}), ", line.name, ctx.units.voltage(volt)));
    }
    let info = format!(
        "Pin: {}, Offset: {}, Index: {}, Volt: {}@{}",
        pin.name(),
        cycle.offset(),
        cycle_idx,
        volt_info,
        time_text
    );
    let info_extent = ctx.text_extent(&info, spacing.legend_text_size);
    list.text(
        PointF::new(
            layout.origin.x + spacing.info_text_padding,
            info_mid_y - info_extent.height / 2.0,
        ),
        info,
        spacing.legend_text_size,
        palette.information_text,
    );

    // While a cursor is being dragged the cursor layer owns the feedback.
    if ctx.cursors.any_moving() {
        return;
    }

    // Crosshair snapped to the hovered sample.
    let snap_x = ctx.sample_x(global_point as f64);
    let crosshair = Stroke::solid(palette.mouse_cursor_line, spacing.line_width)
        .with_dash(DashPattern::Dot);
    list.line(
        PointF::new(snap_x, plot.top()),
        PointF::new(snap_x, plot.bottom()),
        crosshair,
    );
    let time_extent = ctx.text_extent(&time_text, spacing.mouse_text_size);
    list.text(
        PointF::new(
            snap_x - time_extent.width / 2.0,
            plot.bottom() + time_extent.height / 2.0,
        ),
        time_text,
        spacing.mouse_text_size,
        palette.mouse_cursor_text,
    );

    // Per-line horizontal guides from the voltage bar to the crosshair.
    let row_top = ctx.row_top(row);
    let (band_top, band_bottom) = layout.volt_band(row_top, spacing);
    let range = pin.voltage_range();
    for (line_idx, line) in ctx.store.lines().iter().enumerate() {
        if !line.show || line_idx >= pin.line_count() {
            continue;
        }
        let volt = pin
            .block(line_idx, cycle_idx)
            .and_then(|b| b.value(point_in_cycle))
            .unwrap_or(f64::NAN);
        if volt.is_nan() {
            continue;
        }
        let y = voltage_to_y(volt, range, band_top, band_bottom);
        list.line(
            PointF::new(plot.left(), y),
            PointF::new(snap_x, y),
            crosshair,
        );
        let volt_text = ctx.units.voltage(volt);
        let volt_extent = ctx.text_extent(&volt_text, spacing.mouse_text_size);
        list.text(
            PointF::new(plot.left() - volt_extent.width, y - volt_extent.height / 2.0),
            volt_text,
            spacing.mouse_text_size,
            palette.mouse_cursor_text,
        );
    }
}
