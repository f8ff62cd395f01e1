//! End-to-end engine scenarios: pixel round-trips, zoom anchoring, cursor
//! lifecycle, fail navigation, and jump commands.

use wavescope::{
    ChangeKind, CompareMarker, Cycle, CycleSet, DrawOp, Expected, HitInfo, LayerId, LevelRef,
    Line, Pin, PointF, QueryError, VoltageLevelMarker, VoltageRange, WaveformView, ZoomDirection,
};

/// Three cycles (100/200/50 points), eight pins, two lines, a NaN hole, a
/// strobe marker, and two failing (pin, cycle) blocks.
fn build_view() -> WaveformView {
    let cycles = CycleSet::new(vec![
        Cycle::new(0, 100).unwrap(),
        Cycle::new(16, 200).unwrap(),
        Cycle::new(48, 50).unwrap(),
    ]);

    let mut pins = Vec::new();
    for idx in 0..8 {
        let range = VoltageRange::new(3.3, 0.0)
            .unwrap()
            .with_markers(vec![VoltageLevelMarker::new("Vih", 2.0)]);
        let mut pin = Pin::new(format!("P{idx}"), range, 2, &cycles);
        for (cycle_idx, count) in [(0usize, 100usize), (1, 200), (2, 50)] {
            let volts: Vec<f64> = (0..count)
                .map(|p| 3.3 * ((p % 10) as f64) / 10.0)
                .collect();
            for line in 0..2 {
                pin.block_mut(line, cycle_idx).unwrap().fill(&volts);
            }
        }
        pins.push(pin);
    }

    // A NaN hole mid-record on pin 0, line 0.
    pins[0].block_mut(0, 0).unwrap().set_value(50, f64::NAN);
    // A strobe compare on pin 0, cycle 0.
    pins[0].block_mut(0, 0).unwrap().push_compare(CompareMarker::Strobe {
        point: 20,
        expect: Expected::High,
        level: LevelRef::Marker(0),
    });
    // Failing blocks: (cycle 1, row 1) and (cycle 1, row 2).
    pins[1].block_mut(0, 1).unwrap().set_fail(true);
    pins[2].block_mut(1, 1).unwrap().set_fail(true);

    let lines = vec![Line::new("force"), Line::new("sense")];

    let mut view = WaveformView::new();
    view.set_viewport_size(800.0, 600.0);
    view.set_samples(cycles, pins, lines);
    view
}

#[test]
fn full_render_populates_static_and_data_layers() {
    let mut view = build_view();
    let frame = view.render(ChangeKind::Full);
    assert!(!frame.layer(LayerId::Frame).is_empty());
    assert!(!frame.layer(LayerId::Grid).is_empty());
    assert!(!frame.layer(LayerId::Pins).is_empty());
    assert!(!frame.layer(LayerId::Traces).is_empty());
}

#[test]
fn empty_store_renders_only_the_static_frame() {
    let mut view = WaveformView::new();
    view.set_viewport_size(800.0, 600.0);
    let frame = view.render(ChangeKind::Full);
    assert!(!frame.layer(LayerId::Frame).is_empty());
    assert!(frame.layer(LayerId::Grid).is_empty());
    assert!(frame.layer(LayerId::Traces).is_empty());
    let (max_x, max_y) = view.max_scroll();
    assert_eq!((max_x, max_y), (0.0, 0.0));
}

#[test]
fn nan_samples_draw_the_bang_glyph() {
    let mut view = build_view();
    let frame = view.render(ChangeKind::Full);
    let has_glyph = frame
        .layer(LayerId::Traces)
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Text { text, .. } if text == "!"));
    assert!(has_glyph);
}

#[test]
fn failing_blocks_draw_shading_rects() {
    let mut view = build_view();
    // Scroll cycle 1 into view; row 1 is visible from the top.
    view.jump_to_pattern_offset(16, 0).unwrap();
    let frame = view.render(ChangeKind::Full);
    let has_fill = frame
        .layer(LayerId::Traces)
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Rect { fill: Some(_), .. }));
    assert!(has_fill);
}

#[test]
fn pixel_round_trip_recovers_cycle_and_point() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    let layout = *view.layout();

    for (cycle_idx, point) in [(0usize, 0usize), (0, 99), (1, 0), (1, 137), (2, 49)] {
        let cum = view
            .store()
            .cycles()
            .get(cycle_idx)
            .unwrap()
            .cumulative_points();
        let x = layout.plot.left() + (cum + point) as f64 * layout.px_per_sample
            + layout.px_per_sample / 2.0;
        if x >= layout.plot.right() {
            continue; // off-screen at this zoom; scrolling covers it below
        }
        let y = layout.plot.top() + 10.0;
        assert_eq!(
            view.hit_test(PointF::new(x, y)),
            Some(HitInfo::Normal),
            "sample ({cycle_idx}, {point})"
        );
    }
}

#[test]
fn hit_test_outside_plot_is_none() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    let plot = view.layout().plot;
    assert_eq!(view.hit_test(PointF::new(plot.left() - 1.0, plot.top() + 5.0)), None);
    assert_eq!(view.hit_test(PointF::new(plot.left() + 5.0, plot.bottom() + 1.0)), None);
}

#[test]
fn hit_test_beyond_record_is_none() {
    let mut view = build_view();
    // Zoom far out so the whole 350-point record spans under 100 px.
    view.set_zoom(0.05, 1.0);
    view.render(ChangeKind::Full);
    let layout = *view.layout();
    let x = layout.plot.left() + 350.0 * layout.px_per_sample + 10.0;
    assert!(x < layout.plot.right(), "record should end inside the plot");
    assert_eq!(view.hit_test(PointF::new(x, layout.plot.top() + 5.0)), None);
}

#[test]
fn zoom_about_point_keeps_the_sample_under_the_cursor() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    view.set_scroll(300.0, 50.0);
    let plot = view.layout().plot;
    let anchor = PointF::new(plot.left() + 365.0, plot.top() + 200.0);

    let scroll_before = view.scroll();
    let zoom_before = view.zoom();
    assert!(view.zoom_about(anchor, ZoomDirection::In));
    assert!(view.zoom_about(anchor, ZoomDirection::Out));

    let (sx, sy) = view.scroll();
    assert_eq!(view.zoom(), zoom_before);
    assert!((sx - scroll_before.0).abs() < 1e-6, "x: {sx} vs {}", scroll_before.0);
    assert!((sy - scroll_before.1).abs() < 1e-6, "y: {sy} vs {}", scroll_before.1);
}

#[test]
fn zoom_about_point_outside_plot_is_rejected() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    let zoom_before = view.zoom();
    assert!(!view.zoom_about(PointF::new(1.0, 1.0), ZoomDirection::In));
    assert_eq!(view.zoom(), zoom_before);
}

#[test]
fn cursor_auto_names_never_reuse_suffixes() {
    let mut view = build_view();
    view.render(ChangeKind::Full);

    assert_eq!(view.add_cursor(None).unwrap(), "X0");
    view.end_cursor_move();
    assert_eq!(view.add_cursor(None).unwrap(), "X1");
    view.end_cursor_move();
    view.remove_cursor("X0").unwrap();
    assert_eq!(view.add_cursor(None).unwrap(), "X2");
}

#[test]
fn add_cursor_is_refused_while_one_is_moving() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    view.add_cursor(None).unwrap();
    assert_eq!(view.add_cursor(None), Err(QueryError::CursorBusy));
    view.end_cursor_move();
    assert!(view.add_cursor(Some("trigger")).is_ok());
    view.end_cursor_move();
    assert_eq!(
        view.add_cursor(Some("trigger")),
        Err(QueryError::CursorNameTaken {
            name: "trigger".into()
        })
    );
}

#[test]
fn dragging_pins_a_cursor_and_hit_test_finds_it() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    let layout = *view.layout();

    view.add_cursor(None).unwrap();
    // Drag over global sample 42.
    let x = layout.plot.left() + 42.0 * layout.px_per_sample + layout.px_per_sample / 2.0;
    let p = PointF::new(x, layout.plot.top() + 20.0);
    view.mouse_move(Some(p));
    view.end_cursor_move();

    let pos = view.cursors().get("X0").unwrap().position().unwrap();
    assert_eq!((pos.cycle, pos.point), (0, 42));
    assert_eq!(
        view.hit_test(p),
        Some(HitInfo::TimingCursor { name: "X0".into() })
    );

    // The cursor layer now draws its line and labels.
    let frame = view.render(ChangeKind::Full);
    assert!(!frame.layer(LayerId::Cursor).is_empty());
}

#[test]
fn measurement_pair_requires_existing_cursors() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    assert_eq!(
        view.set_measurement(Some(("X0", "X1"))),
        Err(QueryError::CursorNotFound { name: "X0".into() })
    );
    view.add_cursor(None).unwrap();
    view.end_cursor_move();
    view.add_cursor(None).unwrap();
    view.end_cursor_move();
    assert!(view.set_measurement(Some(("X0", "X1"))).is_ok());
}

#[test]
fn find_next_fail_walks_pairs_then_exhausts() {
    let mut view = build_view();
    view.render(ChangeKind::Full);

    // From the origin: the first failing pair is (cycle 1, row 1).
    assert_eq!(view.find_next_fail(), Some((1, 1)));
    assert_eq!(view.jump_to_next_fail(), Some((1, 1)));

    // From exactly that position: the next pair.
    assert_eq!(view.jump_to_next_fail(), Some((1, 2)));

    // Nothing further.
    assert_eq!(view.find_next_fail(), None);

    // And walking backward finds the earlier pair again.
    assert_eq!(view.find_previous_fail(), Some((1, 1)));
}

#[test]
fn pattern_offset_jump_validates_range() {
    let mut view = build_view();
    view.render(ChangeKind::Full);

    assert_eq!(view.jump_to_pattern_offset(16, 0).unwrap(), 1);
    assert_eq!(view.jump_to_pattern_offset(16, 1).unwrap(), 2);
    assert_eq!(
        view.jump_to_pattern_offset(99, 0),
        Err(QueryError::OffsetNotFound { offset: 99 })
    );
    assert_eq!(
        view.jump_to_pattern_offset(16, 5),
        Err(QueryError::JumpOutOfRange {
            offset: 16,
            delta: 5,
            cycles: 3
        })
    );
    assert_eq!(
        view.jump_to_pattern_offset(0, -1),
        Err(QueryError::JumpOutOfRange {
            offset: 0,
            delta: -1,
            cycles: 3
        })
    );
}

#[test]
fn pattern_offset_jump_scrolls_to_the_cycle() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    view.jump_to_pattern_offset(16, 0).unwrap();
    let layout = *view.layout();
    let expected = (100.0 * layout.px_per_sample).min(layout.max_scroll_x);
    assert!((view.scroll().0 - expected).abs() < 1e-9);
}

#[test]
fn jump_to_pin_errors_on_unknown_or_hidden() {
    let mut view = build_view();
    view.render(ChangeKind::Full);

    assert_eq!(
        view.jump_to_pin("nope"),
        Err(QueryError::PinNotFound { name: "nope".into() })
    );

    view.store_mut().pins_mut()[3].show = false;
    view.render(ChangeKind::PinVisibility);
    assert_eq!(
        view.jump_to_pin("P3"),
        Err(QueryError::PinHidden { name: "P3".into() })
    );

    let row = view.jump_to_pin("P5").unwrap();
    // With P3 hidden, P5 sits at visible row 4.
    assert_eq!(row, 4);
    let expected = (4.0 * view.layout().row_height).min(view.layout().max_scroll_y);
    assert!((view.scroll().1 - expected).abs() < 1e-9);
}

#[test]
fn horizontal_render_leaves_the_mouse_layer_alone() {
    let mut view = build_view();
    view.render(ChangeKind::Full);
    let before = view.frame().layer(LayerId::Mouse).len();

    let plot = view.layout().plot;
    view.mouse_move(Some(PointF::new(plot.left() + 50.0, plot.top() + 50.0)));
    view.set_scroll(40.0, 0.0);
    view.render(ChangeKind::Horizontal);
    assert_eq!(view.frame().layer(LayerId::Mouse).len(), before);

    view.render(ChangeKind::MouseMove);
    assert!(view.frame().layer(LayerId::Mouse).len() > before);
}

#[test]
fn offsets_report_record_bounds() {
    let view = build_view();
    assert_eq!(view.min_offset(), Some(0));
    assert_eq!(view.max_offset(), Some(48));
}

proptest::proptest! {
    // Dragging a cursor over any on-screen sample pins it to exactly that
    // (cycle, point): the pixel mapping and the hit resolution agree.
    #[test]
    fn cursor_drag_round_trips_any_visible_sample(global in 0usize..144) {
        let mut view = build_view();
        view.render(ChangeKind::Full);
        let layout = *view.layout();

        view.add_cursor(Some("probe")).unwrap();
        let x = layout.plot.left()
            + global as f64 * layout.px_per_sample
            + layout.px_per_sample / 2.0;
        view.mouse_move(Some(PointF::new(x, layout.plot.top() + 5.0)));
        view.end_cursor_move();

        let pos = view.cursors().get("probe").unwrap().position().unwrap();
        let expected_cycle = match global {
            0..=99 => 0usize,
            100..=299 => 1,
            _ => 2,
        };
        let cum = view
            .store()
            .cycles()
            .get(expected_cycle)
            .unwrap()
            .cumulative_points();
        proptest::prop_assert_eq!(pos.cycle, expected_cycle);
        proptest::prop_assert_eq!(pos.point, global - cum);
    }
}
