use super::*;
use crate::shape::track::CurveTrack;

fn linked_static() -> EditPolicy {
    EditPolicy {
        feather_link: true,
        ..EditPolicy::static_edit()
    }
}

fn square(size: f64, counter_clockwise: bool) -> Bezier {
    let mut corners = vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)];
    if counter_clockwise {
        corners.reverse();
    }
    let mut b = Bezier::new();
    for (x, y) in corners {
        b.add_control_point(x, y, Frame(0), EditPolicy::static_edit())
            .unwrap();
    }
    b.set_finished(true);
    b
}

fn curved_segment(policy: EditPolicy) -> Bezier {
    let mut b = Bezier::new();
    b.add_control_point(0.0, 0.0, Frame(0), policy).unwrap();
    b.add_control_point(100.0, 0.0, Frame(0), policy).unwrap();
    b.move_right_bezier_point(0, Frame(0), 30.0, 50.0, policy)
        .unwrap();
    b.move_left_bezier_point(1, Frame(0), -30.0, 50.0, policy)
        .unwrap();
    b
}

fn assert_polylines_close(a: &[Point], b: &[Point]) {
    assert_eq!(a.len(), b.len());
    for (i, (p, q)) in a.iter().zip(b).enumerate() {
        assert!(
            (*p - *q).hypot() < 1e-9,
            "sample {i}: {p:?} vs {q:?}"
        );
    }
}

#[test]
fn new_shape_has_default_knobs() {
    let b = Bezier::new();
    assert!(b.is_empty());
    assert!(!b.is_finished());
    assert_eq!(b.opacity_at(Frame(0)), 1.0);
    assert_eq!(b.feather_at(Frame(0)), 0.0);
    assert_eq!(b.feather_fall_off_at(Frame(0)), 1.0);
    assert!(b.is_activated_at(Frame(0)));
    assert!(!b.is_inverted_at(Frame(0)));
    assert_eq!(b.overlay_color(), DEFAULT_OVERLAY_COLOR);
    assert_eq!(b.knob(ShapeKnob::Feather).bounds(), (-100.0, 100.0));
}

#[test]
fn add_control_point_pairs_a_feather_point() {
    let b = square(10.0, false);
    assert_eq!(b.len(), 4);
    assert_eq!(b.feather_points().len(), 4);
    for (cp, fp) in b.control_points().iter().zip(b.feather_points()) {
        assert_eq!(cp.position_at(Frame(0)), fp.point().position_at(Frame(0)));
        assert!(!fp.is_decoupled());
    }
    assert!(b.keyframe_times().is_empty());
}

#[test]
fn appending_to_a_finished_shape_is_rejected() {
    let mut b = square(10.0, false);
    let err = b
        .add_control_point(5.0, 5.0, Frame(0), EditPolicy::default())
        .unwrap_err();
    assert!(matches!(err, RotoError::InvalidOperation(_)));
    assert_eq!(b.len(), 4);
}

#[test]
fn new_points_are_keyed_at_existing_shape_keyframes() {
    let mut b = Bezier::new();
    b.add_control_point(0.0, 0.0, Frame(0), EditPolicy::default())
        .unwrap();
    b.set_keyframe(Frame(10));
    b.add_control_point(5.0, 5.0, Frame(3), EditPolicy::static_edit())
        .unwrap();
    assert_eq!(
        b.control_point(1).unwrap().keyframe_times(),
        [Frame(0), Frame(10)]
    );

    b.add_control_point(9.0, 9.0, Frame(7), EditPolicy::default())
        .unwrap();
    assert_eq!(b.keyframe_times(), [Frame(0), Frame(7), Frame(10)]);
}

#[test]
fn subdivision_keeps_the_curve_shape() {
    let mut b = curved_segment(EditPolicy::static_edit());
    let before = b.evaluate_at_time(Frame(0), 100);

    let at = b.add_control_point_after_index(0, 0.5).unwrap();
    assert_eq!(at, 1);
    assert_eq!(b.len(), 3);
    assert_eq!(b.feather_points().len(), 3);

    let after = b.evaluate_at_time(Frame(0), 50);
    assert_polylines_close(&before, &after);
}

#[test]
fn subdivision_keeps_the_curve_at_every_keyframe() {
    let policy = EditPolicy::default();
    let mut b = curved_segment(policy);
    b.move_control_point_by_index(1, Frame(10), 0.0, 40.0, policy)
        .unwrap();
    b.move_right_bezier_point(0, Frame(10), 0.0, -70.0, policy)
        .unwrap();
    assert_eq!(b.keyframe_times(), [Frame(0), Frame(10)]);

    let before: Vec<_> = [0, 10]
        .map(|f| b.evaluate_at_time(Frame(f), 100))
        .into_iter()
        .collect();
    b.add_control_point_after_index(0, 0.5).unwrap();
    for (f, expected) in [0, 10].into_iter().zip(&before) {
        assert_polylines_close(expected, &b.evaluate_at_time(Frame(f), 50));
    }
    assert_eq!(b.control_point(1).unwrap().keyframe_times(), [Frame(0), Frame(10)]);
}

#[test]
fn subdivision_wraps_on_finished_shapes() {
    let mut b = square(10.0, false);
    let at = b.add_control_point_after_index(3, 0.5).unwrap();
    assert_eq!(at, 4);
    assert_eq!(
        b.control_point(4).unwrap().position_at(Frame(0)),
        Point::new(0.0, 5.0)
    );
}

#[test]
fn subdivision_rejects_bad_arguments() {
    let mut b = curved_segment(EditPolicy::static_edit());
    for t in [0.0, 1.0, -0.5, f64::NAN] {
        assert!(matches!(
            b.add_control_point_after_index(0, t),
            Err(RotoError::InvalidOperation(_))
        ));
    }
    assert!(matches!(
        b.add_control_point_after_index(1, 0.5),
        Err(RotoError::Contract(_))
    ));
    assert!(matches!(
        b.add_control_point_after_index(7, 0.5),
        Err(RotoError::Contract(_))
    ));
    assert_eq!(b.len(), 2);
}

#[test]
fn remove_control_point_removes_its_feather_point() {
    let mut b = square(10.0, false);
    b.remove_control_point_by_index(1).unwrap();
    assert_eq!(b.len(), 3);
    assert_eq!(b.feather_points().len(), 3);
    assert!(matches!(
        b.remove_control_point_by_index(3),
        Err(RotoError::Contract(_))
    ));
    assert_eq!(b.len(), 3);
}

#[test]
fn feather_link_moves_feather_point_until_decoupled() {
    let mut b = square(10.0, false);
    b.move_control_point_by_index(0, Frame(0), 5.0, 5.0, linked_static())
        .unwrap();
    assert_eq!(
        b.feather_point(0).unwrap().point().position_at(Frame(0)),
        Point::new(5.0, 5.0)
    );

    b.move_feather_point_by_index(0, Frame(0), 1.0, 0.0, linked_static())
        .unwrap();
    assert!(b.feather_point(0).unwrap().is_decoupled());
    b.move_control_point_by_index(0, Frame(0), 5.0, 5.0, linked_static())
        .unwrap();
    assert_eq!(
        b.control_point(0).unwrap().position_at(Frame(0)),
        Point::new(10.0, 10.0)
    );
    assert_eq!(
        b.feather_point(0).unwrap().point().position_at(Frame(0)),
        Point::new(6.0, 5.0)
    );
}

#[test]
fn without_feather_link_only_the_control_point_moves() {
    let mut b = square(10.0, false);
    b.move_control_point_by_index(2, Frame(0), 1.0, 1.0, EditPolicy::static_edit())
        .unwrap();
    assert_eq!(
        b.feather_point(2).unwrap().point().position_at(Frame(0)),
        Point::new(10.0, 10.0)
    );
    assert!(b.is_feather_point_at_distance(2, Frame(0), 2f64.sqrt()).unwrap());
}

#[test]
fn keyed_move_keys_the_whole_shape() {
    let mut b = square(10.0, false);
    b.move_control_point_by_index(0, Frame(5), 1.0, 0.0, EditPolicy::default())
        .unwrap();
    for cp in b.control_points() {
        assert!(cp.has_keyframe_at(Frame(5)));
    }
    assert!(b.has_keyframe_at_time(Frame(5)));

    b.remove_keyframe(Frame(5)).unwrap();
    assert!(b.keyframe_times().is_empty());
    assert!(matches!(
        b.remove_keyframe(Frame(5)),
        Err(RotoError::Contract(_))
    ));
}

#[test]
fn removing_the_last_keyframe_keeps_the_keyed_pose() {
    let policy = EditPolicy::default();
    let mut b = Bezier::new();
    for (x, y) in [(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)] {
        b.add_control_point(x, y, Frame(0), policy).unwrap();
    }
    b.move_control_point_by_index(0, Frame(0), 50.0, 0.0, policy)
        .unwrap();
    assert_eq!(b.keyframe_times(), [Frame(0)]);

    b.remove_keyframe(Frame(0)).unwrap();
    assert!(b.keyframe_times().is_empty());
    for time in [Frame(0), Frame(30)] {
        let cp = b.control_point(0).unwrap();
        assert_eq!(cp.position_at(time), Point::new(50.0, 0.0));
        assert_eq!(
            b.control_point(2).unwrap().position_at(time),
            Point::new(50.0, 80.0)
        );
    }
}

#[test]
fn find_nearby_returns_first_point_in_order() {
    let mut b = Bezier::new();
    for (x, y) in [(0.0, 0.0), (1.0, 1.0), (50.0, 50.0)] {
        b.add_control_point(x, y, Frame(0), EditPolicy::static_edit())
            .unwrap();
    }
    let (i, _) = b.find_control_point_nearby(0.5, 0.5, 1.0, Frame(0)).unwrap();
    assert_eq!(i, 0);
    let (i, _) = b.find_control_point_nearby(49.0, 51.0, 1.0, Frame(0)).unwrap();
    assert_eq!(i, 2);
    assert!(b.find_control_point_nearby(25.0, 25.0, 3.0, Frame(0)).is_none());
    assert!(b.find_feather_point_nearby(1.2, 0.9, 0.5, Frame(0)).is_some());
}

#[test]
fn evaluate_sample_counts_follow_open_and_closed() {
    let mut b = square(10.0, false);
    assert_eq!(b.evaluate_at_time(Frame(0), 8).len(), 4 * 8);
    b.set_finished(false);
    let open = b.evaluate_at_time(Frame(0), 8);
    assert_eq!(open.len(), 3 * 8 + 1);
    assert_eq!(open[open.len() - 1], Point::new(0.0, 10.0));
    assert!(Bezier::new().evaluate_at_time(Frame(0), 8).is_empty());
}

#[test]
fn feather_offset_points_outward_for_both_windings() {
    for ccw in [false, true] {
        let mut b = square(100.0, ccw);
        b.knob_mut(ShapeKnob::Feather).set_value(10.0).unwrap();
        let feather = b.evaluate_feather_at_time(Frame(0), 10);
        assert_eq!(feather.len(), 40);
        for p in &feather {
            let inside = p.x > 0.0 && p.x < 100.0 && p.y > 0.0 && p.y < 100.0;
            assert!(!inside, "winding ccw={ccw}: {p:?} is inside");
        }

        b.knob_mut(ShapeKnob::Feather).set_value(-10.0).unwrap();
        for p in b.evaluate_feather_at_time(Frame(0), 10) {
            assert!(p.x > 0.0 && p.x < 100.0 && p.y > 0.0 && p.y < 100.0);
        }
    }
}

#[test]
fn bounding_box_includes_handles_and_feather() {
    let mut b = curved_segment(EditPolicy::static_edit());
    let r = b.bounding_box_at_time(Frame(0)).unwrap();
    assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 50.0));

    b.knob_mut(ShapeKnob::Feather).set_value(5.0).unwrap();
    let r = b.bounding_box_at_time(Frame(0)).unwrap();
    assert_eq!(r, Rect::new(-5.0, -5.0, 105.0, 55.0));
    assert!(Bezier::new().bounding_box_at_time(Frame(0)).is_none());
}

#[test]
fn slaved_points_reject_moves_without_changes() {
    let track: Arc<dyn PointTrack> =
        Arc::new(CurveTrack::new("t").with_key(Frame(0), Point::new(3.0, 3.0)));
    let mut b = square(10.0, false);
    b.slave_control_point(0, &track).unwrap();
    assert_eq!(
        b.control_point(0).unwrap().position_at(Frame(0)),
        Point::new(3.0, 3.0)
    );

    let err = b
        .move_control_point_by_index(0, Frame(4), 1.0, 1.0, EditPolicy::default())
        .unwrap_err();
    assert!(matches!(err, RotoError::InvalidOperation(_)));
    assert!(b.keyframe_times().is_empty());
    assert!(b.add_control_point_after_index(0, 0.5).is_err());

    assert!(b.unslave_control_point(0).unwrap());
    drop(track);
    assert!(!b.has_dead_masters());
}

#[test]
fn from_parts_reports_size_mismatch() {
    let err = Bezier::from_parts(
        vec![ControlPoint::new(Point::ZERO)],
        Vec::new(),
        false,
        ShapeKnobs::default(),
        DEFAULT_OVERLAY_COLOR,
    )
    .unwrap_err();
    assert!(matches!(err, RotoError::Invariant(_)));
}
