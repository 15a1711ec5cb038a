use super::*;

fn linear(keys: &[(i32, f64)]) -> Curve {
    let mut c = Curve::with_interpolation(Interpolation::Linear);
    for &(t, v) in keys {
        c.set_keyframe(Frame(t), v);
    }
    c
}

#[test]
fn empty_curve_has_no_value() {
    let c = Curve::new();
    assert!(c.is_empty());
    assert_eq!(c.evaluate_at(Frame(3)), None);
    assert_eq!(c.y_range(), None);
}

#[test]
fn set_keyframe_keeps_times_sorted_and_unique() {
    let mut c = linear(&[(10, 1.0), (0, 0.0), (5, 3.0)]);
    assert_eq!(c.keyframe_times().collect::<Vec<_>>(), [Frame(0), Frame(5), Frame(10)]);

    let i = c.set_keyframe(Frame(5), 4.0);
    assert_eq!(i, 1);
    assert_eq!(c.len(), 3);
    assert_eq!(c.evaluate_at(Frame(5)), Some(4.0));
}

#[test]
fn keyed_times_return_stored_values_exactly() {
    let mut c = Curve::new();
    for (t, v) in [(0, 0.1), (7, -3.25), (9, 12.5), (20, 0.3333)] {
        c.set_keyframe(Frame(t), v);
    }
    for k in c.keyframes() {
        assert_eq!(c.evaluate_at(k.time), Some(k.value));
    }
}

#[test]
fn linear_interpolates_and_holds_outside_range() {
    let c = linear(&[(0, 0.0), (10, 10.0)]);
    assert_eq!(c.evaluate_at(Frame(5)), Some(5.0));
    assert_eq!(c.evaluate_at(Frame(-4)), Some(0.0));
    assert_eq!(c.evaluate_at(Frame(40)), Some(10.0));
}

#[test]
fn constant_holds_previous_key() {
    let mut c = Curve::with_interpolation(Interpolation::Constant);
    c.set_keyframe(Frame(0), 1.0);
    c.set_keyframe(Frame(10), 3.0);
    assert_eq!(c.evaluate_at(Frame(9)), Some(1.0));
    assert_eq!(c.evaluate_at(Frame(10)), Some(3.0));
}

#[test]
fn smooth_does_not_overshoot_a_monotonic_run() {
    let mut c = Curve::new();
    c.set_keyframe(Frame(0), 0.0);
    c.set_keyframe(Frame(10), 1.0);
    c.set_keyframe(Frame(20), 1.1);
    for f in 0..=20 {
        let v = c.evaluate_at(Frame(f)).unwrap();
        assert!((-1e-9..=1.1 + 1e-9).contains(&v), "frame {f} value {v}");
    }
}

#[test]
fn horizontal_and_smooth_extremum_have_flat_tangents() {
    let mut c = Curve::new();
    c.set_keyframe(Frame(0), 0.0);
    c.set_keyframe(Frame(10), 5.0);
    c.set_keyframe(Frame(20), 0.0);
    let peak = c.keyframe(1).unwrap();
    assert_eq!(peak.left_derivative, 0.0);
    assert_eq!(peak.right_derivative, 0.0);

    c.set_interpolation(0, Interpolation::Horizontal).unwrap();
    assert_eq!(c.keyframe(0).unwrap().right_derivative, 0.0);
}

#[test]
fn catmull_rom_uses_centered_difference() {
    let mut c = Curve::with_interpolation(Interpolation::CatmullRom);
    c.set_keyframe(Frame(0), 0.0);
    c.set_keyframe(Frame(10), 5.0);
    c.set_keyframe(Frame(20), 20.0);
    let mid = c.keyframe(1).unwrap();
    assert_eq!(mid.left_derivative, 1.0);
    assert_eq!(mid.right_derivative, 1.0);
}

#[test]
fn cubic_keeps_explicit_derivatives() {
    let mut c = Curve::new();
    c.set_keyframe(Frame(0), 0.0);
    c.set_keyframe(Frame(10), 10.0);
    c.set_derivatives(0, 0.0, 3.0).unwrap();
    c.set_keyframe(Frame(20), 0.0);
    let k = c.keyframe(0).unwrap();
    assert_eq!(k.interpolation, Interpolation::Cubic);
    assert_eq!(k.right_derivative, 3.0);
    // Steeper start than linear.
    assert!(c.evaluate_at(Frame(1)).unwrap() > 1.0);
}

#[test]
fn delete_keyframe_rejects_bad_index_without_change() {
    let mut c = linear(&[(0, 0.0), (10, 1.0)]);
    assert!(matches!(c.delete_keyframe(5), Err(RotoError::Contract(_))));
    assert_eq!(c.len(), 2);
    c.delete_keyframe(0).unwrap();
    assert_eq!(c.keyframe_times().collect::<Vec<_>>(), [Frame(10)]);
    assert!(c.remove_keyframe_at(Frame(3)).is_err());
}

#[test]
fn moving_a_keyframe_across_a_neighbour_returns_new_index() {
    let mut c = linear(&[(0, 0.0), (10, 1.0), (20, 2.0)]);
    let new_index = c.set_keyframe_value_and_time(0, Frame(15), 7.0).unwrap();
    assert_eq!(new_index, 1);
    assert_eq!(
        c.keyframe_times().collect::<Vec<_>>(),
        [Frame(10), Frame(15), Frame(20)]
    );
    assert_eq!(c.evaluate_at(Frame(15)), Some(7.0));
}

#[test]
fn moving_onto_an_occupied_time_is_rejected() {
    let mut c = linear(&[(0, 0.0), (10, 1.0)]);
    let before = c.clone();
    assert!(c.set_keyframe_value_and_time(0, Frame(10), 5.0).is_err());
    assert_eq!(c, before);

    // Same time only updates the value.
    assert_eq!(c.set_keyframe_value_and_time(1, Frame(10), 4.0).unwrap(), 1);
    assert_eq!(c.evaluate_at(Frame(10)), Some(4.0));
}

#[test]
fn y_range_spans_key_values() {
    let c = linear(&[(0, 2.0), (1, -1.0), (2, 5.0)]);
    assert_eq!(c.y_range(), Some((-1.0, 5.0)));
}

#[test]
fn offset_values_shifts_every_key() {
    let mut c = linear(&[(0, 0.0), (10, 1.0)]);
    c.offset_values(2.0);
    assert_eq!(c.evaluate_at(Frame(0)), Some(2.0));
    assert_eq!(c.evaluate_at(Frame(10)), Some(3.0));
}

#[test]
fn validate_catches_unsorted_json() {
    let json = r#"{"keys":[
        {"time":5,"value":0.0,"interpolation":"Linear"},
        {"time":5,"value":1.0,"interpolation":"Linear"}
    ]}"#;
    let c: Curve = serde_json::from_str(json).unwrap();
    assert!(c.validate().is_err());
}
