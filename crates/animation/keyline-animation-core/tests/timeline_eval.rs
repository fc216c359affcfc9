use keyline_animation_core::{
    interp::{self, EASE_IN, STEP},
    ChannelKey, Interpolator, TargetId, Timeline, Value,
};

const OWNER: TargetId = TargetId(1);
const BALL: TargetId = TargetId(2);

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9
}

fn number_at(tl: &Timeline, t: u64, target: TargetId, key: &str) -> f64 {
    match tl.value_at(t, target, key) {
        Some(Value::Number(n)) => n,
        other => panic!("expected number at {t} ms, got {other:?}"),
    }
}

/// `{0: x=0}, {1000: x=100}` with linear easing.
fn two_frame_timeline() -> Timeline {
    let mut tl = Timeline::new(OWNER);
    tl.set_key_frame_key_value(0, OWNER, "x", Value::n(0.0), None)
        .unwrap();
    tl.set_key_frame_key_value(1000, OWNER, "x", Value::n(100.0), None)
        .unwrap();
    tl
}

/// it should interpolate linearly at the midpoint of two frames
#[test]
fn linear_midpoint() {
    let tl = two_frame_timeline();
    let state = tl.evaluate(500);
    assert_eq!(state.len(), 1);
    assert_eq!(state.get(&ChannelKey::new(OWNER, "x")), Some(&Value::n(50.0)));
}

/// it should return identical state regardless of prior query order
#[test]
fn evaluate_is_deterministic() {
    let mut tl = two_frame_timeline();
    tl.add_target(BALL);
    tl.set_key_frame_key_value(250, BALL, "y", Value::vec2(1.0, 2.0), Some(interp::get(EASE_IN)))
        .unwrap();
    tl.set_key_frame_key_value(1500, BALL, "y", Value::vec2(5.0, -2.0), None)
        .unwrap();

    let times = [0u64, 125, 333, 999, 1000, 1234, 4000];
    let forward: Vec<_> = times.iter().map(|t| tl.evaluate(*t)).collect();
    let backward: Vec<_> = times.iter().rev().map(|t| tl.evaluate(*t)).collect();
    for (i, state) in forward.iter().enumerate() {
        assert_eq!(state, &backward[times.len() - 1 - i]);
        assert_eq!(state, &tl.evaluate(times[i]));
    }
}

/// it should hold the first and last values outside the keyed range
#[test]
fn holds_at_boundaries() {
    let mut tl = Timeline::new(OWNER);
    tl.set_key_frame_key_value(200, OWNER, "x", Value::n(7.0), None)
        .unwrap();
    tl.set_key_frame_key_value(600, OWNER, "x", Value::n(9.0), None)
        .unwrap();

    assert!(approx(number_at(&tl, 0, OWNER, "x"), 7.0));
    assert!(approx(number_at(&tl, 200, OWNER, "x"), 7.0));
    assert!(approx(number_at(&tl, 600, OWNER, "x"), 9.0));
    assert!(approx(number_at(&tl, 10_000, OWNER, "x"), 9.0));
}

/// it should return the stored value exactly on a key frame
#[test]
fn exact_hit_has_no_drift() {
    let mut tl = Timeline::new(OWNER);
    let weird = 0.1 + 0.2;
    tl.set_key_frame_key_value(0, OWNER, "x", Value::n(-3.75), None)
        .unwrap();
    tl.set_key_frame_key_value(333, OWNER, "x", Value::n(weird), Some(interp::get(EASE_IN)))
        .unwrap();
    tl.set_key_frame_key_value(1000, OWNER, "x", Value::n(12.5), None)
        .unwrap();
    assert_eq!(tl.value_at(333, OWNER, "x"), Some(Value::n(weird)));
    assert_eq!(tl.value_at(0, OWNER, "x"), Some(Value::n(-3.75)));
}

/// it should leave channels without any key value out of the state
#[test]
fn unanimated_channels_are_absent() {
    let tl = two_frame_timeline();
    assert!(tl.value_at(500, OWNER, "y").is_none());
    assert!(!tl.evaluate(500).contains_key(&ChannelKey::new(OWNER, "y")));
    assert!(Timeline::new(OWNER).evaluate(0).is_empty());
}

/// it should ease with the destination key value's interpolator
#[test]
fn right_control_point_interpolator_governs() {
    let mut tl = Timeline::new(OWNER);
    tl.set_key_frame_key_value(0, OWNER, "x", Value::n(0.0), Some(interp::get(STEP)))
        .unwrap();
    tl.set_key_frame_key_value(1000, OWNER, "x", Value::n(100.0), Some(interp::get(EASE_IN)))
        .unwrap();

    // EaseIn starts slow: below the linear midpoint, but still moving.
    let mid = number_at(&tl, 500, OWNER, "x");
    assert!(mid > 0.0 && mid < 50.0, "ease-in midpoint {mid}");

    // Switching the destination to Step holds the left value until the end.
    tl.set_key_frame_key_value(1000, OWNER, "x", Value::n(100.0), Some(interp::get(STEP)))
        .unwrap();
    assert!(approx(number_at(&tl, 999, OWNER, "x"), 0.0));
    assert!(approx(number_at(&tl, 1000, OWNER, "x"), 100.0));
}

/// it should step discrete values at the end of the segment
#[test]
fn discrete_values_step_at_end() {
    let mut tl = Timeline::new(OWNER);
    tl.set_key_frame_key_value(0, OWNER, "label", Value::text("A"), None)
        .unwrap();
    tl.set_key_frame_key_value(0, OWNER, "visible", Value::Bool(false), None)
        .unwrap();
    tl.set_key_frame_key_value(100, OWNER, "label", Value::text("B"), None)
        .unwrap();
    tl.set_key_frame_key_value(100, OWNER, "visible", Value::Bool(true), None)
        .unwrap();

    assert_eq!(tl.value_at(50, OWNER, "label"), Some(Value::text("A")));
    assert_eq!(tl.value_at(99, OWNER, "visible"), Some(Value::Bool(false)));
    assert_eq!(tl.value_at(100, OWNER, "label"), Some(Value::text("B")));
    assert_eq!(tl.value_at(100, OWNER, "visible"), Some(Value::Bool(true)));
}

/// it should lerp vectors and colors component-wise
#[test]
fn composite_values_blend_per_component() {
    let mut tl = Timeline::new(OWNER);
    tl.set_key_frame_key_value(0, OWNER, "fill", Value::rgba(1.0, 0.0, 0.0, 1.0), None)
        .unwrap();
    tl.set_key_frame_key_value(0, OWNER, "pos", Value::vec2(0.0, 10.0), None)
        .unwrap();
    tl.set_key_frame_key_value(400, OWNER, "fill", Value::rgba(0.0, 0.0, 1.0, 0.0), None)
        .unwrap();
    tl.set_key_frame_key_value(400, OWNER, "pos", Value::vec2(20.0, 30.0), None)
        .unwrap();

    assert_eq!(tl.value_at(100, OWNER, "fill"), Some(Value::rgba(0.75, 0.0, 0.25, 0.75)));
    assert_eq!(tl.value_at(200, OWNER, "pos"), Some(Value::vec2(10.0, 20.0)));
}

/// it should interpolate only between frames that bind the channel
#[test]
fn control_points_skip_frames_without_channel() {
    let mut tl = two_frame_timeline();
    tl.set_key_frame_key_value(500, OWNER, "opacity", Value::n(1.0), None)
        .unwrap();
    // The 500 ms frame does not bind x, so x still spans 0..1000.
    assert!(approx(number_at(&tl, 250, OWNER, "x"), 25.0));
    assert!(approx(number_at(&tl, 750, OWNER, "x"), 75.0));
}

/// it should report sorted key frame times, optionally filtered by target
#[test]
fn key_frame_discovery() {
    let mut tl = two_frame_timeline();
    tl.add_target(BALL);
    tl.set_key_frame_key_value(400, BALL, "y", Value::n(1.0), None)
        .unwrap();
    tl.set_key_frame_key_value(1000, BALL, "y", Value::n(2.0), None)
        .unwrap();

    assert_eq!(tl.key_frame_times(), vec![0, 400, 1000]);
    assert_eq!(tl.key_frame_times_for(&[BALL], true), vec![400, 1000]);
    assert_eq!(tl.key_frame_times_for(&[OWNER, BALL], true), vec![0, 400, 1000]);
    assert_eq!(tl.key_frame_times_for(&[OWNER, BALL], false), vec![1000]);
    assert_eq!(tl.next_key_frame_time(400), Some(1000));
    assert_eq!(tl.previous_key_frame_time(400), Some(0));
    assert_eq!(tl.next_key_frame_time(1000), None);
    assert_eq!(tl.last_key_frame_time(), 1000);
}

/// it should reject edits that name a target outside the subtree
#[test]
fn unknown_target_is_an_error() {
    let mut tl = Timeline::new(OWNER);
    let err = tl
        .set_key_frame_key_value(10, TargetId(99), "x", Value::n(1.0), None)
        .unwrap_err();
    assert_eq!(err.category(), "reference");
    assert_eq!(tl.frame_count(), 1);

    assert!(tl.remove_key_frame_key_values(TargetId(99), "x", 0, 10, true).is_err());
}

/// it should fall back to Linear for unknown interpolator names
#[test]
fn unknown_interpolator_name_is_linear() {
    let fallback = interp::get("DoesNotExist");
    assert!(fallback.is_linear());
    assert_eq!(fallback, Interpolator::linear());
}
