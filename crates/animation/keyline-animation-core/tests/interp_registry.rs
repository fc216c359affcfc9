use keyline_animation_core::{
    interp::{self, EASE, EASE_IN, EASE_IN_OUT, EASE_OUT, LINEAR, SMOOTH, STEP},
    InterpRegistry, TargetId, Timeline, Value,
};

/// it should seed the built-in curves in a stable order
#[test]
fn builtins_are_indexed() {
    let registry = InterpRegistry::new();
    assert_eq!(
        registry.names(),
        vec![LINEAR, EASE_IN, EASE_OUT, EASE_IN_OUT, EASE, SMOOTH, STEP]
    );
    assert_eq!(registry.at(0).map(|i| i.name()), Some(LINEAR));
    assert!(registry.at(registry.count()).is_none());
}

/// it should fix every built-in curve at its endpoints
#[test]
fn builtins_hit_endpoints() {
    let registry = InterpRegistry::new();
    for idx in 0..registry.count() {
        let curve = registry.at(idx).unwrap();
        assert_eq!(curve.ease(0.0), 0.0, "{}", curve.name());
        assert_eq!(curve.ease(1.0), 1.0, "{}", curve.name());
        assert_eq!(curve.ease(-3.0), 0.0, "{}", curve.name());
        assert_eq!(curve.ease(7.0), 1.0, "{}", curve.name());
    }
}

/// it should make a registered curve available to timelines by name
#[test]
fn registered_curve_drives_evaluation() {
    let before = interp::count();
    let half = interp::register("Half", |_| 0.5);
    assert_eq!(interp::count(), before + 1);
    assert!(interp::contains("Half"));
    assert_eq!(interp::at(before).map(|i| i.name().to_string()), Some("Half".into()));

    let owner = TargetId(1);
    let mut tl = Timeline::new(owner);
    tl.set_key_frame_key_value(0, owner, "x", Value::n(0.0), None)
        .unwrap();
    tl.set_key_frame_key_value(100, owner, "x", Value::n(10.0), Some(half))
        .unwrap();
    assert_eq!(tl.value_at(10, owner, "x"), Some(Value::n(5.0)));
    assert_eq!(tl.value_at(90, owner, "x"), Some(Value::n(5.0)));

    // Re-registering replaces in place.
    interp::register("Half", |p| p);
    assert_eq!(interp::count(), before + 1);
    assert_eq!(interp::get("Half").ease(0.25), 0.25);
}

/// it should clamp a misbehaving curve to the control points
#[test]
fn overshooting_curve_is_clamped() {
    let wild = interp::register("Overshoot", |p| p * 3.0 - 1.0);
    assert_eq!(wild.ease(0.1), 0.0);
    assert_eq!(wild.ease(0.9), 1.0);
}
