//! Blending utilities for Value types.
//! - f64 linear interpolation for numbers and vector components
//! - elementwise blending for equally sized generic vectors
//! - step-at-end for Bool/Text and for mismatched shapes: the left value
//!   holds until progress reaches 1

use crate::coercion::{same_shape, to_components, with_components};
use crate::Value;

/// Linear interpolation for f64
#[inline]
pub fn lerp_f(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
fn lerp_array<const N: usize>(a: &[f64; N], b: &[f64; N], t: f64) -> [f64; N] {
    let mut out = [0.0f64; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

/// Blend two Values by already-eased progress `t` in [0,1].
///
/// Exact endpoints return clones of the inputs so that a key frame hit never
/// drifts through floating point arithmetic.
pub fn blend_values(a: &Value, b: &Value, t: f64) -> Value {
    if t <= 0.0 {
        return a.clone();
    }
    if t >= 1.0 {
        return b.clone();
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Value::Number(lerp_f(*x, *y, t)),
        (Value::Vec2(x), Value::Vec2(y)) => Value::Vec2(lerp_array(x, y, t)),
        (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3(lerp_array(x, y, t)),
        (Value::Color(x), Value::Color(y)) => Value::Color(lerp_array(x, y, t)),
        (Value::Vector(_), Value::Vector(_)) if same_shape(a, b) => {
            blend_components(a, b, t).unwrap_or_else(|| step_blend(a, b, t))
        }
        _ => step_blend(a, b, t),
    }
}

fn blend_components(a: &Value, b: &Value, t: f64) -> Option<Value> {
    let ca = to_components(a)?;
    let cb = to_components(b)?;
    let mixed: Vec<f64> = ca
        .iter()
        .zip(cb.iter())
        .map(|(x, y)| lerp_f(*x, *y, t))
        .collect();
    with_components(a, &mixed)
}

/// Step blending for discrete types: keep `a` until `t` reaches 1.
#[inline]
pub fn step_blend(a: &Value, b: &Value, t: f64) -> Value {
    if t < 1.0 {
        a.clone()
    } else {
        b.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_numbers() {
        let r = blend_values(&Value::n(0.0), &Value::n(100.0), 0.5);
        assert_eq!(r, Value::n(50.0));
    }

    #[test]
    fn blend_vec2() {
        let r = blend_values(&Value::vec2(0.0, 0.0), &Value::vec2(2.0, 4.0), 0.25);
        assert_eq!(r, Value::vec2(0.5, 1.0));
    }

    #[test]
    fn text_steps_at_end() {
        let a = Value::text("a");
        let b = Value::text("b");
        assert_eq!(blend_values(&a, &b, 0.99), a);
        assert_eq!(blend_values(&a, &b, 1.0), b);
    }

    #[test]
    fn mismatched_kinds_step() {
        let a = Value::n(1.0);
        let b = Value::vec2(1.0, 2.0);
        assert_eq!(blend_values(&a, &b, 0.5), a);
        let va = Value::Vector(vec![0.0, 1.0]);
        let vb = Value::Vector(vec![1.0]);
        assert_eq!(blend_values(&va, &vb, 0.5), va);
    }
}
