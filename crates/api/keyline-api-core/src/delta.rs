//! Relative value arithmetic for scoped (range-relative) edits.

use crate::coercion::{same_shape, to_components, with_components};
use crate::Value;

/// Component-wise `to - from`. `None` for discrete or mismatched values.
pub fn difference(from: &Value, to: &Value) -> Option<Value> {
    if !same_shape(from, to) {
        return None;
    }
    let a = to_components(from)?;
    let b = to_components(to)?;
    let diff: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| y - x).collect();
    with_components(from, &diff)
}

/// Component-wise `value + delta`. `None` for discrete or mismatched values.
pub fn offset(value: &Value, delta: &Value) -> Option<Value> {
    if !same_shape(value, delta) {
        return None;
    }
    let a = to_components(value)?;
    let d = to_components(delta)?;
    let sum: Vec<f64> = a.iter().zip(d.iter()).map(|(x, y)| x + y).collect();
    with_components(value, &sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_then_offset_restores() {
        let a = Value::vec2(1.0, 2.0);
        let b = Value::vec2(4.0, 0.0);
        let d = difference(&a, &b).unwrap();
        assert_eq!(d, Value::vec2(3.0, -2.0));
        assert_eq!(offset(&a, &d), Some(b));
    }

    #[test]
    fn discrete_values_have_no_delta() {
        assert!(difference(&Value::Bool(false), &Value::Bool(true)).is_none());
        assert!(difference(&Value::n(1.0), &Value::vec2(1.0, 1.0)).is_none());
    }
}
