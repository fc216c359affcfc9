//! Coercion helpers between Value shapes and flat component lists.
//! Only numeric kinds have components; Bool/Text return `None`.

use crate::Value;

/// Flatten a numeric value into its components.
pub fn to_components(v: &Value) -> Option<Vec<f64>> {
    match v {
        Value::Number(n) => Some(vec![*n]),
        Value::Vec2(a) => Some(a.to_vec()),
        Value::Vec3(a) => Some(a.to_vec()),
        Value::Color(a) => Some(a.to_vec()),
        Value::Vector(items) => Some(items.clone()),
        Value::Bool(_) | Value::Text(_) => None,
    }
}

/// Rebuild a value with the same shape as `like` from `components`.
/// Returns `None` when the component count does not fit the shape.
pub fn with_components(like: &Value, components: &[f64]) -> Option<Value> {
    match like {
        Value::Number(_) => match components {
            [n] => Some(Value::Number(*n)),
            _ => None,
        },
        Value::Vec2(_) => components.try_into().ok().map(Value::Vec2),
        Value::Vec3(_) => components.try_into().ok().map(Value::Vec3),
        Value::Color(_) => components.try_into().ok().map(Value::Color),
        Value::Vector(items) if items.len() == components.len() => {
            Some(Value::Vector(components.to_vec()))
        }
        _ => None,
    }
}

/// Two values share a numeric shape (same kind and component count).
pub fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Vector(va), Value::Vector(vb)) => va.len() == vb.len(),
        _ => a.kind() == b.kind() && a.is_numeric(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_round_trip_keeps_shape() {
        let c = Value::rgba(0.1, 0.2, 0.3, 1.0);
        let comps = to_components(&c).unwrap();
        assert_eq!(with_components(&c, &comps), Some(c));
        assert_eq!(with_components(&Value::vec2(0.0, 0.0), &[1.0]), None);
        assert!(to_components(&Value::Bool(true)).is_none());
    }
}
