use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::Value;

/// Errors produced while turning shorthand JSON into a [`Value`].
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("unsupported value shorthand: {0}")]
    Unsupported(String),
    #[error("value deserialize: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Normalize shorthand `Value` JSON into the canonical `{ "type": ..., "data": ... }`
/// representation understood by the serde derives on [`Value`].
///
/// Accepted shorthands:
/// - `1.5` → number, `true` → bool, `"label"` → text
/// - `[x, y]` → vec2, `[x, y, z]` → vec3, any other numeric array → vector
/// - `{ "x", "y" }` → vec2, `{ "x", "y", "z" }` → vec3
/// - `{ "r", "g", "b", "a"? }` → color (alpha defaults to 1)
/// - `{ "number" | "vec2" | "vec3" | "color" | "vector" | "bool" | "text": ... }`
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => json!({ "type": "number", "data": n }),
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::String(s) => json!({ "type": "text", "data": s }),
        JsonValue::Array(arr) if arr.iter().all(|x| x.is_number()) => match arr.len() {
            2 => json!({ "type": "vec2", "data": arr }),
            3 => json!({ "type": "vec3", "data": arr }),
            _ => json!({ "type": "vector", "data": arr }),
        },
        JsonValue::Object(obj) => {
            if obj.contains_key("type") && obj.contains_key("data") {
                return JsonValue::Object(obj);
            }
            for tag in ["number", "vec2", "vec3", "color", "vector", "bool", "text"] {
                if let Some(data) = obj.get(tag) {
                    return json!({ "type": tag, "data": data });
                }
            }
            let num = |k: &str| obj.get(k).and_then(|x| x.as_f64());
            if let (Some(r), Some(g), Some(b)) = (num("r"), num("g"), num("b")) {
                let a = num("a").unwrap_or(1.0);
                return json!({ "type": "color", "data": [r, g, b, a] });
            }
            if let (Some(x), Some(y)) = (num("x"), num("y")) {
                return match num("z") {
                    Some(z) => json!({ "type": "vec3", "data": [x, y, z] }),
                    None => json!({ "type": "vec2", "data": [x, y] }),
                };
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

/// Normalize shorthand JSON then deserialize it into a [`Value`].
pub fn parse_value(value: JsonValue) -> Result<Value, JsonError> {
    if value.is_null() {
        return Err(JsonError::Unsupported("null".into()));
    }
    let normalized = normalize_value_json(value);
    Ok(serde_json::from_value(normalized)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_primitives() {
        assert_eq!(parse_value(json!(42)).unwrap(), Value::Number(42.0));
        assert_eq!(parse_value(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(parse_value(json!("hi")).unwrap(), Value::text("hi"));
    }

    #[test]
    fn shorthand_shapes() {
        assert_eq!(parse_value(json!([1, 2])).unwrap(), Value::vec2(1.0, 2.0));
        assert_eq!(
            parse_value(json!({ "x": 1, "y": 2, "z": 3 })).unwrap(),
            Value::Vec3([1.0, 2.0, 3.0])
        );
        assert_eq!(
            parse_value(json!({ "r": 1, "g": 0, "b": 0 })).unwrap(),
            Value::rgba(1.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(
            parse_value(json!([1, 2, 3, 4, 5])).unwrap(),
            Value::Vector(vec![1.0, 2.0, 3.0, 4.0, 5.0])
        );
    }

    #[test]
    fn canonical_form_passes_through() {
        let v = parse_value(json!({ "type": "color", "data": [0, 0, 1, 0.5] })).unwrap();
        assert_eq!(v, Value::rgba(0.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn null_and_unknown_objects_fail() {
        assert!(parse_value(JsonValue::Null).is_err());
        assert!(parse_value(json!({ "foo": 1 })).is_err());
    }
}
