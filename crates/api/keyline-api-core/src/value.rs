//! Value: runtime property values carried by key values.
//! All numeric types use f64 so document coordinates round-trip exactly.

use serde::{Deserialize, Serialize};

/// Coarse kind of a [`Value`], used for quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Number,
    Vec2,
    Vec3,
    Color,
    Vector,
    Bool,
    Text,
}

impl ValueKind {
    /// Numeric kinds interpolate component-wise; the rest step.
    #[inline]
    pub fn is_numeric(self) -> bool {
        !matches!(self, ValueKind::Bool | ValueKind::Text)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar number (position, opacity, rotation angle, ...)
    Number(f64),

    /// 2D vector (point, size)
    Vec2([f64; 2]),

    /// 3D vector
    Vec3([f64; 3]),

    /// RGBA color, components in 0..1 by convention
    Color([f64; 4]),

    /// Generic, variable-length numeric vector
    Vector(Vec<f64>),

    /// Boolean (step)
    Bool(bool),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Color(_) => ValueKind::Color,
            Value::Vector(_) => ValueKind::Vector,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    /// Scalar payload, if this is a `Number`.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convenience constructors
    pub fn n(v: f64) -> Self {
        Value::Number(v)
    }

    pub fn vec2(x: f64, y: f64) -> Self {
        Value::Vec2([x, y])
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::Color([r, g, b, a])
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
