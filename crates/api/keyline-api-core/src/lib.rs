//! keyline-api-core: animated property values and how they blend.
//!
//! The timeline engine treats property values as opaque except for the two
//! capabilities defined here: interpolation between two values
//! ([`blend::blend_values`]) and the relative arithmetic used by scoped edits
//! ([`delta::difference`] / [`delta::offset`]).

pub mod blend;
pub mod coercion;
pub mod delta;
pub mod json;
pub mod value;

pub use value::{Value, ValueKind};
